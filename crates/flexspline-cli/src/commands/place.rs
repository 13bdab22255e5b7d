//! Place command

use super::open_scene;
use anyhow::{Context, Result};
use flexspline::host::{HostedObject, SegmentEnds};
use flexspline::{FlexSpline, MeshKind, RecordingHost};
use flexspline_core::{Rotator, Vec3};
use serde::Serialize;

/// One layer instance as the host last saw it
#[derive(Debug, Serialize)]
pub struct PlacementRow {
    pub layer: String,
    pub index: usize,
    pub kind: MeshKind,
    pub visible: bool,
    pub mesh: Option<String>,
    pub position: Vec3,
    pub rotation: Rotator,
    pub scale: Vec3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<SegmentEnds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<(f32, f32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up: Option<Vec3>,
}

impl PlacementRow {
    fn new(layer: &str, index: usize, kind: MeshKind, object: &HostedObject) -> Self {
        let deforming = kind == MeshKind::Deforming;
        Self {
            layer: layer.to_string(),
            index,
            kind,
            visible: object.visible,
            mesh: object.mesh.clone(),
            position: object.transform.position,
            rotation: object.transform.rotation,
            scale: object.transform.scale,
            segment: object.segment.filter(|_| deforming),
            roll: deforming.then_some(object.roll),
            up: deforming.then_some(object.up_direction),
        }
    }

    fn to_text(&self) -> String {
        let p = self.position;
        let mut line = format!(
            "{:<12} #{:<3} {:<9} {} pos=({:.2}, {:.2}, {:.2})",
            self.layer,
            self.index,
            format!("{:?}", self.kind).to_lowercase(),
            if self.visible { "shown " } else { "hidden" },
            p.x,
            p.y,
            p.z
        );
        if let Some(segment) = &self.segment {
            line.push_str(&format!(
                " segment=({:.2}, {:.2}, {:.2})->({:.2}, {:.2}, {:.2})",
                segment.start.x, segment.start.y, segment.start.z, segment.end.x, segment.end.y, segment.end.z
            ));
        } else {
            let r = self.rotation;
            line.push_str(&format!(" rot=({:.1}, {:.1}, {:.1})", r.roll, r.yaw, r.pitch));
        }
        line
    }
}

/// Every layer instance, in layer then point order
pub fn collect_rows(flex: &FlexSpline, host: &RecordingHost, include_hidden: bool) -> Vec<PlacementRow> {
    let mut rows = Vec::new();
    for layer in flex.layers().iter() {
        for (index, slot) in layer.slots().iter().enumerate() {
            let Some(mesh) = &slot.mesh else { continue };
            let Some(object) = host.get(mesh.handle) else { continue };
            if include_hidden || object.visible {
                rows.push(PlacementRow::new(layer.name(), index, mesh.kind, object));
            }
        }
    }
    rows
}

pub fn run(scene_path: &str, format: &str, include_hidden: bool) -> Result<()> {
    let scene = open_scene(scene_path)?;
    let spline = scene.spline();
    let mut flex = scene.flex_spline().context("Invalid layer configuration")?;
    let mut host = scene.host();

    let report = flex.reconcile(&spline, &mut host);
    let rows = collect_rows(&flex, &host, include_hidden);

    match format {
        "json" => {
            let output = serde_json::json!({
                "report": report,
                "placements": rows,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            println!(
                "{} point(s), {} layer(s), {} visible instance(s)",
                report.point_count,
                flex.layers().len(),
                report.instances_visible
            );
            for row in &rows {
                println!("  {}", row.to_text());
            }
        }
    }

    Ok(())
}
