//! Simulate command

use super::open_scene;
use anyhow::{Context, Result};
use flexspline::{FlexSpline, ReconcileReport, RecordingHost};
use flexspline_core::ControlPointSpline;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Step {
    pub step: usize,
    pub edit: String,
    pub report: ReconcileReport,
    pub aligned: bool,
    pub live_objects: usize,
}

/// Records, labels and every layer's slots all match the point count
pub fn is_aligned(flex: &FlexSpline, spline: &ControlPointSpline) -> bool {
    let count = spline.len();
    flex.records().len() == count && flex.layers().iter().all(|l| l.slots().len() == count)
}

fn step(
    index: usize,
    edit: String,
    report: ReconcileReport,
    flex: &FlexSpline,
    spline: &ControlPointSpline,
    host: &RecordingHost,
) -> Step {
    Step {
        step: index,
        edit,
        report,
        aligned: is_aligned(flex, spline),
        live_objects: host.live_count(),
    }
}

pub fn run(scene_path: &str, format: &str) -> Result<()> {
    let scene = open_scene(scene_path)?;
    let mut spline = scene.spline();
    let mut flex = scene.flex_spline().context("Invalid layer configuration")?;
    let mut host = scene.host();

    let mut steps = Vec::new();
    let report = flex.reconcile(&spline, &mut host);
    steps.push(step(0, "initial".to_string(), report, &flex, &spline, &host));

    for (i, edit) in scene.edits.iter().enumerate() {
        edit.apply(&mut spline, &mut flex, &mut host)
            .with_context(|| format!("Edit {} failed: {}", i + 1, edit.describe()))?;
        let report = flex.reconcile(&spline, &mut host);
        steps.push(step(i + 1, edit.describe(), report, &flex, &spline, &host));
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&steps)?),
        _ => {
            for s in &steps {
                let r = &s.report;
                println!(
                    "[{}] {}: {} point(s), -{:?} +{:?}, slots +{} -{}, {} respawned, {} object(s){}",
                    s.step,
                    s.edit,
                    r.point_count,
                    r.deleted,
                    r.inserted,
                    r.slots_created,
                    r.slots_removed,
                    r.instances_respawned,
                    s.live_objects,
                    if s.aligned { "" } else { "  MISALIGNED" }
                );
            }
        }
    }

    if steps.iter().any(|s| !s.aligned) {
        anyhow::bail!("records and layer slots fell out of step with the spline");
    }
    Ok(())
}
