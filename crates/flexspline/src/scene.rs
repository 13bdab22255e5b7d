//! TOML scene files: a spline, its layers and a list of edits to replay

use crate::flex_spline::FlexSpline;
use crate::host::{InstanceHost, RecordingHost};
use crate::layer::LayerConfig;
use crate::record::PointEdit;
use crate::settings::{DebugSettings, GlobalConfig};
use flexspline_core::{
    ControlPointSpline, FlexError, Result, SplineControlPoint, Transform, Vec3,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineDef {
    pub closed: bool,
    /// Position of the spline origin
    pub origin: [f32; 3],
}

/// A named layer that is ready to use without the template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDef {
    pub name: String,
    #[serde(flatten)]
    pub config: LayerConfig,
}

/// One interactive edit, replayed by `flexspline simulate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SplineEdit {
    Insert {
        index: usize,
        position: Vec3,
        #[serde(default)]
        twist: f32,
    },
    Remove {
        index: usize,
    },
    Move {
        index: usize,
        position: Vec3,
    },
    /// Add an unnamed layer that takes the template on the next pass
    AddLayer,
    RemoveLayer {
        name: String,
    },
    EditPoints {
        points: Vec<usize>,
        edit: PointEdit,
    },
}

impl SplineEdit {
    pub fn apply<H: InstanceHost + ?Sized>(
        &self,
        spline: &mut ControlPointSpline,
        flex: &mut FlexSpline,
        host: &mut H,
    ) -> Result<()> {
        match self {
            SplineEdit::Insert {
                index,
                position,
                twist,
            } => {
                let point = SplineControlPoint {
                    twist: *twist,
                    ..SplineControlPoint::new(*position)
                };
                spline.insert(*index, point)
            }
            SplineEdit::Remove { index } => spline.remove(*index).map(|_| ()),
            SplineEdit::Move { index, position } => spline.set_position(*index, *position),
            SplineEdit::AddLayer => {
                flex.layers_mut().add_uninitialized();
                Ok(())
            }
            SplineEdit::RemoveLayer { name } => {
                let id = flex
                    .layers()
                    .find_by_name(name)
                    .map(|l| l.id())
                    .ok_or_else(|| FlexError::LayerNotFound(name.clone()))?;
                flex.layers_mut().remove(id, host)
            }
            SplineEdit::EditPoints { points, edit } => {
                flex.edit_selection(points, *edit);
                Ok(())
            }
        }
    }

    /// Short description for reports
    pub fn describe(&self) -> String {
        match self {
            SplineEdit::Insert { index, .. } => format!("insert point at {}", index),
            SplineEdit::Remove { index } => format!("remove point {}", index),
            SplineEdit::Move { index, .. } => format!("move point {}", index),
            SplineEdit::AddLayer => "add layer".to_string(),
            SplineEdit::RemoveLayer { name } => format!("remove layer '{}'", name),
            SplineEdit::EditPoints { points, .. } => format!("edit {} point(s)", points.len()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub spline: SplineDef,
    pub control_points: Vec<SplineControlPoint>,
    pub global: GlobalConfig,
    pub debug: DebugSettings,
    pub template: LayerConfig,
    pub layers: Vec<LayerDef>,
    pub edits: Vec<SplineEdit>,
    /// Mesh asset name to bounds height
    pub meshes: HashMap<String, f32>,
}

impl SceneFile {
    pub fn spline(&self) -> ControlPointSpline {
        let [x, y, z] = self.spline.origin;
        ControlPointSpline::new(self.control_points.clone(), self.spline.closed)
            .with_origin(Transform::from_position(Vec3::new(x, y, z)))
    }

    /// A FlexSpline with the scene's settings and named layers. Nothing is
    /// spawned until the first reconcile.
    pub fn flex_spline(&self) -> Result<FlexSpline> {
        let template = self.template.clone();
        template.validate()?;
        let mut flex = FlexSpline::with_template(template);
        flex.globals = self.global.clone();
        flex.debug = self.debug.clone();
        for def in &self.layers {
            flex.layers_mut().insert(def.name.clone(), def.config.clone())?;
        }
        Ok(flex)
    }

    pub fn host(&self) -> RecordingHost {
        RecordingHost::with_mesh_heights(self.meshes.clone())
    }
}

/// Load a scene from a TOML file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneFile> {
    let content = fs::read_to_string(path)?;
    load_scene_string(&content)
}

/// Load a scene from a TOML string
pub fn load_scene_string(content: &str) -> Result<SceneFile> {
    let scene: SceneFile = toml::from_str(content)?;
    if scene.control_points.is_empty() {
        log::warn!("scene has no control points");
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::MeshKind;
    use flexspline_core::{CoordinateSpace, SplineSource};

    const SCENE: &str = r#"
[spline]
closed = false
origin = [0.0, 2.0, 0.0]

[[control_points]]
position = { x = 0.0, y = 0.0, z = 0.0 }

[[control_points]]
position = { x = 10.0, y = 0.0, z = 0.0 }
twist = 15.0

[[control_points]]
position = { x = 20.0, y = 0.0, z = 0.0 }

[global]
looping = "everywhere"

[debug]
show_point_numbers = true

[template.mesh]
kind = "rigid"

[[layers]]
name = "rails"
flags = "ACTIVE"
[layers.mesh]
asset = "rail"
[layers.render]
spawn_chance = 0.5
randomize_spawn_chance = false

[[edits]]
op = "insert"
index = 1
position = { x = 5.0, y = 0.0, z = 0.0 }

[[edits]]
op = "add_layer"

[[edits]]
op = "edit_points"
points = [0, 1]
edit = { field = "end_roll", value = 0.5 }

[[edits]]
op = "remove"
index = 0

[meshes]
rail = 1.5
"#;

    #[test]
    fn test_load_scene_string() {
        let scene = load_scene_string(SCENE).unwrap();
        assert_eq!(scene.control_points.len(), 3);
        assert_eq!(scene.control_points[1].twist, 15.0);
        assert_eq!(scene.control_points[0].scale, Vec3::ONE);
        assert_eq!(scene.layers[0].name, "rails");
        assert_eq!(scene.layers[0].config.mesh.asset.as_deref(), Some("rail"));
        assert!(!scene.layers[0].config.render.randomize_spawn_chance);
        assert_eq!(scene.template.mesh.kind, MeshKind::Rigid);
        assert_eq!(scene.edits.len(), 4);
        assert_eq!(scene.edits[1], SplineEdit::AddLayer);
        assert_eq!(scene.meshes["rail"], 1.5);
        assert!(scene.debug.show_point_numbers);
    }

    #[test]
    fn test_empty_scene_uses_defaults() {
        let scene = load_scene_string("").unwrap();
        assert!(scene.control_points.is_empty());
        assert_eq!(scene.global, GlobalConfig::default());
        assert_eq!(scene.debug, DebugSettings::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            load_scene_string("[spline\nclosed = 1"),
            Err(FlexError::TomlParseError(_))
        ));
    }

    #[test]
    fn test_build_from_scene() {
        let scene = load_scene_string(SCENE).unwrap();
        let spline = scene.spline();
        assert_eq!(
            spline.location_at(1, CoordinateSpace::World),
            Vec3::new(10.0, 2.0, 0.0)
        );
        let flex = scene.flex_spline().unwrap();
        assert_eq!(flex.layers().len(), 1);
        assert_eq!(flex.template.mesh.kind, MeshKind::Rigid);
    }

    #[test]
    fn test_replay_edits() {
        let scene = load_scene_string(SCENE).unwrap();
        let mut spline = scene.spline();
        let mut flex = scene.flex_spline().unwrap();
        let mut host = scene.host();
        flex.reconcile(&spline, &mut host);

        for edit in &scene.edits {
            edit.apply(&mut spline, &mut flex, &mut host).unwrap();
            flex.reconcile(&spline, &mut host);
            for layer in flex.layers().iter() {
                assert_eq!(layer.slots().len(), spline.len());
            }
        }
        assert_eq!(spline.len(), 3);
        assert_eq!(flex.layers().len(), 2);
        assert!(flex.layers().find_by_name("Layer 0").is_some());
        // Old point 1 (inserted) is now point 0
        assert_eq!(flex.record(0).unwrap().end_roll, 0.5);
        assert_eq!(flex.record(1).unwrap().end_roll, 0.0);
    }

    #[test]
    fn test_bad_edit_reports_error() {
        let mut spline = ControlPointSpline::default();
        let mut flex = FlexSpline::new();
        let mut host = RecordingHost::new();
        assert!(SplineEdit::Remove { index: 0 }
            .apply(&mut spline, &mut flex, &mut host)
            .is_err());
        assert!(matches!(
            SplineEdit::RemoveLayer { name: "x".into() }.apply(&mut spline, &mut flex, &mut host),
            Err(FlexError::LayerNotFound(_))
        ));
    }
}
