//! The scene host that owns mesh instances, indicators and labels.
//!
//! FlexSpline never touches scene objects directly: it spawns them through an
//! `InstanceHost`, keeps the returned handles, and pushes `InstanceCommand`s.
//! Positions and directions in commands are relative to the spline origin.
//! Handles can die out of band, so every use is preceded by `is_alive`.

use crate::layer::{CollisionMode, ForwardAxis, MeshKind};
use flexspline_core::{Color, HandleId, Transform, Vec2, Vec3};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A spawned mesh instance. The host picks the name, which seeds
/// randomized spawn chance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshInstance {
    pub handle: HandleId,
    pub kind: MeshKind,
    pub name: String,
}

/// Start and end of a deforming mesh's curve segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentEnds {
    pub start: Vec3,
    pub start_tangent: Vec3,
    pub end: Vec3,
    pub end_tangent: Vec3,
}

/// A state change pushed to a hosted object
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceCommand {
    SetTransform(Transform),
    SetSegment(SegmentEnds),
    SetRoll { start: f32, end: f32 },
    SetCrossSectionScale { start: Vec2, end: Vec2 },
    SetCrossSectionOffset { start: Vec2, end: Vec2 },
    SetUpDirection(Vec3),
    SetForwardAxis(ForwardAxis),
    SetVisibility(bool),
    SetCollisionMode(CollisionMode),
    SetCollisionProfile { profile: String, generate_overlap: bool },
    SetMesh(Option<String>),
    SetMaterial(Option<String>),
    SetLabel { text: String, size: f32, color: Color },
    SetIndicatorStyle { color: Color, size: f32 },
}

pub trait InstanceHost {
    fn spawn_mesh(&mut self, kind: MeshKind) -> MeshInstance;
    fn spawn_indicator(&mut self) -> HandleId;
    fn spawn_label(&mut self) -> HandleId;
    fn destroy(&mut self, handle: HandleId);
    fn is_alive(&self, handle: HandleId) -> bool;
    fn is_visible(&self, handle: HandleId) -> bool;
    /// Highest vertical extent of the object's bounds, if it has any
    fn bounds_top(&self, handle: HandleId) -> Option<f32>;
    fn apply(&mut self, handle: HandleId, command: InstanceCommand);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostedKind {
    Mesh(MeshKind),
    Indicator,
    Label,
}

/// Last known state of one hosted object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostedObject {
    pub kind: HostedKind,
    pub name: String,
    pub visible: bool,
    pub transform: Transform,
    pub segment: Option<SegmentEnds>,
    pub roll: (f32, f32),
    pub cross_section_scale: (Vec2, Vec2),
    pub cross_section_offset: (Vec2, Vec2),
    pub up_direction: Vec3,
    pub forward_axis: ForwardAxis,
    pub collision: CollisionMode,
    pub profile: String,
    pub generate_overlap: bool,
    pub mesh: Option<String>,
    pub material: Option<String>,
    pub text: String,
    pub size: f32,
    pub color: Color,
}

impl HostedObject {
    fn new(kind: HostedKind, name: String) -> Self {
        Self {
            kind,
            name,
            visible: true,
            transform: Transform::IDENTITY,
            segment: None,
            roll: (0.0, 0.0),
            cross_section_scale: (Vec2::ONE, Vec2::ONE),
            cross_section_offset: (Vec2::ZERO, Vec2::ZERO),
            up_direction: Vec3::ZERO,
            forward_axis: ForwardAxis::X,
            collision: CollisionMode::QueryOnly,
            profile: String::new(),
            generate_overlap: false,
            mesh: None,
            material: None,
            text: String::new(),
            size: 1.0,
            color: Color::WHITE,
        }
    }

    fn apply(&mut self, command: InstanceCommand) {
        match command {
            InstanceCommand::SetTransform(transform) => self.transform = transform,
            InstanceCommand::SetSegment(segment) => self.segment = Some(segment),
            InstanceCommand::SetRoll { start, end } => self.roll = (start, end),
            InstanceCommand::SetCrossSectionScale { start, end } => {
                self.cross_section_scale = (start, end)
            }
            InstanceCommand::SetCrossSectionOffset { start, end } => {
                self.cross_section_offset = (start, end)
            }
            InstanceCommand::SetUpDirection(up) => self.up_direction = up,
            InstanceCommand::SetForwardAxis(axis) => self.forward_axis = axis,
            InstanceCommand::SetVisibility(visible) => self.visible = visible,
            InstanceCommand::SetCollisionMode(mode) => self.collision = mode,
            InstanceCommand::SetCollisionProfile {
                profile,
                generate_overlap,
            } => {
                self.profile = profile;
                self.generate_overlap = generate_overlap;
            }
            InstanceCommand::SetMesh(mesh) => self.mesh = mesh,
            InstanceCommand::SetMaterial(material) => self.material = material,
            InstanceCommand::SetLabel { text, size, color } => {
                self.text = text;
                self.size = size;
                self.color = color;
            }
            InstanceCommand::SetIndicatorStyle { color, size } => {
                self.color = color;
                self.size = size;
            }
        }
    }

    /// Top of the object's bounds given its mesh height.
    ///
    /// Meshes have their pivot at the base. Rigid meshes scale the height by
    /// their vertical scale; deforming meshes by the larger vertical
    /// cross-section scale and sit on the higher of their segment ends.
    fn top(&self, height: f32) -> f32 {
        let t = &self.transform;
        match (self.kind, self.segment) {
            (HostedKind::Mesh(MeshKind::Deforming), Some(segment)) => {
                let (start, end) = self.cross_section_scale;
                let base = t.position.y + segment.start.y.max(segment.end.y);
                base + height * start.x.max(end.x) * t.scale.y
            }
            _ => t.position.y + height * t.scale.y,
        }
    }
}

/// In-memory host that records the last value of every command.
///
/// Used by tests and the CLI. Mesh bounds come from a name -> height table;
/// meshes without an asset or a known height have no bounds.
#[derive(Debug, Default)]
pub struct RecordingHost {
    next_handle: u64,
    objects: BTreeMap<HandleId, HostedObject>,
    mesh_heights: HashMap<String, f32>,
    spawned: usize,
    destroyed: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mesh_heights(mesh_heights: HashMap<String, f32>) -> Self {
        Self {
            mesh_heights,
            ..Self::default()
        }
    }

    pub fn set_mesh_height(&mut self, asset: impl Into<String>, height: f32) {
        self.mesh_heights.insert(asset.into(), height);
    }

    fn spawn(&mut self, kind: HostedKind, prefix: &str) -> HandleId {
        self.next_handle += 1;
        let handle = HandleId::from_raw(self.next_handle);
        let name = format!("{}_{}", prefix, self.next_handle);
        self.objects.insert(handle, HostedObject::new(kind, name));
        self.spawned += 1;
        handle
    }

    /// Destroy a handle behind FlexSpline's back
    pub fn kill(&mut self, handle: HandleId) {
        self.objects.remove(&handle);
    }

    pub fn get(&self, handle: HandleId) -> Option<&HostedObject> {
        self.objects.get(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.objects.len()
    }

    pub fn count_of(&self, kind: HostedKind) -> usize {
        self.objects.values().filter(|o| o.kind == kind).count()
    }

    pub fn spawned_total(&self) -> usize {
        self.spawned
    }

    pub fn destroyed_total(&self) -> usize {
        self.destroyed
    }

    pub fn iter(&self) -> impl Iterator<Item = (HandleId, &HostedObject)> {
        self.objects.iter().map(|(h, o)| (*h, o))
    }
}

impl InstanceHost for RecordingHost {
    fn spawn_mesh(&mut self, kind: MeshKind) -> MeshInstance {
        let prefix = match kind {
            MeshKind::Deforming => "DeformingMesh",
            MeshKind::Rigid => "RigidMesh",
        };
        let handle = self.spawn(HostedKind::Mesh(kind), prefix);
        let name = self.objects[&handle].name.clone();
        MeshInstance { handle, kind, name }
    }

    fn spawn_indicator(&mut self) -> HandleId {
        self.spawn(HostedKind::Indicator, "UpArrow")
    }

    fn spawn_label(&mut self) -> HandleId {
        self.spawn(HostedKind::Label, "PointLabel")
    }

    fn destroy(&mut self, handle: HandleId) {
        if self.objects.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }

    fn is_alive(&self, handle: HandleId) -> bool {
        self.objects.contains_key(&handle)
    }

    fn is_visible(&self, handle: HandleId) -> bool {
        self.objects.get(&handle).is_some_and(|o| o.visible)
    }

    fn bounds_top(&self, handle: HandleId) -> Option<f32> {
        let object = self.objects.get(&handle)?;
        if !matches!(object.kind, HostedKind::Mesh(_)) {
            return None;
        }
        let height = self.mesh_heights.get(object.mesh.as_ref()?)?;
        Some(object.top(*height))
    }

    fn apply(&mut self, handle: HandleId, command: InstanceCommand) {
        if let Some(object) = self.objects.get_mut(&handle) {
            object.apply(command);
        }
    }
}
