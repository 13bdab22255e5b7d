//! Mesh layer configuration and per-point instance slots

use crate::host::{InstanceHost, MeshInstance};
use bitflags::bitflags;
use flexspline_core::{FlexError, HandleId, LayerId, Result, Rotator, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a layer's meshes follow the spline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshKind {
    /// Bends along the curve from one point to the next
    #[default]
    Deforming,
    /// Keeps its shape, placed at each point
    Rigid,
}

/// Mesh axis that is stretched along the curve (deforming meshes only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardAxis {
    #[default]
    X,
    Y,
    Z,
}

/// Frame that layer offsets and directions are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSystem {
    /// Local to the spline point the instance belongs to
    #[default]
    Point,
    /// Local to the whole spline
    Curve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMode {
    NoCollision,
    #[default]
    QueryOnly,
    PhysicsOnly,
    QueryAndPhysics,
}

bitflags! {
    /// Which spline points a layer renders at. Any matching flag allows it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RenderMode: u8 {
        /// The first point
        const HEAD = 1 << 0;
        /// The last renderable point
        const TAIL = 1 << 1;
        /// Everything between head and tail
        const MIDDLE = 1 << 2;
        /// Points listed in `RenderInfo::custom_indices`
        const CUSTOM = 1 << 3;
    }
}

impl RenderMode {
    pub fn renders_head(&self) -> bool {
        self.contains(Self::HEAD)
    }

    pub fn renders_tail(&self) -> bool {
        self.contains(Self::TAIL)
    }

    pub fn renders_middle(&self) -> bool {
        self.contains(Self::MIDDLE)
    }

    pub fn renders_custom(&self) -> bool {
        self.contains(Self::CUSTOM)
    }
}

impl Default for RenderMode {
    fn default() -> Self {
        Self::HEAD | Self::TAIL | Self::MIDDLE
    }
}

bitflags! {
    /// Per-layer switches. Only honoured where the matching global switch is `Custom`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct LayerFlags: u8 {
        const ACTIVE = 1 << 0;
        const LOOP = 1 << 1;
    }
}

impl LayerFlags {
    pub fn is_active(&self) -> bool {
        self.contains(Self::ACTIVE)
    }

    pub fn loops(&self) -> bool {
        self.contains(Self::LOOP)
    }
}

impl Default for LayerFlags {
    fn default() -> Self {
        Self::ACTIVE
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshInfo {
    pub kind: MeshKind,
    pub forward_axis: ForwardAxis,
    /// Mesh asset name; `None` leaves the instance empty
    pub asset: Option<String>,
    /// Material override; `None` resets to the asset's own material
    pub material: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderInfo {
    /// Scatter by seeded chance instead of even spacing
    pub randomize_spawn_chance: bool,
    /// In `[0, 1]`
    pub spawn_chance: f32,
    pub mode: RenderMode,
    pub custom_indices: BTreeSet<usize>,
}

impl Default for RenderInfo {
    fn default() -> Self {
        Self {
            randomize_spawn_chance: true,
            spawn_chance: 1.0,
            mode: RenderMode::default(),
            custom_indices: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsInfo {
    pub collision: CollisionMode,
    pub profile: String,
    pub generate_overlap: bool,
}

impl Default for PhysicsInfo {
    fn default() -> Self {
        Self {
            collision: CollisionMode::QueryOnly,
            profile: "BlockAll".to_string(),
            generate_overlap: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationInfo {
    pub coordinate_system: CoordinateSystem,
    pub location: Vec3,
    pub random_offset: Vec3,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationInfo {
    pub coordinate_system: CoordinateSystem,
    pub rotation: Rotator,
    pub random_offset: Rotator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleInfo {
    /// Use `uniform_scale` on every axis instead of `scale`
    pub uniform: bool,
    pub uniform_scale: f32,
    pub scale: Vec3,
    /// Use `uniform_random_offset` on every axis instead of `random_offset`
    pub uniform_random: bool,
    pub uniform_random_offset: f32,
    pub random_offset: Vec3,
}

impl Default for ScaleInfo {
    fn default() -> Self {
        Self {
            uniform: true,
            uniform_scale: 1.0,
            scale: Vec3::ONE,
            uniform_random: true,
            uniform_random_offset: 0.0,
            random_offset: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpVectorInfo {
    /// Show the up-direction indicator at each point
    pub show: bool,
    pub coordinate_system: CoordinateSystem,
    pub direction: Vec3,
}

impl Default for UpVectorInfo {
    fn default() -> Self {
        Self {
            show: false,
            coordinate_system: CoordinateSystem::Curve,
            direction: Vec3::UP,
        }
    }
}

/// Static configuration of a mesh layer, copied from the template on first use
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub flags: LayerFlags,
    pub mesh: MeshInfo,
    pub render: RenderInfo,
    pub physics: PhysicsInfo,
    pub location: LocationInfo,
    pub rotation: RotationInfo,
    pub scale: ScaleInfo,
    pub up: UpVectorInfo,
}

impl LayerConfig {
    pub fn validate(&self) -> Result<()> {
        let chance = self.render.spawn_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(FlexError::ValueOutOfRange {
                field: "render.spawn_chance".into(),
                min: 0.0,
                max: 1.0,
                value: chance as f64,
            });
        }
        for (field, value) in [
            ("scale.uniform_scale", self.scale.uniform_scale),
            ("scale.uniform_random_offset", self.scale.uniform_random_offset),
        ] {
            if value < 0.0 {
                return Err(FlexError::ValueOutOfRange {
                    field: field.into(),
                    min: 0.0,
                    max: f64::INFINITY,
                    value: value as f64,
                });
            }
        }
        Ok(())
    }
}

/// One layer's objects at one spline point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerSlot {
    pub mesh: Option<MeshInstance>,
    pub indicator: Option<HandleId>,
}

impl LayerSlot {
    pub(crate) fn spawn<H: InstanceHost + ?Sized>(host: &mut H, kind: MeshKind) -> Self {
        Self {
            mesh: Some(host.spawn_mesh(kind)),
            indicator: Some(host.spawn_indicator()),
        }
    }

    pub(crate) fn release<H: InstanceHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(mesh) = self.mesh.take() {
            destroy_if_alive(host, mesh.handle);
        }
        self.release_indicator(host);
    }

    pub(crate) fn release_indicator<H: InstanceHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(indicator) = self.indicator.take() {
            destroy_if_alive(host, indicator);
        }
    }
}

pub(crate) fn destroy_if_alive<H: InstanceHost + ?Sized>(host: &mut H, handle: HandleId) {
    if host.is_alive(handle) {
        host.destroy(handle);
    }
}

/// A named configuration bundle producing one instance per spline point.
///
/// The layer owns its slots and releases their host objects when they are
/// removed; call `LayerRegistry::remove` or `clear` rather than dropping.
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    name: String,
    initialized: bool,
    pub config: LayerConfig,
    pub(crate) slots: Vec<LayerSlot>,
}

impl Layer {
    pub(crate) fn uninitialized() -> Self {
        Self {
            id: LayerId::new(),
            name: String::new(),
            initialized: false,
            config: LayerConfig::default(),
            slots: Vec::new(),
        }
    }

    pub(crate) fn initialized(name: String, config: LayerConfig) -> Self {
        Self {
            id: LayerId::new(),
            name,
            initialized: true,
            config,
            slots: Vec::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Copy the template in and mark the layer as initialized
    pub(crate) fn initialize_from(&mut self, template: &LayerConfig) {
        self.config = template.clone();
        self.initialized = true;
    }

    pub fn slots(&self) -> &[LayerSlot] {
        &self.slots
    }

    pub fn kind(&self) -> MeshKind {
        self.config.mesh.kind
    }

    /// Grow to `count` slots, spawning at `positions` first and appending
    /// the rest. Returns the number of slots created.
    pub(crate) fn grow_to<H: InstanceHost + ?Sized>(
        &mut self,
        count: usize,
        positions: &[usize],
        host: &mut H,
    ) -> usize {
        let kind = self.kind();
        let before = self.slots.len();
        for &index in positions {
            if self.slots.len() >= count {
                break;
            }
            let slot = LayerSlot::spawn(host, kind);
            self.slots.insert(index.min(self.slots.len()), slot);
        }
        while self.slots.len() < count {
            self.slots.push(LayerSlot::spawn(host, kind));
        }
        self.slots.len() - before
    }

    /// Remove and release the slot at `index`. Out-of-range is ignored.
    pub(crate) fn remove_slot<H: InstanceHost + ?Sized>(&mut self, index: usize, host: &mut H) -> bool {
        if index >= self.slots.len() {
            log::warn!(
                "layer '{}': slot index {} out of range ({} slots)",
                self.name,
                index,
                self.slots.len()
            );
            return false;
        }
        let mut slot = self.slots.remove(index);
        slot.release(host);
        true
    }

    /// Swap the mesh at `index` for one of the configured kind, if it differs
    pub(crate) fn respawn_if_kind_changed<H: InstanceHost + ?Sized>(
        &mut self,
        index: usize,
        host: &mut H,
    ) -> bool {
        let kind = self.kind();
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        match &slot.mesh {
            Some(mesh) if mesh.kind != kind => {
                destroy_if_alive(host, mesh.handle);
                slot.mesh = Some(host.spawn_mesh(kind));
                true
            }
            _ => false,
        }
    }

    pub(crate) fn release_all<H: InstanceHost + ?Sized>(&mut self, host: &mut H) {
        for slot in &mut self.slots {
            slot.release(host);
        }
        self.slots.clear();
    }
}
