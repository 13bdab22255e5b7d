//! FlexSpline - Procedural mesh layers along a spline
//!
//! A `FlexSpline` keeps one record per spline point and one mesh instance per
//! point for every configured layer. Each `reconcile` pass:
//! - detects deleted and inserted points by hashing their locations
//! - grows and shrinks records and layer slots in lockstep
//! - recomputes every instance placement (rigid or deforming)
//! - refreshes point labels and up-direction indicators
//!
//! Scene objects live in an `InstanceHost`; `RecordingHost` is an in-memory
//! implementation used by tests and the CLI.

pub mod debug;
mod flex_spline;
pub mod host;
pub mod identity;
pub mod layer;
pub mod placement;
pub mod random;
mod record;
mod registry;
pub mod scene;
mod settings;

pub use flex_spline::{FlexSpline, ReconcileReport};
pub use host::{InstanceCommand, InstanceHost, MeshInstance, RecordingHost};
pub use layer::{Layer, LayerConfig, LayerFlags, LayerSlot, MeshKind, RenderMode};
pub use record::{Axis, PointEdit, PointRecord, SelectionSummary};
pub use registry::LayerRegistry;
pub use scene::{load_scene, load_scene_string, SceneFile, SplineEdit};
pub use settings::{DebugSettings, GlobalConfig, GlobalSwitch};
