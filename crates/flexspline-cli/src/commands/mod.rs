//! CLI command implementations

pub mod layers;
pub mod place;
pub mod simulate;

use anyhow::{Context, Result};
use flexspline::{load_scene, SceneFile};

pub(crate) fn open_scene(path: &str) -> Result<SceneFile> {
    load_scene(path).with_context(|| format!("Failed to load scene: {}", path))
}
