//! Seeded per-point jitter
//!
//! Every draw comes from a fresh stream seeded by the layer name, the base
//! value and the point index, so a point keeps its jitter when unrelated
//! points are edited and placements are rebuilt.

use flexspline_core::{ContentHash, Rotator, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn stream(seed: i32) -> StdRng {
    StdRng::seed_from_u64(seed as u32 as u64)
}

/// Stable 32-bit hash of a layer or instance name
pub fn name_seed(name: &str) -> i32 {
    ContentHash::from_str(name).to_u32() as i32
}

/// `base` scaled by a value in `[-1, 1]`. A zero base returns exactly zero.
pub fn random_scalar(base: f32, index: usize, layer_name: &str) -> f32 {
    if base == 0.0 {
        return 0.0;
    }
    let seed = name_seed(layer_name)
        .wrapping_add(base as i32)
        .wrapping_add(index as i32);
    base * stream(seed).gen_range(-1.0f32..=1.0)
}

/// `random_scalar` per axis; zero axes stay zero
pub fn random_vector(range: Vec3, index: usize, layer_name: &str) -> Vec3 {
    Vec3::new(
        random_scalar(range.x, index, layer_name),
        random_scalar(range.y, index, layer_name),
        random_scalar(range.z, index, layer_name),
    )
}

/// Randomize a rotation through its Euler vector
pub fn random_rotation(range: Rotator, index: usize, layer_name: &str) -> Rotator {
    Rotator::from_vector(random_vector(range.to_vector(), index, layer_name))
}

/// A single value in `[0, 1)` for a derived seed
pub fn seeded_unit(seed: i32) -> f32 {
    stream(seed.wrapping_add(1).wrapping_mul(13)).gen::<f32>()
}
