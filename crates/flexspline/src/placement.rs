//! Per-point instance placement.
//!
//! Everything here is a pure function of the spline, the layer config, the
//! point records and the global switches. Results are expressed relative to
//! the spline origin.

use crate::layer::{CollisionMode, CoordinateSystem, ForwardAxis, LayerConfig, RenderInfo};
use crate::random::{name_seed, random_rotation, random_scalar, random_vector, seeded_unit};
use crate::record::PointRecord;
use crate::settings::GlobalConfig;
use flexspline_core::{CoordinateSpace, Rotator, SplineSource, Transform, Vec2, Vec3};

const LOCAL: CoordinateSpace = CoordinateSpace::Local;

/// Placement of a deforming mesh spanning point `i` to the next point
#[derive(Debug, Clone, PartialEq)]
pub struct DeformPlacement {
    /// Relative transform of the instance itself
    pub transform: Transform,
    pub start: Vec3,
    pub start_tangent: Vec3,
    pub end: Vec3,
    pub end_tangent: Vec3,
    pub start_roll: f32,
    pub end_roll: f32,
    pub start_scale: Vec2,
    pub end_scale: Vec2,
    pub start_offset: Vec2,
    pub end_offset: Vec2,
    pub up: Vec3,
    pub forward_axis: ForwardAxis,
}

pub fn can_loop(config: &LayerConfig, globals: &GlobalConfig) -> bool {
    globals.looping.resolve(config.flags.loops())
}

pub fn can_synchronize(record: &PointRecord, globals: &GlobalConfig) -> bool {
    globals.synchronize.resolve(record.synchronize_with_previous)
}

/// Collision mode of a visible instance after the global override
pub fn collision_mode(config: &LayerConfig, globals: &GlobalConfig) -> CollisionMode {
    use crate::settings::GlobalSwitch;
    match globals.collision {
        GlobalSwitch::Everywhere => CollisionMode::QueryAndPhysics,
        GlobalSwitch::Nowhere => CollisionMode::NoCollision,
        GlobalSwitch::Custom => config.physics.collision,
    }
}

/// Spawn-chance gate.
///
/// Randomized: seeded by the instance name, so the outcome is stable for the
/// lifetime of the instance. Otherwise every `1 / chance`-th point renders.
pub fn can_render_from_spawn_chance(render: &RenderInfo, index: usize, instance_name: &str) -> bool {
    let chance = render.spawn_chance;
    if render.randomize_spawn_chance {
        let seed = (name_seed(instance_name) as f32 * chance) as i32;
        return chance > seeded_unit(seed);
    }

    let interval = 1.0 / chance.clamp(1e-5, 1.0);
    let current = (index as f32 / interval) as i32;
    let previous = if index == 0 {
        if chance > 0.0 {
            1
        } else {
            0
        }
    } else {
        ((index - 1) as f32 / interval) as i32
    };
    current != previous
}

/// Render-mode gate. `final_index` is the last point index; it moves one
/// point earlier when the layer doesn't loop.
pub fn can_render_from_mode(render: &RenderInfo, index: usize, final_index: usize, loops: bool) -> bool {
    let final_index = if loops {
        final_index
    } else {
        final_index.saturating_sub(1)
    };
    let mode = render.mode;

    (mode.renders_middle() && index != 0 && index != final_index)
        || (mode.renders_head() && index == 0)
        || (mode.renders_tail() && index == final_index)
        || (mode.renders_custom() && render.custom_indices.contains(&index))
}

/// Whether the instance of `config` at `index` is shown at all
pub fn is_visible(
    config: &LayerConfig,
    globals: &GlobalConfig,
    index: usize,
    point_count: usize,
    instance_name: &str,
) -> bool {
    let final_index = point_count.saturating_sub(1);
    let loops = can_loop(config, globals);
    config.flags.is_active()
        && !(index == final_index && !loops)
        && can_render_from_spawn_chance(&config.render, index, instance_name)
        && can_render_from_mode(&config.render, index, final_index, loops)
}

/// Frame of the point's direction, without twist
fn direction_frame<S: SplineSource + ?Sized>(spline: &S, index: usize) -> Rotator {
    Rotator::from_direction(spline.direction_at(index, LOCAL))
}

/// Random scale jitter; the uniform variant uses one draw on every axis
fn random_scale(config: &LayerConfig, index: usize, layer_name: &str) -> Vec3 {
    let scale = &config.scale;
    if scale.uniform_random {
        Vec3::splat(random_scalar(scale.uniform_random_offset, index, layer_name))
    } else {
        random_vector(scale.random_offset, index, layer_name)
    }
}

pub fn rigid_location<S: SplineSource + ?Sized>(
    spline: &S,
    config: &LayerConfig,
    record: &PointRecord,
    index: usize,
    layer_name: &str,
) -> Vec3 {
    let offset = config.location.location
        + record.location_offset
        + random_vector(config.location.random_offset, index, layer_name);
    let offset = match config.location.coordinate_system {
        CoordinateSystem::Point => direction_frame(spline, index).rotate_vector(offset),
        CoordinateSystem::Curve => offset,
    };
    spline.location_at(index, LOCAL) + offset
}

pub fn rigid_rotation<S: SplineSource + ?Sized>(
    spline: &S,
    config: &LayerConfig,
    record: &PointRecord,
    index: usize,
    layer_name: &str,
) -> Rotator {
    let point = match config.rotation.coordinate_system {
        CoordinateSystem::Point => spline.rotation_at(index, LOCAL),
        CoordinateSystem::Curve => Rotator::ZERO,
    };
    config.rotation.rotation
        + random_rotation(config.rotation.random_offset, index, layer_name)
        + record.rotation_offset
        + point
}

pub fn rigid_scale<S: SplineSource + ?Sized>(
    spline: &S,
    config: &LayerConfig,
    record: &PointRecord,
    index: usize,
    layer_name: &str,
) -> Vec3 {
    let base = if config.scale.uniform {
        Vec3::splat(config.scale.uniform_scale)
    } else {
        config.scale.scale
    };
    base * spline.scale_at(index) + record.scale_offset + random_scale(config, index, layer_name)
}

pub fn rigid_transform<S: SplineSource + ?Sized>(
    spline: &S,
    config: &LayerConfig,
    record: &PointRecord,
    index: usize,
    layer_name: &str,
) -> Transform {
    Transform {
        position: rigid_location(spline, config, record, index, layer_name),
        rotation: rigid_rotation(spline, config, record, index, layer_name),
        scale: rigid_scale(spline, config, record, index, layer_name),
    }
}

/// Up direction of the instance at `index`. In point coordinates the layer
/// and point up vectors are turned into the frame halfway between the
/// neighbouring points' directions.
pub fn up_direction<S: SplineSource + ?Sized>(
    spline: &S,
    config: &LayerConfig,
    record: &PointRecord,
    index: usize,
) -> Vec3 {
    let layer_up = config.up.direction;
    let point_up = record.up_direction;
    match config.up.coordinate_system {
        CoordinateSystem::Curve => layer_up + point_up,
        CoordinateSystem::Point => {
            let count = spline.point_count();
            let next = if index + 1 < count { index + 1 } else { index };
            let previous = index.saturating_sub(1);
            let blended = spline
                .direction_at(previous, LOCAL)
                .lerp(spline.direction_at(next, LOCAL), 0.5);
            let frame = Rotator::from_direction(blended);
            frame.rotate_vector(layer_up) + frame.rotate_vector(point_up)
        }
    }
}

/// Placement of the deforming instance from `index` to the next point.
///
/// `records[index]` must exist; the previous record is only consulted when
/// synchronization applies.
pub fn deforming_placement<S: SplineSource + ?Sized>(
    spline: &S,
    config: &LayerConfig,
    records: &[PointRecord],
    index: usize,
    layer_name: &str,
    globals: &GlobalConfig,
) -> Option<DeformPlacement> {
    let record = records.get(index)?;
    let count = spline.point_count();
    if count == 0 {
        return None;
    }
    let next = (index + 1) % count;
    let previous = if can_synchronize(record, globals) && index > 0 {
        records.get(index - 1)
    } else {
        None
    };

    let jitter = |i| random_vector(config.location.random_offset, i, layer_name);
    let mut start = spline.location_at(index, LOCAL);
    let mut end = spline.location_at(next, LOCAL);
    let relative_position = match config.location.coordinate_system {
        CoordinateSystem::Point => {
            let offset = config.location.location;
            start += direction_frame(spline, index).rotate_vector(offset) + jitter(index);
            end += direction_frame(spline, next).rotate_vector(offset) + jitter(next);
            Vec3::ZERO
        }
        CoordinateSystem::Curve => config.location.location + jitter(index),
    };

    let scale = &config.scale;
    let jitter_scale = random_scale(config, index, layer_name);
    let layer_scale = if scale.uniform {
        Vec3::new(1.0, scale.uniform_scale, scale.uniform_scale)
    } else {
        scale.scale
    };
    let cross_section = layer_scale.yz() + jitter_scale.yz();

    let rotation = config.rotation.rotation + random_rotation(config.rotation.random_offset, index, layer_name);

    Some(DeformPlacement {
        transform: Transform {
            position: relative_position,
            rotation,
            scale: Vec3::new(layer_scale.x + jitter_scale.x, 1.0, 1.0),
        },
        start,
        start_tangent: spline.tangent_at(index, LOCAL),
        end,
        end_tangent: spline.tangent_at(next, LOCAL),
        start_roll: previous.map_or(record.start_roll, |p| p.end_roll),
        end_roll: record.end_roll,
        start_scale: previous.map_or(record.start_scale, |p| p.end_scale) * cross_section,
        end_scale: record.end_scale * cross_section,
        start_offset: previous.map_or(record.start_offset, |p| p.end_offset),
        end_offset: record.end_offset,
        up: up_direction(spline, config, record, index),
        forward_axis: config.mesh.forward_axis,
    })
}
