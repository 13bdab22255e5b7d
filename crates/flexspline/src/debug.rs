//! Point index labels and up-direction indicators

use crate::host::{InstanceCommand, InstanceHost};
use crate::layer::{Layer, MeshKind};
use crate::placement::{can_loop, up_direction};
use crate::record::PointRecord;
use crate::registry::LayerRegistry;
use crate::settings::{DebugSettings, GlobalConfig};
use flexspline_core::{Color, CoordinateSpace, Rotator, SplineSource, Transform, Vec3};

/// Indicator colors by layer ordinal, as RGB hex. Layers past the end
/// reuse the last entry.
pub const PALETTE: [u32; 11] = [
    0xF39C12, // orange
    0x00FF00, // green
    0x0000FF, // blue
    0xFF0000, // red
    0x2ECC71, // emerald
    0xFF00FF, // magenta
    0x00FFFF, // cyan
    0xFFFF00, // yellow
    0xA907E4, // purple
    0x1ABC9C, // turquoise
    0xBDC3C7, // silver
];

pub fn indicator_color(ordinal: usize) -> Color {
    Color::from_hex(PALETTE[ordinal.min(PALETTE.len() - 1)])
}

/// Index whose instance a layer's label height is taken from. The final
/// point of a non-looping layer has nothing rendered, so it uses the
/// previous point.
fn bounds_index(layer: &Layer, globals: &GlobalConfig, index: usize, point_count: usize) -> usize {
    if index + 1 == point_count && index > 0 && !can_loop(&layer.config, globals) {
        index - 1
    } else {
        index
    }
}

/// Point location raised to clear every visible instance at that point
pub fn label_location<S, H>(
    spline: &S,
    layers: &LayerRegistry,
    host: &H,
    globals: &GlobalConfig,
    index: usize,
) -> Vec3
where
    S: SplineSource + ?Sized,
    H: InstanceHost + ?Sized,
{
    let point_count = spline.point_count();
    let location = spline.location_at(index, CoordinateSpace::Local);
    let highest = layers
        .iter()
        .filter_map(|layer| {
            let at = bounds_index(layer, globals, index, point_count);
            let mesh = layer.slots().get(at)?.mesh.as_ref()?;
            if host.is_alive(mesh.handle) && host.is_visible(mesh.handle) {
                host.bounds_top(mesh.handle)
            } else {
                None
            }
        })
        .fold(location.y, f32::max);
    Vec3::new(location.x, highest, location.z)
}

/// Push label and indicator state for every point
pub(crate) fn update<S, H>(
    spline: &S,
    layers: &LayerRegistry,
    records: &[PointRecord],
    host: &mut H,
    globals: &GlobalConfig,
    settings: &DebugSettings,
) where
    S: SplineSource + ?Sized,
    H: InstanceHost + ?Sized,
{
    let point_count = records.len();
    for (index, record) in records.iter().enumerate() {
        let location = label_location(spline, layers, host, globals, index);
        let yaw = spline.rotation_at(index, CoordinateSpace::Local).yaw;
        let label_rotation = Rotator::new(0.0, -yaw, 0.0);

        if let Some(label) = record.label().filter(|&h| host.is_alive(h)) {
            host.apply(
                label,
                InstanceCommand::SetTransform(Transform::from_position(location).with_rotation(label_rotation)),
            );
            host.apply(
                label,
                InstanceCommand::SetLabel {
                    text: index.to_string(),
                    size: settings.point_number_size,
                    color: settings.label_color,
                },
            );
            host.apply(label, InstanceCommand::SetVisibility(settings.show_point_numbers));
        }

        let indicator_location = location + label_rotation.up() * settings.up_arrow_offset;
        for (ordinal, layer) in layers.iter().enumerate() {
            let Some(slot) = layer.slots().get(index) else {
                log::warn!(
                    "layer '{}': no slot at point {} ({} slots)",
                    layer.name(),
                    index,
                    layer.slots().len()
                );
                continue;
            };
            let Some(indicator) = slot.indicator.filter(|&h| host.is_alive(h)) else {
                continue;
            };

            let mesh_alive = slot
                .mesh
                .as_ref()
                .is_some_and(|m| m.kind == MeshKind::Deforming && host.is_alive(m.handle));
            let final_cut = index + 1 == point_count && !can_loop(&layer.config, globals);
            if !(layer.config.up.show && mesh_alive && !final_cut) {
                host.apply(indicator, InstanceCommand::SetVisibility(false));
                continue;
            }

            let up = up_direction(spline, &layer.config, record, index);
            host.apply(
                indicator,
                InstanceCommand::SetTransform(
                    Transform::from_position(indicator_location).with_rotation(Rotator::from_direction(up)),
                ),
            );
            host.apply(
                indicator,
                InstanceCommand::SetIndicatorStyle {
                    color: indicator_color(ordinal),
                    size: settings.up_arrow_size,
                },
            );
            host.apply(indicator, InstanceCommand::SetVisibility(true));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use crate::layer::{LayerConfig, LayerFlags};
    use approx::assert_relative_eq;
    use flexspline_core::ControlPointSpline;

    #[test]
    fn test_palette_clamps() {
        assert_eq!(indicator_color(1), Color::GREEN);
        assert_eq!(indicator_color(10), indicator_color(25));
        assert_eq!(indicator_color(0), Color::from_hex(0xF39C12));
        assert_eq!(indicator_color(10), Color::from_hex(0xBDC3C7));
    }

    fn setup(loops: bool) -> (ControlPointSpline, LayerRegistry, RecordingHost) {
        let spline = ControlPointSpline::from_positions(
            &[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)],
            false,
        );
        let mut host = RecordingHost::new();
        host.set_mesh_height("post", 6.0);
        let mut config = LayerConfig::default();
        config.mesh.kind = MeshKind::Rigid;
        if loops {
            config.flags |= LayerFlags::LOOP;
        }
        let mut layers = LayerRegistry::new();
        let id = layers.insert("posts", config).unwrap();
        let layer = layers.get_mut(id).unwrap();
        layer.grow_to(3, &[], &mut host);
        for (i, slot) in layer.slots().iter().enumerate() {
            let mesh = slot.mesh.as_ref().unwrap().handle;
            host.apply(mesh, InstanceCommand::SetMesh(Some("post".into())));
            host.apply(
                mesh,
                InstanceCommand::SetTransform(Transform::from_position(Vec3::new(i as f32 * 10.0, i as f32, 0.0))),
            );
        }
        (spline, layers, host)
    }

    #[test]
    fn test_label_clears_tallest_visible_instance() {
        let (spline, layers, mut host) = setup(false);
        let at = label_location(&spline, &layers, &host, &GlobalConfig::default(), 1);
        assert_eq!(at, Vec3::new(10.0, 7.0, 0.0));

        let mesh = layers.iter().next().unwrap().slots()[1].mesh.as_ref().unwrap().handle;
        host.apply(mesh, InstanceCommand::SetVisibility(false));
        let at = label_location(&spline, &layers, &host, &GlobalConfig::default(), 1);
        assert_relative_eq!(at.y, 0.0);
    }

    #[test]
    fn test_final_label_uses_previous_instance() {
        let (spline, layers, host) = setup(false);
        let at = label_location(&spline, &layers, &host, &GlobalConfig::default(), 2);
        assert_eq!(at, Vec3::new(20.0, 7.0, 0.0));

        let (spline, layers, host) = setup(true);
        let at = label_location(&spline, &layers, &host, &GlobalConfig::default(), 2);
        assert_eq!(at, Vec3::new(20.0, 8.0, 0.0));
    }

    #[test]
    fn test_stale_mesh_is_ignored() {
        let (spline, layers, mut host) = setup(false);
        let mesh = layers.iter().next().unwrap().slots()[0].mesh.as_ref().unwrap().handle;
        host.kill(mesh);
        let at = label_location(&spline, &layers, &host, &GlobalConfig::default(), 0);
        assert_eq!(at, Vec3::ZERO);
    }
}
