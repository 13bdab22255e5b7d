//! The reconciliation engine.
//!
//! `FlexSpline` owns the point records and the layer registry and keeps both
//! aligned with a spline's points. Each call to `reconcile` runs one full
//! pass: find deleted and inserted points by hash, grow and shrink records
//! and layer slots to match, refresh identities, then push placements and
//! debug state to the host.

use crate::debug;
use crate::host::{InstanceCommand, InstanceHost, MeshInstance, SegmentEnds};
use crate::identity::{deleted_indices, inserted_indices, live_hashes};
use crate::layer::{destroy_if_alive, CollisionMode, Layer, LayerConfig, MeshKind};
use crate::placement::{
    can_synchronize, collision_mode, deforming_placement, is_visible, rigid_transform,
};
use crate::record::{PointEdit, PointRecord, SelectionSummary};
use crate::registry::LayerRegistry;
use crate::settings::{DebugSettings, GlobalConfig};
use flexspline_core::{PointHash, SplineSource};
use serde::Serialize;

/// What one reconciliation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub point_count: usize,
    /// Record indices removed, highest first
    pub deleted: Vec<usize>,
    /// Point indices that received a new record, lowest first
    pub inserted: Vec<usize>,
    pub layers_initialized: usize,
    pub slots_created: usize,
    pub slots_removed: usize,
    pub instances_respawned: usize,
    pub instances_visible: usize,
    pub instances_hidden: usize,
    /// Slots skipped because their mesh handle was gone or out of range
    pub skipped: usize,
}

impl ReconcileReport {
    /// True when the pass created, removed or respawned nothing
    pub fn is_structural_noop(&self) -> bool {
        self.deleted.is_empty()
            && self.inserted.is_empty()
            && self.layers_initialized == 0
            && self.slots_created == 0
            && self.slots_removed == 0
            && self.instances_respawned == 0
    }
}

/// Mesh layers laid out along a spline
#[derive(Debug, Default)]
pub struct FlexSpline {
    pub globals: GlobalConfig,
    pub debug: DebugSettings,
    /// Config copied into every newly added layer
    pub template: LayerConfig,
    layers: LayerRegistry,
    records: Vec<PointRecord>,
}

impl FlexSpline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template: LayerConfig) -> Self {
        Self {
            template,
            ..Self::default()
        }
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerRegistry {
        &mut self.layers
    }

    pub fn records(&self) -> &[PointRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&PointRecord> {
        self.records.get(index)
    }

    pub fn record_mut(&mut self, index: usize) -> Option<&mut PointRecord> {
        self.records.get_mut(index)
    }

    /// Number of active layers producing meshes of `kind`
    pub fn instance_count_for_kind(&self, kind: MeshKind) -> usize {
        self.layers.count_active(kind)
    }

    /// Bring records and every layer in line with `spline` and push fresh
    /// placements to `host`
    pub fn reconcile<S, H>(&mut self, spline: &S, host: &mut H) -> ReconcileReport
    where
        S: SplineSource + ?Sized,
        H: InstanceHost + ?Sized,
    {
        let live = live_hashes(spline);
        let point_count = live.len();
        let previous: Vec<PointHash> = self.records.iter().map(|r| r.identity).collect();
        let previous_count = previous.len();

        let mut report = ReconcileReport {
            point_count,
            deleted: deleted_indices(&previous, &live),
            inserted: inserted_indices(&previous, &live),
            ..ReconcileReport::default()
        };

        report.layers_initialized = self.layers.initialize_pending(&self.template);

        for &index in &report.inserted {
            let record = PointRecord::with_label(host.spawn_label());
            let at = index.min(self.records.len());
            self.records.insert(at, record);
        }

        for &index in &report.deleted {
            self.remove_record(index, host);
        }

        for layer in self.layers.iter_mut() {
            // Layers that matched the old records grow where the records grew
            let positions: &[usize] = if layer.slots.len() == previous_count {
                &report.inserted
            } else {
                &[]
            };
            report.slots_created += layer.grow_to(point_count, positions, host);
        }

        for &index in &report.deleted {
            for layer in self.layers.iter_mut() {
                if layer.slots.len() > point_count && layer.remove_slot(index, host) {
                    report.slots_removed += 1;
                }
            }
        }

        if self.records.len() != point_count {
            log::warn!(
                "{} records for {} spline points after alignment",
                self.records.len(),
                point_count
            );
        }
        for (record, hash) in self.records.iter_mut().zip(&live) {
            record.identity = *hash;
        }

        self.update_instances(spline, host, &mut report);
        debug::update(spline, &self.layers, &self.records, host, &self.globals, &self.debug);

        log::debug!(
            "reconciled {} points: -{} +{} records, {} slots created, {} removed, {} respawned",
            point_count,
            report.deleted.len(),
            report.inserted.len(),
            report.slots_created,
            report.slots_removed,
            report.instances_respawned
        );
        report
    }

    fn remove_record<H: InstanceHost + ?Sized>(&mut self, index: usize, host: &mut H) {
        if index >= self.records.len() {
            log::warn!(
                "record index {} out of range ({} records)",
                index,
                self.records.len()
            );
            return;
        }
        let record = self.records.remove(index);
        if let Some(label) = record.label() {
            destroy_if_alive(host, label);
        }
        for layer in self.layers.iter_mut() {
            if let Some(slot) = layer.slots.get_mut(index) {
                slot.release_indicator(host);
            }
        }
    }

    fn update_instances<S, H>(&mut self, spline: &S, host: &mut H, report: &mut ReconcileReport)
    where
        S: SplineSource + ?Sized,
        H: InstanceHost + ?Sized,
    {
        let point_count = spline.point_count();
        let Self {
            layers,
            records,
            globals,
            ..
        } = self;

        for layer in layers.iter_mut() {
            for index in 0..point_count {
                if index >= layer.slots.len() || index >= records.len() {
                    log::warn!(
                        "layer '{}': point {} out of range ({} slots, {} records)",
                        layer.name(),
                        index,
                        layer.slots.len(),
                        records.len()
                    );
                    report.skipped += 1;
                    continue;
                }
                if layer.respawn_if_kind_changed(index, host) {
                    report.instances_respawned += 1;
                }
                let Some(mesh) = layer.slots[index].mesh.clone().filter(|m| host.is_alive(m.handle)) else {
                    report.skipped += 1;
                    continue;
                };

                if is_visible(&layer.config, globals, index, point_count, &mesh.name) {
                    apply_visible(spline, layer, records, index, &mesh, globals, host);
                    report.instances_visible += 1;
                } else {
                    host.apply(mesh.handle, InstanceCommand::SetVisibility(false));
                    host.apply(
                        mesh.handle,
                        InstanceCommand::SetCollisionMode(CollisionMode::NoCollision),
                    );
                    report.instances_hidden += 1;
                }
            }
        }
    }

    /// Values shared by the selected records. Invalid indices are ignored.
    pub fn selection_summary(&self, selection: &[usize]) -> SelectionSummary {
        let selected: Vec<&PointRecord> = selection.iter().filter_map(|&i| self.records.get(i)).collect();
        SelectionSummary::of(&selected)
    }

    /// Apply `edit` to every valid selected record; returns how many changed
    pub fn edit_selection(&mut self, selection: &[usize], edit: PointEdit) -> usize {
        let mut applied = 0;
        for &index in selection {
            match self.records.get_mut(index) {
                Some(record) => {
                    record.apply(&edit);
                    applied += 1;
                }
                None => log::warn!("selected point {} out of range", index),
            }
        }
        applied
    }

    /// Start values are read-only when any selected point past the first
    /// takes them from its predecessor
    pub fn is_start_editable(&self, selection: &[usize]) -> bool {
        !selection.iter().any(|&index| {
            index > 0
                && self
                    .records
                    .get(index)
                    .is_some_and(|r| can_synchronize(r, &self.globals))
        })
    }

    /// Destroy every host object and forget all records and layers
    pub fn clear<H: InstanceHost + ?Sized>(&mut self, host: &mut H) {
        self.layers.clear(host);
        for record in self.records.drain(..) {
            if let Some(label) = record.label() {
                destroy_if_alive(host, label);
            }
        }
    }
}

fn apply_visible<S, H>(
    spline: &S,
    layer: &Layer,
    records: &[PointRecord],
    index: usize,
    mesh: &MeshInstance,
    globals: &GlobalConfig,
    host: &mut H,
) where
    S: SplineSource + ?Sized,
    H: InstanceHost + ?Sized,
{
    let config = &layer.config;
    let handle = mesh.handle;
    host.apply(
        handle,
        InstanceCommand::SetCollisionProfile {
            profile: config.physics.profile.clone(),
            generate_overlap: config.physics.generate_overlap,
        },
    );
    host.apply(handle, InstanceCommand::SetVisibility(true));
    host.apply(handle, InstanceCommand::SetCollisionMode(collision_mode(config, globals)));
    host.apply(handle, InstanceCommand::SetMesh(config.mesh.asset.clone()));
    host.apply(handle, InstanceCommand::SetMaterial(config.mesh.material.clone()));

    match mesh.kind {
        MeshKind::Rigid => {
            let transform = rigid_transform(spline, config, &records[index], index, layer.name());
            host.apply(handle, InstanceCommand::SetTransform(transform));
        }
        MeshKind::Deforming => {
            let Some(p) = deforming_placement(spline, config, records, index, layer.name(), globals) else {
                return;
            };
            host.apply(handle, InstanceCommand::SetTransform(p.transform));
            host.apply(
                handle,
                InstanceCommand::SetSegment(SegmentEnds {
                    start: p.start,
                    start_tangent: p.start_tangent,
                    end: p.end,
                    end_tangent: p.end_tangent,
                }),
            );
            host.apply(
                handle,
                InstanceCommand::SetCrossSectionOffset {
                    start: p.start_offset,
                    end: p.end_offset,
                },
            );
            host.apply(handle, InstanceCommand::SetUpDirection(p.up));
            host.apply(handle, InstanceCommand::SetForwardAxis(p.forward_axis));
            host.apply(
                handle,
                InstanceCommand::SetRoll {
                    start: p.start_roll,
                    end: p.end_roll,
                },
            );
            host.apply(
                handle,
                InstanceCommand::SetCrossSectionScale {
                    start: p.start_scale,
                    end: p.end_scale,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostedKind, RecordingHost};
    use crate::layer::{LayerFlags, RenderMode};
    use crate::record::Axis;
    use crate::settings::GlobalSwitch;
    use approx::assert_relative_eq;
    use flexspline_core::{ControlPointSpline, SplineControlPoint, Vec2, Vec3};

    fn line(n: usize) -> ControlPointSpline {
        let points: Vec<Vec3> = (0..n).map(|i| Vec3::new(i as f32 * 10.0, 0.0, 0.0)).collect();
        ControlPointSpline::from_positions(&points, false)
    }

    fn assert_aligned(flex: &FlexSpline, spline: &ControlPointSpline) {
        assert_eq!(flex.records().len(), spline.len());
        for layer in flex.layers().iter() {
            assert_eq!(layer.slots().len(), spline.len(), "layer '{}'", layer.name());
        }
    }

    fn with_two_layers() -> FlexSpline {
        let mut flex = FlexSpline::new();
        flex.layers_mut().insert("rails", LayerConfig::default()).unwrap();
        let mut posts = LayerConfig::default();
        posts.mesh.kind = MeshKind::Rigid;
        flex.layers_mut().insert("posts", posts).unwrap();
        flex
    }

    #[test]
    fn test_first_pass_populates_everything() {
        let spline = line(4);
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();

        let report = flex.reconcile(&spline, &mut host);
        assert_aligned(&flex, &spline);
        assert_eq!(report.inserted, vec![0, 1, 2, 3]);
        assert_eq!(report.slots_created, 8);
        assert_eq!(host.count_of(HostedKind::Label), 4);
        assert_eq!(host.count_of(HostedKind::Indicator), 8);
        assert_eq!(host.count_of(HostedKind::Mesh(MeshKind::Rigid)), 4);
    }

    #[test]
    fn test_second_pass_without_edit_is_noop() {
        let spline = line(5);
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();
        flex.reconcile(&spline, &mut host);
        let spawned = host.spawned_total();
        let before: Vec<_> = host.iter().map(|(h, o)| (h, o.clone())).collect();

        let report = flex.reconcile(&spline, &mut host);
        assert!(report.is_structural_noop());
        assert_eq!(host.spawned_total(), spawned);
        assert_eq!(host.destroyed_total(), 0);
        let after: Vec<_> = host.iter().map(|(h, o)| (h, o.clone())).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_deleting_a_point_removes_matching_record_and_slots() {
        let mut spline = line(5);
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();
        flex.reconcile(&spline, &mut host);

        let doomed_label = flex.record(2).unwrap().label().unwrap();
        let doomed_meshes: Vec<_> = flex
            .layers()
            .iter()
            .map(|l| l.slots()[2].mesh.clone().unwrap().handle)
            .collect();
        let survivor = flex.layers().iter().next().unwrap().slots()[3].mesh.clone().unwrap();
        flex.record_mut(3).unwrap().end_roll = 0.25;

        spline.remove(2).unwrap();
        let report = flex.reconcile(&spline, &mut host);

        assert_eq!(report.deleted, vec![2]);
        assert_eq!(report.slots_removed, 2);
        assert_aligned(&flex, &spline);
        assert!(!host.is_alive(doomed_label));
        for mesh in doomed_meshes {
            assert!(!host.is_alive(mesh));
        }
        // The old point 3 is now point 2 and kept its instance and overrides
        assert_eq!(flex.layers().iter().next().unwrap().slots()[2].mesh.as_ref(), Some(&survivor));
        assert_relative_eq!(flex.record(2).unwrap().end_roll, 0.25);
        assert_eq!(host.count_of(HostedKind::Label), 4);
        assert_eq!(host.count_of(HostedKind::Indicator), 8);
    }

    #[test]
    fn test_deleting_several_points() {
        let mut spline = line(6);
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();
        flex.reconcile(&spline, &mut host);

        spline.remove(5).unwrap();
        spline.remove(0).unwrap();
        let report = flex.reconcile(&spline, &mut host);
        assert_eq!(report.deleted, vec![5, 0]);
        assert_aligned(&flex, &spline);
        assert_eq!(host.count_of(HostedKind::Label), 4);
        assert_eq!(host.count_of(HostedKind::Mesh(MeshKind::Deforming)), 4);
    }

    #[test]
    fn test_inserting_in_the_middle_keeps_overrides_in_place() {
        let mut spline = line(3);
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();
        flex.reconcile(&spline, &mut host);
        flex.record_mut(1).unwrap().end_roll = 0.5;
        let moved = flex.layers().iter().next().unwrap().slots()[1].mesh.clone().unwrap();

        spline
            .insert(1, SplineControlPoint::new(Vec3::new(5.0, 0.0, 0.0)))
            .unwrap();
        let report = flex.reconcile(&spline, &mut host);

        assert_eq!(report.inserted, vec![1]);
        assert_aligned(&flex, &spline);
        assert_relative_eq!(flex.record(2).unwrap().end_roll, 0.5);
        assert_relative_eq!(flex.record(1).unwrap().end_roll, 0.0);
        assert_eq!(flex.layers().iter().next().unwrap().slots()[2].mesh.as_ref(), Some(&moved));
    }

    #[test]
    fn test_edit_sequences_stay_aligned() {
        let mut spline = line(3);
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();
        flex.reconcile(&spline, &mut host);

        type Edit = fn(&mut ControlPointSpline);
        let edits: [Edit; 6] = [
            |s| s.push(SplineControlPoint::new(Vec3::new(30.0, 0.0, 0.0))),
            |s| s.insert(0, SplineControlPoint::new(Vec3::new(-10.0, 0.0, 0.0))).unwrap(),
            |s| {
                s.remove(2).unwrap();
            },
            |s| s.set_position(1, Vec3::new(1.0, 2.0, 3.0)).unwrap(),
            |s| {
                s.remove(0).unwrap();
                s.remove(0).unwrap();
            },
            |s| {
                s.insert(1, SplineControlPoint::new(Vec3::new(7.0, 0.0, 7.0))).unwrap();
                s.insert(1, SplineControlPoint::new(Vec3::new(8.0, 0.0, 8.0))).unwrap();
            },
        ];
        for edit in edits {
            edit(&mut spline);
            flex.reconcile(&spline, &mut host);
            assert_aligned(&flex, &spline);
            assert_eq!(host.count_of(HostedKind::Label), spline.len());
            assert_eq!(host.count_of(HostedKind::Indicator), spline.len() * 2);
        }
    }

    #[test]
    fn test_layer_added_later_catches_up() {
        let spline = line(4);
        let mut host = RecordingHost::new();
        let mut flex = FlexSpline::new();
        flex.reconcile(&spline, &mut host);

        let id = flex.layers_mut().add_uninitialized();
        let report = flex.reconcile(&spline, &mut host);
        assert_eq!(report.layers_initialized, 1);
        assert_eq!(report.slots_created, 4);
        assert_eq!(flex.layers().get(id).unwrap().name(), "Layer 0");
        assert_aligned(&flex, &spline);
    }

    #[test]
    fn test_kind_change_respawns_in_place() {
        let spline = line(3);
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();
        flex.reconcile(&spline, &mut host);
        let id = flex.layers().find_by_name("rails").unwrap().id();

        flex.layers_mut().get_mut(id).unwrap().config.mesh.kind = MeshKind::Rigid;
        let report = flex.reconcile(&spline, &mut host);
        assert_eq!(report.instances_respawned, 3);
        assert_eq!(host.count_of(HostedKind::Mesh(MeshKind::Deforming)), 0);
        assert_eq!(host.count_of(HostedKind::Mesh(MeshKind::Rigid)), 6);
        assert_aligned(&flex, &spline);
    }

    #[test]
    fn test_stale_handles_are_skipped() {
        let spline = line(3);
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();
        flex.reconcile(&spline, &mut host);

        let slot = flex.layers().iter().next().unwrap().slots()[1].clone();
        host.kill(slot.mesh.unwrap().handle);
        host.kill(slot.indicator.unwrap());
        host.kill(flex.record(0).unwrap().label().unwrap());

        let report = flex.reconcile(&spline, &mut host);
        assert_eq!(report.skipped, 1);
        assert!(report.is_structural_noop());
        assert_aligned(&flex, &spline);
    }

    #[test]
    fn test_visible_deforming_placement_reaches_host() {
        let spline = line(5);
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();
        flex.reconcile(&spline, &mut host);
        flex.record_mut(2).unwrap().end_roll = 0.7;
        flex.record_mut(2).unwrap().end_scale = Vec2::new(2.0, 2.0);
        flex.reconcile(&spline, &mut host);

        let rails = flex.layers().find_by_name("rails").unwrap();
        let object = host.get(rails.slots()[3].mesh.as_ref().unwrap().handle).unwrap();
        assert!(object.visible);
        assert_relative_eq!(object.roll.0, 0.7);
        assert_eq!(object.cross_section_scale.0, Vec2::new(2.0, 2.0));
        assert_eq!(object.segment.unwrap().end, Vec3::new(40.0, 0.0, 0.0));
        assert_eq!(object.collision, CollisionMode::NoCollision);
        assert_eq!(object.profile, "BlockAll");

        // Final point of a non-looping layer is hidden
        let last = host.get(rails.slots()[4].mesh.as_ref().unwrap().handle).unwrap();
        assert!(!last.visible);
    }

    #[test]
    fn test_render_mode_hides_instances() {
        let spline = line(5);
        let mut host = RecordingHost::new();
        let mut flex = FlexSpline::new();
        let mut config = LayerConfig::default();
        config.render.mode = RenderMode::HEAD | RenderMode::TAIL;
        flex.layers_mut().insert("ends", config).unwrap();
        flex.globals.collision = GlobalSwitch::Custom;
        flex.reconcile(&spline, &mut host);

        let layer = flex.layers().iter().next().unwrap();
        let visible: Vec<usize> = layer
            .slots()
            .iter()
            .enumerate()
            .filter(|(_, s)| host.is_visible(s.mesh.as_ref().unwrap().handle))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(visible, vec![0, 3]);
        let hidden = host.get(layer.slots()[1].mesh.as_ref().unwrap().handle).unwrap();
        assert_eq!(hidden.collision, CollisionMode::NoCollision);
        let shown = host.get(layer.slots()[0].mesh.as_ref().unwrap().handle).unwrap();
        assert_eq!(shown.collision, CollisionMode::QueryOnly);
    }

    #[test]
    fn test_indicators_follow_show_flag_and_loop() {
        let spline = line(4);
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();
        let rails = flex.layers().find_by_name("rails").unwrap().id();
        for layer in flex.layers_mut().iter_mut() {
            layer.config.up.show = true;
        }
        flex.reconcile(&spline, &mut host);

        fn indicator_visible(flex: &FlexSpline, host: &RecordingHost, name: &str, i: usize) -> bool {
            let layer = flex.layers().find_by_name(name).unwrap();
            host.is_visible(layer.slots()[i].indicator.unwrap())
        }
        assert!(indicator_visible(&flex, &host, "rails", 0));
        assert!(!indicator_visible(&flex, &host, "rails", 3));
        // Rigid instances have no up direction
        assert!(!indicator_visible(&flex, &host, "posts", 0));

        let object = host
            .get(flex.layers().get(rails).unwrap().slots()[1].indicator.unwrap())
            .unwrap();
        assert_eq!(object.color, crate::debug::indicator_color(0));
        assert_relative_eq!(object.transform.position.y, 25.0);

        flex.layers_mut().get_mut(rails).unwrap().config.flags |= LayerFlags::LOOP;
        flex.reconcile(&spline, &mut host);
        assert!(indicator_visible(&flex, &host, "rails", 3));
    }

    #[test]
    fn test_labels_show_index() {
        let spline = line(3);
        let mut host = RecordingHost::new();
        let mut flex = FlexSpline::new();
        flex.debug.show_point_numbers = true;
        flex.reconcile(&spline, &mut host);

        let label = host.get(flex.record(2).unwrap().label().unwrap()).unwrap();
        assert_eq!(label.text, "2");
        assert!(label.visible);
        assert_eq!(label.transform.position, Vec3::new(20.0, 0.0, 0.0));
    }

    #[test]
    fn test_instance_count_for_kind() {
        let mut flex = with_two_layers();
        assert_eq!(flex.instance_count_for_kind(MeshKind::Deforming), 1);
        assert_eq!(flex.instance_count_for_kind(MeshKind::Rigid), 1);
        let id = flex.layers().find_by_name("posts").unwrap().id();
        flex.layers_mut().get_mut(id).unwrap().config.flags = LayerFlags::empty();
        assert_eq!(flex.instance_count_for_kind(MeshKind::Rigid), 0);
    }

    #[test]
    fn test_selection_edit_and_summary() {
        let spline = line(4);
        let mut host = RecordingHost::new();
        let mut flex = FlexSpline::new();
        flex.reconcile(&spline, &mut host);

        assert_eq!(flex.edit_selection(&[1, 2, 9], PointEdit::EndScale(Axis::X, 3.0)), 2);
        let summary = flex.selection_summary(&[1, 2]);
        assert_eq!(summary.end_scale, Some(Vec2::new(3.0, 1.0)));
        let summary = flex.selection_summary(&[0, 1]);
        assert_eq!(summary.end_scale, None);
        assert_eq!(summary.start_roll, Some(0.0));
    }

    #[test]
    fn test_start_editable_depends_on_synchronize() {
        let spline = line(4);
        let mut host = RecordingHost::new();
        let mut flex = FlexSpline::new();
        flex.reconcile(&spline, &mut host);

        assert!(flex.is_start_editable(&[0]));
        assert!(!flex.is_start_editable(&[0, 2]));
        flex.edit_selection(&[2], PointEdit::Synchronize(false));
        assert!(flex.is_start_editable(&[0, 2]));
        flex.globals.synchronize = GlobalSwitch::Everywhere;
        assert!(!flex.is_start_editable(&[2]));
    }

    #[test]
    fn test_clear_releases_everything() {
        let spline = line(4);
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();
        flex.reconcile(&spline, &mut host);
        assert!(host.live_count() > 0);
        flex.clear(&mut host);
        assert_eq!(host.live_count(), 0);
        assert!(flex.records().is_empty());
    }

    #[test]
    fn test_empty_spline() {
        let spline = ControlPointSpline::default();
        let mut host = RecordingHost::new();
        let mut flex = with_two_layers();
        let report = flex.reconcile(&spline, &mut host);
        assert_eq!(report.point_count, 0);
        assert_eq!(host.live_count(), 0);
    }
}
