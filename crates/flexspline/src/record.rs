//! Per-point override data

use flexspline_core::{HandleId, PointHash, Rotator, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Overrides and bookkeeping for one spline point
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// Hash of the point's local location at the last reconciliation
    pub identity: PointHash,
    pub start_roll: f32,
    pub end_roll: f32,
    pub start_scale: Vec2,
    pub end_scale: Vec2,
    pub start_offset: Vec2,
    pub end_offset: Vec2,
    pub up_direction: Vec3,
    /// Take start values from the previous point's end values
    pub synchronize_with_previous: bool,
    pub location_offset: Vec3,
    pub scale_offset: Vec3,
    pub rotation_offset: Rotator,
    pub(crate) label: Option<HandleId>,
}

impl Default for PointRecord {
    fn default() -> Self {
        Self {
            identity: PointHash::default(),
            start_roll: 0.0,
            end_roll: 0.0,
            start_scale: Vec2::ONE,
            end_scale: Vec2::ONE,
            start_offset: Vec2::ZERO,
            end_offset: Vec2::ZERO,
            up_direction: Vec3::ZERO,
            synchronize_with_previous: true,
            location_offset: Vec3::ZERO,
            scale_offset: Vec3::ZERO,
            rotation_offset: Rotator::ZERO,
            label: None,
        }
    }
}

impl PointRecord {
    pub(crate) fn with_label(label: HandleId) -> Self {
        Self {
            label: Some(label),
            ..Self::default()
        }
    }

    pub fn label(&self) -> Option<HandleId> {
        self.label
    }

    pub fn apply(&mut self, edit: &PointEdit) {
        match *edit {
            PointEdit::StartRoll(v) => self.start_roll = v,
            PointEdit::EndRoll(v) => self.end_roll = v,
            PointEdit::StartScale(axis, v) => set_axis2(&mut self.start_scale, axis, v),
            PointEdit::EndScale(axis, v) => set_axis2(&mut self.end_scale, axis, v),
            PointEdit::StartOffset(axis, v) => set_axis2(&mut self.start_offset, axis, v),
            PointEdit::EndOffset(axis, v) => set_axis2(&mut self.end_offset, axis, v),
            PointEdit::UpDirection(axis, v) => set_axis3(&mut self.up_direction, axis, v),
            PointEdit::Synchronize(v) => self.synchronize_with_previous = v,
            PointEdit::LocationOffset(axis, v) => set_axis3(&mut self.location_offset, axis, v),
            PointEdit::ScaleOffset(axis, v) => set_axis3(&mut self.scale_offset, axis, v),
            PointEdit::RotationOffset(axis, v) => match axis {
                Axis::X => self.rotation_offset.roll = v,
                Axis::Y => self.rotation_offset.yaw = v,
                Axis::Z => self.rotation_offset.pitch = v,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

// 2D values have no Z component
fn set_axis2(v: &mut Vec2, axis: Axis, value: f32) {
    match axis {
        Axis::X => v.x = value,
        Axis::Y => v.y = value,
        Axis::Z => {}
    }
}

fn set_axis3(v: &mut Vec3, axis: Axis, value: f32) {
    match axis {
        Axis::X => v.x = value,
        Axis::Y => v.y = value,
        Axis::Z => v.z = value,
    }
}

/// A single-field change applied to every selected record.
///
/// Rotation offsets are addressed by the axis they turn around:
/// X is roll, Y is yaw, Z is pitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PointEdit {
    StartRoll(f32),
    EndRoll(f32),
    StartScale(Axis, f32),
    EndScale(Axis, f32),
    StartOffset(Axis, f32),
    EndOffset(Axis, f32),
    UpDirection(Axis, f32),
    Synchronize(bool),
    LocationOffset(Axis, f32),
    ScaleOffset(Axis, f32),
    RotationOffset(Axis, f32),
}

/// Values shared by every record in a selection; `None` where they differ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSummary {
    pub count: usize,
    pub start_roll: Option<f32>,
    pub end_roll: Option<f32>,
    pub start_scale: Option<Vec2>,
    pub end_scale: Option<Vec2>,
    pub start_offset: Option<Vec2>,
    pub end_offset: Option<Vec2>,
    pub up_direction: Option<Vec3>,
    pub synchronize_with_previous: Option<bool>,
    pub location_offset: Option<Vec3>,
    pub scale_offset: Option<Vec3>,
    pub rotation_offset: Option<Rotator>,
}

fn common<T, F>(records: &[&PointRecord], field: F) -> Option<T>
where
    T: PartialEq + Copy,
    F: Fn(&PointRecord) -> T,
{
    let (first, rest) = records.split_first()?;
    let value = field(*first);
    rest.iter().all(|r| field(*r) == value).then_some(value)
}

impl SelectionSummary {
    pub fn of(records: &[&PointRecord]) -> Self {
        Self {
            count: records.len(),
            start_roll: common(records, |r| r.start_roll),
            end_roll: common(records, |r| r.end_roll),
            start_scale: common(records, |r| r.start_scale),
            end_scale: common(records, |r| r.end_scale),
            start_offset: common(records, |r| r.start_offset),
            end_offset: common(records, |r| r.end_offset),
            up_direction: common(records, |r| r.up_direction),
            synchronize_with_previous: common(records, |r| r.synchronize_with_previous),
            location_offset: common(records, |r| r.location_offset),
            scale_offset: common(records, |r| r.scale_offset),
            rotation_offset: common(records, |r| r.rotation_offset),
        }
    }
}
