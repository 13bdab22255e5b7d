//! Spline point queries and a control-point spline implementation.
//!
//! `SplineSource` is the narrow read-only view the placement system needs:
//! per-point location, tangent, direction, rotation and scale. The
//! `ControlPointSpline` answers those queries for a Catmull-Rom curve
//! through its control points, in local space or transformed by its origin.

use crate::{FlexError, Result, Rotator, Transform, Vec3};
use serde::{Deserialize, Serialize};

/// Which space a spline query is answered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSpace {
    /// Relative to the spline's own origin
    Local,
    /// After applying the spline's origin transform
    World,
}

/// Read-only per-point spline queries.
///
/// Indices past the end are clamped to the last point; an empty spline
/// answers with zero vectors.
pub trait SplineSource {
    fn point_count(&self) -> usize;
    fn location_at(&self, index: usize, space: CoordinateSpace) -> Vec3;
    fn tangent_at(&self, index: usize, space: CoordinateSpace) -> Vec3;
    fn direction_at(&self, index: usize, space: CoordinateSpace) -> Vec3;
    fn rotation_at(&self, index: usize, space: CoordinateSpace) -> Rotator;
    fn scale_at(&self, index: usize) -> Vec3;
}

/// A single control point on a Catmull-Rom spline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplineControlPoint {
    pub position: Vec3,
    /// Twist (banking) in degrees around the forward axis.
    #[serde(default)]
    pub twist: f32,
    #[serde(default = "default_point_scale")]
    pub scale: Vec3,
}

fn default_point_scale() -> Vec3 {
    Vec3::ONE
}

impl SplineControlPoint {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            twist: 0.0,
            scale: Vec3::ONE,
        }
    }
}

/// Catmull-Rom tangent at `p1` given its neighbours: the curve derivative
/// at t = 0 of the segment `p1 -> p2`.
pub fn catmull_rom_tangent(p0: Vec3, p2: Vec3) -> Vec3 {
    (p2 - p0) * 0.5
}

/// A Catmull-Rom spline defined by its control points.
///
/// Open splines use phantom endpoints reflected outward from the first and
/// last segments, so the end tangents follow those segments.
#[derive(Debug, Clone, Default)]
pub struct ControlPointSpline {
    points: Vec<SplineControlPoint>,
    closed: bool,
    origin: Transform,
}

impl ControlPointSpline {
    pub fn new(points: Vec<SplineControlPoint>, closed: bool) -> Self {
        Self {
            points,
            closed,
            origin: Transform::IDENTITY,
        }
    }

    pub fn with_origin(mut self, origin: Transform) -> Self {
        self.origin = origin;
        self
    }

    pub fn from_positions(positions: &[Vec3], closed: bool) -> Self {
        Self::new(
            positions.iter().copied().map(SplineControlPoint::new).collect(),
            closed,
        )
    }

    pub fn points(&self) -> &[SplineControlPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn origin(&self) -> &Transform {
        &self.origin
    }

    pub fn push(&mut self, point: SplineControlPoint) {
        self.points.push(point);
    }

    /// Insert a point before `index`; `index == len` appends
    pub fn insert(&mut self, index: usize, point: SplineControlPoint) -> Result<()> {
        if index > self.points.len() {
            return Err(FlexError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        self.points.insert(index, point);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<SplineControlPoint> {
        if index >= self.points.len() {
            return Err(FlexError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        Ok(self.points.remove(index))
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) -> Result<()> {
        let len = self.points.len();
        let point = self
            .points
            .get_mut(index)
            .ok_or(FlexError::IndexOutOfRange { index, len })?;
        point.position = position;
        Ok(())
    }

    fn clamped(&self, index: usize) -> Option<&SplineControlPoint> {
        self.points.get(index.min(self.points.len().checked_sub(1)?))
    }

    fn local_tangent(&self, index: usize) -> Vec3 {
        let n = self.points.len();
        if n < 2 {
            return Vec3::ZERO;
        }
        let i = index.min(n - 1);
        let p = |k: usize| self.points[k].position;

        let (prev, next) = if self.closed {
            (p((i + n - 1) % n), p((i + 1) % n))
        } else if i == 0 {
            // Phantom start: 2 * p0 - p1
            (p(0) * 2.0 - p(1), p(1))
        } else if i == n - 1 {
            (p(n - 2), p(n - 1) * 2.0 - p(n - 2))
        } else {
            (p(i - 1), p(i + 1))
        };
        catmull_rom_tangent(prev, next)
    }
}

impl SplineSource for ControlPointSpline {
    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn location_at(&self, index: usize, space: CoordinateSpace) -> Vec3 {
        let Some(point) = self.clamped(index) else {
            return Vec3::ZERO;
        };
        match space {
            CoordinateSpace::Local => point.position,
            CoordinateSpace::World => self.origin.transform_point(point.position),
        }
    }

    fn tangent_at(&self, index: usize, space: CoordinateSpace) -> Vec3 {
        let tangent = self.local_tangent(index);
        match space {
            CoordinateSpace::Local => tangent,
            CoordinateSpace::World => self.origin.transform_vector(tangent),
        }
    }

    fn direction_at(&self, index: usize, space: CoordinateSpace) -> Vec3 {
        self.tangent_at(index, space).normalized()
    }

    fn rotation_at(&self, index: usize, space: CoordinateSpace) -> Rotator {
        let twist = self.clamped(index).map(|p| p.twist).unwrap_or(0.0);
        Rotator {
            roll: twist,
            ..Rotator::from_direction(self.direction_at(index, space))
        }
    }

    fn scale_at(&self, index: usize) -> Vec3 {
        self.clamped(index).map(|p| p.scale).unwrap_or(Vec3::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight_line() -> ControlPointSpline {
        ControlPointSpline::from_positions(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(5.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
            ],
            false,
        )
    }

    fn make_square_loop() -> ControlPointSpline {
        ControlPointSpline::from_positions(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(0.0, 0.0, 10.0),
            ],
            true,
        )
    }

    #[test]
    fn open_spline_end_tangents_follow_segments() {
        let spline = straight_line();
        assert_eq!(spline.tangent_at(0, CoordinateSpace::Local), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(spline.tangent_at(1, CoordinateSpace::Local), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(spline.tangent_at(2, CoordinateSpace::Local), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(spline.direction_at(2, CoordinateSpace::Local), Vec3::FORWARD);
    }

    #[test]
    fn closed_spline_wraps_neighbours() {
        let spline = make_square_loop();
        // Neighbours of point 0 are point 3 and point 1
        assert_eq!(spline.tangent_at(0, CoordinateSpace::Local), Vec3::new(5.0, 0.0, -5.0));
    }

    #[test]
    fn world_space_applies_origin() {
        let spline = straight_line().with_origin(Transform::from_position(Vec3::new(0.0, 3.0, 0.0)));
        assert_eq!(spline.location_at(1, CoordinateSpace::Local), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(spline.location_at(1, CoordinateSpace::World), Vec3::new(5.0, 3.0, 0.0));
    }

    #[test]
    fn out_of_range_index_is_clamped() {
        let spline = straight_line();
        assert_eq!(spline.location_at(99, CoordinateSpace::Local), Vec3::new(10.0, 0.0, 0.0));
        let empty = ControlPointSpline::default();
        assert_eq!(empty.location_at(0, CoordinateSpace::Local), Vec3::ZERO);
        assert_eq!(empty.scale_at(0), Vec3::ONE);
    }

    #[test]
    fn rotation_carries_twist_as_roll() {
        let mut spline = straight_line();
        spline.points[1].twist = 30.0;
        let rot = spline.rotation_at(1, CoordinateSpace::Local);
        assert_relative_eq!(rot.roll, 30.0);
        assert_relative_eq!(rot.yaw, 0.0);
        assert_relative_eq!(rot.pitch, 0.0);
    }

    #[test]
    fn insert_and_remove_bounds() {
        let mut spline = straight_line();
        assert!(spline.insert(4, SplineControlPoint::new(Vec3::ZERO)).is_err());
        spline.insert(1, SplineControlPoint::new(Vec3::new(2.0, 0.0, 0.0))).unwrap();
        assert_eq!(spline.len(), 4);
        assert!(spline.remove(4).is_err());
        let removed = spline.remove(1).unwrap();
        assert_eq!(removed.position, Vec3::new(2.0, 0.0, 0.0));
        assert!(spline.set_position(3, Vec3::ZERO).is_err());
    }
}
