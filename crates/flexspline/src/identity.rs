//! Content-addressed tracking of spline points across edits.
//!
//! Spline points carry no stable id, so each `PointRecord` remembers the
//! hash of its point's local location from the previous pass. Comparing the
//! remembered sequence against the live sequence tells which records lost
//! their point (deletion) and where new points appeared (insertion).

use flexspline_core::{CoordinateSpace, PointHash, SplineSource};

/// Hash every live point's local location, in order
pub fn live_hashes<S: SplineSource + ?Sized>(spline: &S) -> Vec<PointHash> {
    (0..spline.point_count())
        .map(|i| PointHash::of_location(spline.location_at(i, CoordinateSpace::Local)))
        .collect()
}

/// Record indices whose point no longer exists, highest first.
///
/// Only reports anything when there are more records than live points.
/// Removing in the returned order never shifts an index that is still to be
/// removed.
pub fn deleted_indices(records: &[PointHash], live: &[PointHash]) -> Vec<usize> {
    if records.len() <= live.len() {
        return Vec::new();
    }
    let excess = records.len() - live.len();

    // Front: skip records that don't match the live point at the cursor
    let mut deleted = Vec::new();
    let mut data = 0;
    for point in live {
        while data < records.len() && records[data] != *point {
            deleted.push(data);
            data += 1;
        }
        data += 1;
    }

    // Back: records past the last matched position lost their points too
    let first_trailing = live.len() + deleted.len();
    deleted.extend(first_trailing..records.len());

    deleted.sort_unstable();
    deleted.dedup();
    // A point moved in the same edit makes the scan overshoot; the earliest
    // mismatches are the deletions, the rest are treated as moves
    deleted.truncate(excess);
    deleted.reverse();
    deleted
}

/// Live indices with no matching record, lowest first.
///
/// Only reports anything when there are more live points than records.
/// When the scan can't explain the growth (an insertion combined with a
/// move) it falls back to the tail range `records.len()..live.len()`.
pub fn inserted_indices(records: &[PointHash], live: &[PointHash]) -> Vec<usize> {
    if live.len() <= records.len() {
        return Vec::new();
    }
    let tail = || (records.len()..live.len()).collect::<Vec<_>>();

    let mut inserted = Vec::new();
    let mut point = 0;
    for record in records {
        while point < live.len() && live[point] != *record {
            inserted.push(point);
            point += 1;
        }
        point += 1;
    }
    inserted.extend((records.len() + inserted.len())..live.len());
    inserted.dedup();

    if inserted.len() == live.len() - records.len() {
        inserted
    } else {
        tail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexspline_core::{ControlPointSpline, Vec3};

    fn h(v: u32) -> PointHash {
        PointHash(v)
    }

    fn hashes(vals: &[u32]) -> Vec<PointHash> {
        vals.iter().copied().map(h).collect()
    }

    #[test]
    fn no_deletions_when_not_shrinking() {
        assert!(deleted_indices(&hashes(&[1, 2]), &hashes(&[1, 2])).is_empty());
        assert!(deleted_indices(&hashes(&[1, 2]), &hashes(&[1, 2, 3])).is_empty());
    }

    #[test]
    fn deletion_in_middle() {
        let records = hashes(&[1, 2, 3, 4, 5]);
        let live = hashes(&[1, 2, 4, 5]);
        assert_eq!(deleted_indices(&records, &live), vec![2]);
    }

    #[test]
    fn deletion_at_front_and_back() {
        assert_eq!(deleted_indices(&hashes(&[1, 2, 3]), &hashes(&[2, 3])), vec![0]);
        assert_eq!(deleted_indices(&hashes(&[1, 2, 3]), &hashes(&[1, 2])), vec![2]);
    }

    #[test]
    fn multiple_deletions_are_descending() {
        let records = hashes(&[1, 2, 3, 4, 5, 6]);
        let live = hashes(&[2, 4, 6]);
        assert_eq!(deleted_indices(&records, &live), vec![4, 2, 0]);
    }

    #[test]
    fn tail_deletions() {
        let records = hashes(&[1, 2, 3, 4]);
        let live = hashes(&[1, 2]);
        assert_eq!(deleted_indices(&records, &live), vec![3, 2]);
    }

    #[test]
    fn deletion_with_move_is_capped_to_excess() {
        // 2 was deleted and 3 moved to 9 in the same edit
        let records = hashes(&[1, 2, 3]);
        let live = hashes(&[1, 9]);
        assert_eq!(deleted_indices(&records, &live), vec![1]);
    }

    #[test]
    fn colliding_hashes_are_treated_as_unchanged() {
        let records = hashes(&[7, 2, 7]);
        let live = hashes(&[7, 7]);
        assert_eq!(deleted_indices(&records, &live), vec![1]);
    }

    #[test]
    fn insertion_positions() {
        assert_eq!(inserted_indices(&[], &hashes(&[1, 2])), vec![0, 1]);
        assert_eq!(inserted_indices(&hashes(&[1, 2]), &hashes(&[1, 2, 3])), vec![2]);
        assert_eq!(inserted_indices(&hashes(&[1, 3]), &hashes(&[1, 2, 3])), vec![1]);
        assert_eq!(inserted_indices(&hashes(&[2, 3]), &hashes(&[1, 2, 3])), vec![0]);
        assert_eq!(
            inserted_indices(&hashes(&[2, 4]), &hashes(&[1, 2, 3, 4, 5])),
            vec![0, 2, 4]
        );
    }

    #[test]
    fn insertion_with_move_falls_back_to_tail() {
        let records = hashes(&[1, 2]);
        let live = hashes(&[1, 8, 9]);
        assert_eq!(inserted_indices(&records, &live), vec![2]);
    }

    #[test]
    fn live_hashes_follow_local_locations() {
        let spline = ControlPointSpline::from_positions(
            &[Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
            false,
        );
        let live = live_hashes(&spline);
        assert_eq!(live.len(), 2);
        assert_eq!(live[1], PointHash::of_location(Vec3::new(1.0, 0.0, 0.0)));
    }
}
