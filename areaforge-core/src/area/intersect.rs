//! Sorting, duplicate detection and crossing repair for segment sets.

use std::collections::BTreeMap;

use super::AssemblyError;
use crate::segment::{calculate_intersection, outside_x_range, y_range_overlap};
use crate::{Location, NodeRef, Segment};

/// Upper bound on split-and-resort rounds before giving up.
pub(crate) const MAX_INTERSECTION_ROUNDS: usize = 16;

/// Sort segments and reject repeated edges.
pub(crate) fn sort_unique(segments: &mut [Segment]) -> Result<(), AssemblyError> {
    segments.sort_unstable();
    match segments.windows(2).find_map(|pair| match pair {
        [a, b] if a == b => Some(*b),
        _ => None,
    }) {
        Some(segment) => Err(AssemblyError::Duplicate { segment }),
        None => Ok(()),
    }
}

/// Split crossing segments until none remain.
///
/// Expects `segments` sorted and unique; leaves them sorted and unique.
pub(crate) fn resolve(
    segments: &mut Vec<Segment>,
    max_segments: Option<usize>,
) -> Result<(), AssemblyError> {
    for _ in 0..MAX_INTERSECTION_ROUNDS {
        let crossings = find_crossings(segments);
        if crossings.is_empty() {
            return Ok(());
        }
        split(segments, &crossings);
        if let Some(limit) = max_segments.filter(|limit| segments.len() > *limit) {
            return Err(AssemblyError::TooManySegments {
                count: segments.len(),
                limit,
            });
        }
        sort_unique(segments)?;
    }
    if find_crossings(segments).is_empty() {
        Ok(())
    } else {
        Err(AssemblyError::UnresolvedIntersections {
            rounds: MAX_INTERSECTION_ROUNDS,
        })
    }
}

/// Interior crossing points per segment index.
///
/// Points equal to an endpoint of the segment they were found on are not
/// recorded for it; they are already vertices.
fn find_crossings(segments: &[Segment]) -> BTreeMap<usize, Vec<Location>> {
    let mut crossings: BTreeMap<usize, Vec<Location>> = BTreeMap::new();
    for (i, a) in segments.iter().enumerate() {
        for (j, b) in segments.iter().enumerate().skip(i + 1) {
            if outside_x_range(b, a) {
                break;
            }
            if !y_range_overlap(a, b) {
                continue;
            }
            let point = calculate_intersection(a, b);
            if !point.is_defined() {
                continue;
            }
            for (index, segment) in [(i, a), (j, b)] {
                if !segment.has_endpoint(point) {
                    crossings.entry(index).or_default().push(point);
                }
            }
        }
    }
    crossings
}

fn split(segments: &mut Vec<Segment>, crossings: &BTreeMap<usize, Vec<Location>>) {
    let mut pieces = Vec::with_capacity(segments.len() + crossings.len() * 2);
    for (index, segment) in segments.iter().enumerate() {
        let Some(found) = crossings.get(&index) else {
            pieces.push(*segment);
            continue;
        };
        let mut points = found.clone();
        points.sort_unstable();
        points.dedup();
        let mut from = *segment.first();
        for point in points {
            let to = NodeRef::synthetic(point);
            push_piece(&mut pieces, from, to);
            from = to;
        }
        push_piece(&mut pieces, from, *segment.second());
    }
    *segments = pieces;
}

fn push_piece(pieces: &mut Vec<Segment>, from: NodeRef, to: NodeRef) {
    let piece = Segment::new(from, to);
    if !piece.is_degenerate() {
        pieces.push(piece);
    }
}
