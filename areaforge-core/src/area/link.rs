//! Linking sorted segments into closed rings.

use std::collections::{BTreeMap, HashMap};

use super::AssemblyError;
use crate::{Location, NodeRef, Segment};

/// Walk every segment exactly once, emitting closed node sequences.
///
/// Every endpoint must be shared by an even number of segments. A walk that
/// comes back to a location already on its path closes the loop between the
/// two visits, so self-touching boundaries come out as separate rings.
pub(crate) fn link(segments: &[Segment]) -> Result<Vec<Vec<NodeRef>>, AssemblyError> {
    let adjacency = adjacency(segments);
    for (&location, incident) in &adjacency {
        if incident.len().is_multiple_of(2) {
            continue;
        }
        if let Some(segment) = incident.first().and_then(|index| segments.get(*index)) {
            return Err(AssemblyError::Unclosed {
                location,
                segment: *segment,
            });
        }
    }

    let mut visited = vec![false; segments.len()];
    let mut rings = Vec::new();
    for (start, segment) in segments.iter().enumerate() {
        if visited.get(start).copied().unwrap_or(true) {
            continue;
        }
        mark(&mut visited, start);
        walk(segments, &adjacency, &mut visited, segment, &mut rings)?;
    }
    Ok(rings)
}

fn adjacency(segments: &[Segment]) -> BTreeMap<Location, Vec<usize>> {
    let mut adjacency: BTreeMap<Location, Vec<usize>> = BTreeMap::new();
    for (index, segment) in segments.iter().enumerate() {
        for node in [segment.first(), segment.second()] {
            adjacency.entry(node.location()).or_default().push(index);
        }
    }
    adjacency
}

fn mark(visited: &mut [bool], index: usize) {
    if let Some(flag) = visited.get_mut(index) {
        *flag = true;
    }
}

fn walk(
    segments: &[Segment],
    adjacency: &BTreeMap<Location, Vec<usize>>,
    visited: &mut [bool],
    first: &Segment,
    rings: &mut Vec<Vec<NodeRef>>,
) -> Result<(), AssemblyError> {
    let mut path = vec![*first.first(), *first.second()];
    let mut on_path: HashMap<Location, usize> = path
        .iter()
        .enumerate()
        .map(|(position, node)| (node.location(), position))
        .collect();
    let mut last = *first;

    while path.len() > 1 {
        let current = path.last().copied().unwrap_or_default().location();
        let next_index = adjacency
            .get(&current)
            .and_then(|incident| {
                incident
                    .iter()
                    .copied()
                    .find(|index| !visited.get(*index).copied().unwrap_or(true))
            })
            .ok_or(AssemblyError::Unclosed {
                location: current,
                segment: last,
            })?;
        mark(visited, next_index);
        let Some(edge) = segments
            .get(next_index)
            .and_then(|segment| segment.leaving(current))
        else {
            return Err(AssemblyError::Unclosed {
                location: current,
                segment: last,
            });
        };
        last = edge.segment();
        let node = *edge.to();

        if let Some(&position) = on_path.get(&node.location()) {
            let mut ring: Vec<NodeRef> = path.drain(position + 1..).collect();
            for removed in &ring {
                on_path.remove(&removed.location());
            }
            ring.insert(0, path.last().copied().unwrap_or(node));
            ring.push(node);
            rings.push(ring);
        } else {
            on_path.insert(node.location(), path.len());
            path.push(node);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn segments(points: &[(i32, i32)]) -> Vec<Segment> {
        let mut result: Vec<_> = points
            .windows(2)
            .filter_map(|pair| match pair {
                [(x1, y1), (x2, y2)] => Some(Segment::new(
                    NodeRef::new(1, Location::new(*x1, *y1)),
                    NodeRef::new(2, Location::new(*x2, *y2)),
                )),
                _ => None,
            })
            .collect();
        result.sort();
        result
    }

    #[rstest]
    fn square_links_into_one_ring() {
        let input = segments(&[(0, 0), (0, 5), (5, 5), (5, 0), (0, 0)]);
        let rings = link(&input).expect("closed");
        assert_eq!(rings.len(), 1);
        let ring = rings.first().expect("ring");
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[rstest]
    fn figure_eight_splits_at_the_shared_vertex() {
        let input = segments(&[(0, 0), (0, 2), (2, 2), (4, 4), (4, 2), (2, 2), (2, 0), (0, 0)]);
        let rings = link(&input).expect("closed");
        let coords: Vec<Vec<(i32, i32)>> = rings
            .iter()
            .map(|ring| {
                ring.iter()
                    .map(|node| (node.location().x(), node.location().y()))
                    .collect()
            })
            .collect();
        assert_eq!(
            coords,
            vec![
                vec![(0, 0), (0, 2), (2, 2), (2, 0), (0, 0)],
                vec![(2, 2), (4, 2), (4, 4), (2, 2)],
            ]
        );
    }

    #[rstest]
    fn dangling_end_is_unclosed() {
        let input = segments(&[(0, 0), (0, 5), (5, 5)]);
        assert_eq!(
            link(&input),
            Err(AssemblyError::Unclosed {
                location: Location::new(0, 0),
                segment: Segment::new(
                    NodeRef::new(1, Location::new(0, 0)),
                    NodeRef::new(2, Location::new(0, 5)),
                ),
            })
        );
    }
}
