//! Generation depth assignment.
//!
//! Breadth-first traversal over the unit graph starting at the focal unit
//! (depth 0). A unit reached through a parent edge sits one generation above
//! the unit it was reached from, one reached through a child edge one below.
//! The first assignment wins, so malformed cyclic data terminates.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::units::{UnitGraph, UnitIndex};

/// Depth per reachable unit, plus the visit order of each generation row.
#[derive(Debug, Clone)]
pub struct DepthMap {
    focal: UnitIndex,
    depth: HashMap<UnitIndex, i32>,
    levels: BTreeMap<i32, Vec<UnitIndex>>,
}

impl DepthMap {
    /// The unit holding the focal person.
    pub fn focal(&self) -> UnitIndex {
        self.focal
    }

    /// Depth of a unit, or `None` if it was unreachable.
    pub fn depth_of(&self, ix: UnitIndex) -> Option<i32> {
        self.depth.get(&ix).copied()
    }

    /// Units on one row in BFS visit order.
    pub fn level(&self, depth: i32) -> &[UnitIndex] {
        self.levels.get(&depth).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Shallowest (most ancestral) depth.
    pub fn min_depth(&self) -> i32 {
        self.levels.keys().next().copied().unwrap_or(0)
    }

    /// Deepest (most descendant) depth.
    pub fn max_depth(&self) -> i32 {
        self.levels.keys().next_back().copied().unwrap_or(0)
    }

    /// Number of reachable units.
    pub fn len(&self) -> usize {
        self.depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth.is_empty()
    }
}

/// Assign depths outward from the unit containing `focal_id`.
///
/// Returns `None` when the focal person belongs to no unit. Units not
/// connected to the focal unit receive no depth and are left out of the
/// layout.
pub fn assign_depths(units: &UnitGraph<'_>, focal_id: &str) -> Option<DepthMap> {
    let Some(focal) = units.unit_of(focal_id) else {
        tracing::debug!(focal = focal_id, "focal person is not in any unit");
        return None;
    };

    let mut depth: HashMap<UnitIndex, i32> = HashMap::with_capacity(units.len());
    let mut levels: BTreeMap<i32, Vec<UnitIndex>> = BTreeMap::new();
    let mut queue: VecDeque<UnitIndex> = VecDeque::new();

    depth.insert(focal, 0);
    levels.entry(0).or_default().push(focal);
    queue.push_back(focal);

    while let Some(current) = queue.pop_front() {
        let d = depth[&current];

        let mut neighbors: Vec<(UnitIndex, i32)> = units
            .parent_units(current)
            .into_iter()
            .map(|p| (p, d - 1))
            .chain(units.child_units(current).into_iter().map(|c| (c, d + 1)))
            .collect();
        neighbors.sort_by_key(|(ix, _)| ix.index());

        for (next, next_depth) in neighbors {
            if depth.contains_key(&next) {
                continue;
            }
            depth.insert(next, next_depth);
            levels.entry(next_depth).or_default().push(next);
            queue.push_back(next);
        }
    }

    let excluded = units.len() - depth.len();
    if excluded > 0 {
        tracing::debug!(excluded, "units unreachable from the focal unit were left out");
    }
    tracing::trace!(
        reached = depth.len(),
        generations = levels.len(),
        "depths assigned"
    );

    Some(DepthMap {
        focal,
        depth,
        levels,
    })
}
