//! Depth-anchored family tree placement.
//!
//! Lays out the units reachable from a focal person as generation rows and
//! expands them into per-person nodes and connector edges.
//!
//! # Algorithm Overview
//!
//! 1. **Units:** partition persons into couples and singles
//!    ([`UnitGraph`]).
//! 2. **Depths:** BFS from the focal unit ([`assign_depths`]).
//! 3. **Rows:** place the focal row left to right, then each descendant row
//!    under its parents, then each ancestor row over its children. A unit is
//!    centred on the mean centre of its anchors on the adjacent row and then
//!    clamped right of its left neighbour so units never overlap.
//! 4. **Members:** order each couple's two members to minimise their
//!    distance from their own parents, falling back to gender then id.
//! 5. **Output:** translate so the bounding box starts at `padding`, emit
//!    nodes sorted by (depth, x) and synthesize connectors.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::connectors::{LayoutEdge, marriage_edge, parent_child_edge};
use super::depth::{DepthMap, assign_depths};
use super::units::{FamilyUnit, UnitGraph, UnitIndex};
use crate::error::{Error, Result};
use crate::graph::{Couple, FamilyIndex, Person, PersonId};
use crate::kinship::RelationshipResolver;

/// Geometry of the family tree layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width of one person node.
    pub node_width: f32,
    /// Height of one person node.
    pub node_height: f32,
    /// Horizontal space between the two members of a couple.
    pub couple_gap: f32,
    /// Minimum horizontal space between neighbouring units on a row.
    pub unit_gap: f32,
    /// Vertical space between generation rows.
    pub level_gap: f32,
    /// Margin around the whole layout.
    pub padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            node_height: 80.0,
            couple_gap: 10.0,
            unit_gap: 40.0,
            level_gap: 80.0,
            padding: 40.0,
        }
    }
}

impl LayoutConfig {
    /// Reject negative or non-finite dimensions.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("nodeWidth", self.node_width),
            ("nodeHeight", self.node_height),
            ("coupleGap", self.couple_gap),
            ("unitGap", self.unit_gap),
            ("levelGap", self.level_gap),
            ("padding", self.padding),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig { field, value });
            }
        }
        Ok(())
    }

    /// Width of a unit with `members` people.
    #[inline]
    pub fn unit_width(&self, members: usize) -> f32 {
        if members >= 2 {
            2.0 * self.node_width + self.couple_gap
        } else {
            self.node_width
        }
    }

    /// Top of the row at `depth`, before normalization.
    #[inline]
    pub fn row_y(&self, depth: i32) -> f32 {
        depth as f32 * (self.node_height + self.level_gap)
    }
}

/// One placed person.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub person_id: PersonId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Generation relative to the focal person.
    pub depth: i32,
    pub person: Person,
    pub relationship_label: Option<String>,
}

impl LayoutNode {
    /// Horizontal centre.
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Whether `(x, y)` lies inside the node rectangle.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Result of a family tree layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyLayout {
    /// Nodes sorted by (depth, x).
    pub nodes: Vec<LayoutNode>,
    /// Marriage edges and parent-child edges, grouped by source unit.
    pub edges: Vec<LayoutEdge>,
    pub width: f32,
    pub height: f32,
    /// The focal person, `None` for an empty layout.
    pub focal_id: Option<PersonId>,
}

impl FamilyLayout {
    /// The empty layout: no nodes, no edges, zero size.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the node for a person.
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.person_id.as_str() == id)
    }

    /// Flat `[x0, y0, x1, y1, ...]` node positions in node order.
    pub fn positions(&self) -> Vec<f32> {
        self.nodes.iter().flat_map(|n| [n.x, n.y]).collect()
    }
}

/// Running placement state for one row.
#[derive(Default)]
struct RowCursor {
    right: Option<f32>,
}

impl RowCursor {
    /// Where the next anchorless unit goes.
    fn next_free(&self, gap: f32) -> f32 {
        self.right.map_or(0.0, |r| r + gap)
    }

    /// Clamp `candidate` right of the previous unit and advance.
    fn place(&mut self, candidate: f32, width: f32, gap: f32) -> f32 {
        let x = match self.right {
            Some(right) if candidate < right + gap => right + gap,
            _ => candidate,
        };
        self.right = Some(x + width);
        x
    }
}

/// The family tree layout engine.
#[derive(Debug, Clone, Default)]
pub struct FamilyTreeLayout {
    config: LayoutConfig,
}

impl FamilyTreeLayout {
    /// Create a layout engine with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Create a layout engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    /// Create a layout engine, validating the configuration first.
    pub fn try_new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute the layout of everyone connected to `focal_id`.
    ///
    /// An unknown focal person yields [`FamilyLayout::empty`]. Persons not
    /// connected to the focal person through parent or child links (directly
    /// or via a spouse) are left out.
    pub fn compute(&self, persons: &[Person], couples: &[Couple], focal_id: &str) -> FamilyLayout {
        let index = FamilyIndex::new(persons);
        if !index.contains(focal_id) {
            tracing::debug!(focal = focal_id, "focal person not found; empty layout");
            return FamilyLayout::empty();
        }

        let units = UnitGraph::build(&index, couples);
        let Some(depths) = assign_depths(&units, focal_id) else {
            return FamilyLayout::empty();
        };

        let xs = self.place_units(&units, &depths);
        let resolver = RelationshipResolver::new(&index, focal_id);
        let cfg = &self.config;

        // Bounding box before normalization.
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        for (&ix, &x) in &xs {
            min_x = min_x.min(x);
            max_x = max_x.max(x + cfg.unit_width(units.unit(ix).members.len()));
        }
        let min_y = cfg.row_y(depths.min_depth());
        let max_y = cfg.row_y(depths.max_depth()) + cfg.node_height;
        let dx = cfg.padding - min_x;
        let dy = cfg.padding - min_y;

        // Expand units into nodes.
        let mut placed: Vec<(UnitIndex, i32, f32)> = xs
            .iter()
            .filter_map(|(&ix, &x)| depths.depth_of(ix).map(|d| (ix, d, x)))
            .collect();
        placed.sort_by(|a, b| {
            a.1.cmp(&b.1)
                .then(a.2.total_cmp(&b.2))
                .then(a.0.index().cmp(&b.0.index()))
        });

        let mut nodes: Vec<LayoutNode> = Vec::with_capacity(index.len());
        let mut unit_members: Vec<(UnitIndex, i32, Vec<PersonId>)> = Vec::with_capacity(placed.len());
        for &(ix, depth, x) in &placed {
            let unit = units.unit(ix);
            let members = self.member_order(&index, &units, &xs, ix, unit, x);
            let y = cfg.row_y(depth) + dy;
            for (slot, person) in members.iter().enumerate() {
                nodes.push(LayoutNode {
                    person_id: person.id.clone(),
                    x: x + dx + slot as f32 * (cfg.node_width + cfg.couple_gap),
                    y,
                    width: cfg.node_width,
                    height: cfg.node_height,
                    depth,
                    person: (*person).clone(),
                    relationship_label: resolver.label(person.id.as_str()).map(str::to_owned),
                });
            }
            unit_members.push((ix, depth, members.iter().map(|p| p.id.clone()).collect()));
        }
        nodes.sort_by(|a, b| {
            a.depth
                .cmp(&b.depth)
                .then(a.x.total_cmp(&b.x))
                .then_with(|| a.person_id.cmp(&b.person_id))
        });

        let edges = synthesize_edges(&index, &units, &nodes, &unit_members);

        tracing::trace!(nodes = nodes.len(), edges = edges.len(), "family tree laid out");

        FamilyLayout {
            width: (max_x - min_x) + 2.0 * cfg.padding,
            height: (max_y - min_y) + 2.0 * cfg.padding,
            nodes,
            edges,
            focal_id: Some(PersonId::from(focal_id)),
        }
    }

    /// Assign an unnormalized x to every reachable unit, row by row.
    fn place_units(&self, units: &UnitGraph<'_>, depths: &DepthMap) -> HashMap<UnitIndex, f32> {
        let cfg = &self.config;
        let mut xs: HashMap<UnitIndex, f32> = HashMap::with_capacity(depths.len());

        let rows = std::iter::once(0)
            .chain(1..=depths.max_depth())
            .chain((depths.min_depth()..0).rev());

        for depth in rows {
            let anchor_depth = match depth.cmp(&0) {
                Ordering::Greater => Some(depth - 1),
                Ordering::Less => Some(depth + 1),
                Ordering::Equal => None,
            };

            let mut anchored: Vec<(f32, usize, UnitIndex)> = Vec::new();
            let mut free: Vec<UnitIndex> = Vec::new();
            for (visit, &ix) in depths.level(depth).iter().enumerate() {
                let center = anchor_depth.and_then(|ad| {
                    let linked = if depth > 0 {
                        units.parent_units(ix)
                    } else {
                        units.child_units(ix)
                    };
                    self.anchor_center(units, depths, &xs, &linked, ad)
                });
                match center {
                    Some(c) => anchored.push((c, visit, ix)),
                    None => free.push(ix),
                }
            }
            anchored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let mut row = RowCursor::default();
            for (center, _, ix) in anchored {
                let width = cfg.unit_width(units.unit(ix).members.len());
                let x = row.place(center - width / 2.0, width, cfg.unit_gap);
                xs.insert(ix, x);
            }
            for ix in free {
                let width = cfg.unit_width(units.unit(ix).members.len());
                let x = row.place(row.next_free(cfg.unit_gap), width, cfg.unit_gap);
                xs.insert(ix, x);
            }
        }
        xs
    }

    /// Mean centre of the placed units in `linked` that sit on `anchor_depth`.
    fn anchor_center(
        &self,
        units: &UnitGraph<'_>,
        depths: &DepthMap,
        xs: &HashMap<UnitIndex, f32>,
        linked: &[UnitIndex],
        anchor_depth: i32,
    ) -> Option<f32> {
        let centers: Vec<f32> = linked
            .iter()
            .filter(|&&l| depths.depth_of(l) == Some(anchor_depth))
            .filter_map(|l| xs.get(l).map(|&x| x + self.config.unit_width(units.unit(*l).members.len()) / 2.0))
            .collect();
        mean(&centers)
    }

    /// Left-to-right display order of a unit's members.
    fn member_order<'a>(
        &self,
        index: &FamilyIndex<'a>,
        units: &UnitGraph<'a>,
        xs: &HashMap<UnitIndex, f32>,
        ix: UnitIndex,
        unit: &FamilyUnit<'a>,
        x: f32,
    ) -> Vec<&'a Person> {
        let [a, b] = unit.members.as_slice() else {
            return unit.members.clone();
        };
        let (a, b) = (*a, *b);

        let cfg = &self.config;
        let left_center = x + cfg.node_width / 2.0;
        let right_center = left_center + cfg.node_width + cfg.couple_gap;

        let anchor_of = |p: &Person| -> Option<f32> {
            let mut seen: Vec<UnitIndex> = Vec::new();
            let mut centers: Vec<f32> = Vec::new();
            for parent in index.parents(p.id.as_str()) {
                let Some(pu) = units.unit_of(parent.id.as_str()) else {
                    continue;
                };
                if pu == ix || seen.contains(&pu) {
                    continue;
                }
                seen.push(pu);
                if let Some(&px) = xs.get(&pu) {
                    centers.push(px + cfg.unit_width(units.unit(pu).members.len()) / 2.0);
                }
            }
            mean(&centers)
        };

        if let (Some(anchor_a), Some(anchor_b)) = (anchor_of(a), anchor_of(b)) {
            let keep = (anchor_a - left_center).abs() + (anchor_b - right_center).abs();
            let swap = (anchor_b - left_center).abs() + (anchor_a - right_center).abs();
            if keep < swap {
                return vec![a, b];
            }
            if swap < keep {
                return vec![b, a];
            }
        }

        let mut members = vec![a, b];
        members.sort_by(|p, q| p.gender.cmp(&q.gender).then_with(|| p.id.cmp(&q.id)));
        members
    }
}

/// Marriage edges and one parent-child edge per (unit, child).
fn synthesize_edges(
    index: &FamilyIndex<'_>,
    units: &UnitGraph<'_>,
    nodes: &[LayoutNode],
    unit_members: &[(UnitIndex, i32, Vec<PersonId>)],
) -> Vec<LayoutEdge> {
    let by_id: HashMap<&str, &LayoutNode> = nodes.iter().map(|n| (n.person_id.as_str(), n)).collect();
    let mut edges = Vec::new();

    for (ix, depth, member_ids) in unit_members {
        let unit = units.unit(*ix);
        let members: Vec<&LayoutNode> = member_ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .collect();

        if let [left, right] = members.as_slice() {
            edges.push(marriage_edge(&unit.key, left, right));
        }

        // A record's children come first, then any other child unit's members
        // named by the couple's own links.
        let child_units = units.child_units(*ix);
        let recorded = unit
            .record
            .into_iter()
            .flat_map(|record| record.children_ids.iter().map(PersonId::as_str));
        let linked = member_ids
            .iter()
            .flat_map(|m| index.child_ids(m.as_str()))
            .filter(|c| units.unit_of(c).is_some_and(|cu| child_units.contains(&cu)));
        let mut seen = HashSet::new();
        let children: Vec<&str> = recorded.chain(linked).filter(|c| seen.insert(*c)).collect();

        for child_id in children {
            if unit.contains(child_id) {
                continue;
            }
            let Some(child) = by_id.get(child_id) else {
                continue;
            };
            if child.depth <= *depth {
                continue;
            }
            edges.push(parent_child_edge(&unit.key, &members, child));
        }
    }
    edges
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}
