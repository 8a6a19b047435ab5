//! Connector synthesis for placed family units.
//!
//! Two kinds of edge are produced:
//! - **Marriage:** a horizontal segment from the right side of the left
//!   spouse to the left side of the right spouse, at mid-height.
//! - **Parent-child:** an orthogonal vertical-horizontal-vertical path from
//!   the unit's origin (marriage midpoint, or bottom centre of a single) to
//!   the child's top centre, bent halfway between the parent row's bottom
//!   and the child's top.

use std::fmt::Write as _;

use serde::Serialize;

use super::family_tree::LayoutNode;
use crate::graph::PersonId;

/// A point in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    Marriage,
    ParentChild,
}

/// A render-ready connector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    /// `m-<unitKey>` or `e-<unitKey>-<childId>`.
    pub id: String,
    pub kind: EdgeKind,
    /// Left spouse for a marriage edge, every parent-unit member otherwise.
    pub sources: Vec<PersonId>,
    /// Right spouse for a marriage edge, the child otherwise.
    pub target: PersonId,
    /// Polyline vertices, first to last.
    pub points: Vec<Point>,
    /// The same polyline as an SVG path using absolute `M`/`H`/`V` commands.
    pub path: String,
}

impl LayoutEdge {
    pub fn is_marriage(&self) -> bool {
        self.kind == EdgeKind::Marriage
    }
}

/// Horizontal line joining two spouses on the same row.
pub(crate) fn marriage_edge(unit_key: &str, left: &LayoutNode, right: &LayoutNode) -> LayoutEdge {
    let y = left.y + left.height / 2.0;
    let from = Point::new(left.x + left.width, y);
    let to = Point::new(right.x, y);

    LayoutEdge {
        id: format!("m-{unit_key}"),
        kind: EdgeKind::Marriage,
        sources: vec![left.person_id.clone()],
        target: right.person_id.clone(),
        path: format!("M {} {} H {}", from.x, from.y, to.x),
        points: vec![from, to],
    }
}

/// Where child connectors leave a unit whose members are in display order.
pub(crate) fn unit_origin(members: &[&LayoutNode]) -> Point {
    match members {
        [left, right, ..] => Point::new(
            (left.x + left.width + right.x) / 2.0,
            left.y + left.height / 2.0,
        ),
        [single] => Point::new(single.x + single.width / 2.0, single.y + single.height),
        [] => Point::new(0.0, 0.0),
    }
}

/// Orthogonal connector from a parent unit to one child node.
pub(crate) fn parent_child_edge(unit_key: &str, members: &[&LayoutNode], child: &LayoutNode) -> LayoutEdge {
    let origin = unit_origin(members);
    let parent_bottom = members.first().map_or(origin.y, |m| m.y + m.height);
    let bend_y = (parent_bottom + child.y) / 2.0;
    let child_x = child.x + child.width / 2.0;

    let points = vec![
        origin,
        Point::new(origin.x, bend_y),
        Point::new(child_x, bend_y),
        Point::new(child_x, child.y),
    ];

    LayoutEdge {
        id: format!("e-{unit_key}-{}", child.person_id),
        kind: EdgeKind::ParentChild,
        sources: members.iter().map(|m| m.person_id.clone()).collect(),
        target: child.person_id.clone(),
        path: orthogonal_path(&points),
        points,
    }
}

/// `M x y V y H x V y` for a vertical-first orthogonal polyline.
fn orthogonal_path(points: &[Point]) -> String {
    let mut path = String::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    let _ = write!(path, "M {} {}", first.x, first.y);
    for (i, p) in rest.iter().enumerate() {
        if i % 2 == 0 {
            let _ = write!(path, " V {}", p.y);
        } else {
            let _ = write!(path, " H {}", p.x);
        }
    }
    path
}
