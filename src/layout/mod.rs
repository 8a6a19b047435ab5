//! Family tree layout.
//!
//! The engine runs three stages over a person snapshot:
//! - [`units`] groups persons into couple and single family units
//! - [`depth`] assigns each unit a generation relative to the focal person
//! - [`family_tree`] places units on generation rows and expands them into
//!   nodes, with [`connectors`] producing the marriage and parent-child edges
//!
//! Every call recomputes from scratch; identical inputs give identical output.

pub mod connectors;
pub mod depth;
pub mod family_tree;
pub mod units;

pub use connectors::{EdgeKind, LayoutEdge, Point};
pub use family_tree::{FamilyLayout, FamilyTreeLayout, LayoutConfig, LayoutNode};

use crate::graph::{Couple, Person};

/// Lay out the family around `focal_id` with the default configuration.
pub fn compute_layout(persons: &[Person], couples: &[Couple], focal_id: &str) -> FamilyLayout {
    FamilyTreeLayout::with_defaults().compute(persons, couples, focal_id)
}
