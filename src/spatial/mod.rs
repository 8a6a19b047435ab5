//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index over the node
//! rectangles of a computed family layout.

mod rtree;

pub use rtree::{NodeRect, SpatialIndex};
