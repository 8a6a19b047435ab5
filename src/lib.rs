//! Kintree - WASM Module
//!
//! This module provides the family tree layout engine and kinship resolver
//! for the Kintree web application. It is compiled to WebAssembly and
//! exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: Person and couple records, and a tolerant link index
//! - `layout`: Family units, generation depths and row placement
//! - `kinship`: Relationship labels relative to a "self" person
//! - `calendar`: Birthdays, anniversaries and remembrance days
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//!
//! Every computation is a pure function of the snapshot it is given.

use js_sys::Float32Array;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

pub mod calendar;
pub mod error;
pub mod graph;
pub mod kinship;
pub mod layout;
pub mod spatial;

pub use error::{Error, Result};
pub use graph::{Couple, FamilyIndex, Gender, Person, PersonId};
pub use kinship::{Kinship, RelationshipResolver, resolve_relationship};
pub use layout::{
    FamilyLayout, FamilyTreeLayout, LayoutConfig, LayoutEdge, LayoutNode, compute_layout,
};

use calendar::{CustomEvent, DEFAULT_UPCOMING_WINDOW_DAYS, categorize_events, parse_date};
use spatial::SpatialIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

// =========================================================================
// JS Conversion
// =========================================================================

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// `undefined` and `null` mean "use the defaults".
fn config_from_js(value: JsValue) -> Result<LayoutConfig> {
    let config = if value.is_undefined() || value.is_null() {
        LayoutConfig::default()
    } else {
        from_js(value)?
    };
    config.validate()?;
    Ok(config)
}

// =========================================================================
// Free Functions
// =========================================================================

/// Lay out the family around `focalPersonId`.
///
/// Returns `{nodes, edges, width, height, focalId}`. An unknown focal person
/// gives the empty layout rather than an error.
#[wasm_bindgen(js_name = computeLayout)]
pub fn compute_layout_js(
    persons: JsValue,
    couples: JsValue,
    focal_person_id: &str,
    config: JsValue,
) -> std::result::Result<JsValue, JsValue> {
    let persons: Vec<Person> = from_js(persons)?;
    let couples: Vec<Couple> = from_js(couples)?;
    let engine = FamilyTreeLayout::new(config_from_js(config)?);
    Ok(to_js(&engine.compute(&persons, &couples, focal_person_id))?)
}

/// Kinship term of `targetPersonId` relative to `selfPersonId`, or `null`.
#[wasm_bindgen(js_name = resolveRelationship)]
pub fn resolve_relationship_js(
    persons: JsValue,
    self_person_id: &str,
    target_person_id: &str,
) -> std::result::Result<Option<String>, JsValue> {
    let persons: Vec<Person> = from_js(persons)?;
    Ok(resolve_relationship(&persons, self_person_id, target_person_id))
}

/// Split derived events into `{upcoming, later, remembrance}`.
///
/// `today` is a `YYYY-MM-DD` string; `windowDays` defaults to 30.
#[wasm_bindgen(js_name = categorizeEvents)]
pub fn categorize_events_js(
    persons: JsValue,
    couples: JsValue,
    custom_events: JsValue,
    today: &str,
    window_days: Option<u32>,
) -> std::result::Result<JsValue, JsValue> {
    let persons: Vec<Person> = from_js(persons)?;
    let couples: Vec<Couple> = from_js(couples)?;
    let custom: Vec<CustomEvent> = if custom_events.is_undefined() || custom_events.is_null() {
        Vec::new()
    } else {
        from_js(custom_events)?
    };
    let today = parse_date(today).ok_or_else(|| Error::InvalidDate(today.to_owned()))?;
    let events = categorize_events(
        &persons,
        &couples,
        &custom,
        today,
        window_days.unwrap_or(DEFAULT_UPCOMING_WINDOW_DAYS),
    );
    Ok(to_js(&events)?)
}

// =========================================================================
// Stateful Handle
// =========================================================================

/// Holds the latest snapshot and the layout computed from it.
///
/// The tree view keeps one of these alive between renders: snapshots are
/// replaced as the store pushes updates, and hit testing runs against the
/// most recent layout. Every `computeLayout` starts from scratch.
#[wasm_bindgen]
pub struct FamilyTreeWasm {
    persons: Vec<Person>,
    couples: Vec<Couple>,
    engine: FamilyTreeLayout,
    layout: FamilyLayout,
    spatial: SpatialIndex,
}

#[wasm_bindgen]
impl FamilyTreeWasm {
    /// Create an empty handle with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            persons: Vec::new(),
            couples: Vec::new(),
            engine: FamilyTreeLayout::with_defaults(),
            layout: FamilyLayout::empty(),
            spatial: SpatialIndex::new(),
        }
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// Replace the person snapshot.
    #[wasm_bindgen(js_name = setPersons)]
    pub fn set_persons(&mut self, persons: JsValue) -> std::result::Result<(), JsValue> {
        self.persons = from_js(persons)?;
        Ok(())
    }

    /// Replace the couple snapshot.
    #[wasm_bindgen(js_name = setCouples)]
    pub fn set_couples(&mut self, couples: JsValue) -> std::result::Result<(), JsValue> {
        self.couples = from_js(couples)?;
        Ok(())
    }

    /// Replace the layout configuration. `null` restores the defaults.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> std::result::Result<(), JsValue> {
        self.engine = FamilyTreeLayout::new(config_from_js(config)?);
        Ok(())
    }

    /// Drop the snapshot and the last layout.
    pub fn clear(&mut self) {
        self.persons.clear();
        self.couples.clear();
        self.layout = FamilyLayout::empty();
        self.spatial.clear();
    }

    #[wasm_bindgen(js_name = personCount)]
    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out the snapshot around `focalId` and return the layout object.
    #[wasm_bindgen(js_name = computeLayout)]
    pub fn compute_layout(&mut self, focal_id: &str) -> std::result::Result<JsValue, JsValue> {
        self.recompute(focal_id);
        Ok(to_js(&self.layout)?)
    }

    /// Node positions of the last layout as `[x0, y0, x1, y1, ...]`.
    #[wasm_bindgen(js_name = nodePositions)]
    pub fn node_positions(&self) -> Float32Array {
        Float32Array::from(&self.layout.positions()[..])
    }

    /// Person ids of the last layout, in the same order as `nodePositions`.
    #[wasm_bindgen(js_name = nodeIds)]
    pub fn node_ids(&self) -> Vec<String> {
        self.layout.nodes.iter().map(|n| n.person_id.to_string()).collect()
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.layout.nodes.len()
    }

    pub fn width(&self) -> f32 {
        self.layout.width
    }

    pub fn height(&self) -> f32 {
        self.layout.height
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Person whose node contains the point, if any.
    #[wasm_bindgen(js_name = findNodeAt)]
    pub fn find_node_at(&self, x: f32, y: f32) -> Option<String> {
        self.spatial.node_at(x, y).map(|r| r.id.to_string())
    }

    /// Person whose node is closest to the point.
    #[wasm_bindgen(js_name = findNearestNode)]
    pub fn find_nearest_node(&self, x: f32, y: f32) -> Option<String> {
        self.spatial.nearest(x, y).map(|r| r.id.to_string())
    }

    /// Persons whose nodes intersect the rectangle, in node order.
    #[wasm_bindgen(js_name = findNodesInRect)]
    pub fn find_nodes_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<String> {
        self.spatial
            .nodes_in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(|r| r.id.to_string())
            .collect()
    }

    // =========================================================================
    // Kinship
    // =========================================================================

    /// Kinship term of `targetId` relative to `selfId` within the snapshot.
    pub fn relationship(&self, self_id: &str, target_id: &str) -> Option<String> {
        resolve_relationship(&self.persons, self_id, target_id)
    }
}

impl FamilyTreeWasm {
    /// Create a handle over an existing snapshot.
    pub fn with_snapshot(persons: Vec<Person>, couples: Vec<Couple>) -> Self {
        Self {
            persons,
            couples,
            ..Self::new()
        }
    }

    /// Recompute the layout and the hit-testing index.
    pub fn recompute(&mut self, focal_id: &str) -> &FamilyLayout {
        self.layout = self.engine.compute(&self.persons, &self.couples, focal_id);
        self.spatial.rebuild(&self.layout);
        &self.layout
    }

    /// The last computed layout.
    pub fn layout(&self) -> &FamilyLayout {
        &self.layout
    }
}

impl Default for FamilyTreeWasm {
    fn default() -> Self {
        Self::new()
    }
}
