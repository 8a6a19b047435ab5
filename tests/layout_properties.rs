//! Property-based invariant tests for the family tree layout.
//!
//! Families are generated one person at a time: each new person either
//! marries an unmarried earlier person (through a couple record, mutual
//! spouse pointers, or a pointer held by only one side) or becomes the
//! child of an earlier person and their spouse. Generations are therefore
//! consistent and everyone is connected.
//!
//! 1. Layout is deterministic.
//! 2. Nodes on the same row never overlap.
//! 3. Coordinates are normalized to the padding.
//! 4. Spouses share a row.
//! 5. A child sits exactly one row below each of its parents.
//! 6. Everyone connected to the focal person is laid out once.
//! 7. Parent/child and spouse labels are symmetric.
//! 8. Input order does not change the layout.

use std::collections::HashSet;

use kintree_wasm::{
    Couple, FamilyLayout, FamilyTreeLayout, Gender, LayoutConfig, Person, PersonId, resolve_relationship,
};
use proptest::prelude::*;
use proptest::sample::Index;

// ── Helpers ─────────────────────────────────────────────────────────────

const EPS: f32 = 0.01;

#[derive(Debug, Clone, Copy)]
struct Step {
    pick: usize,
    gender: u8,
    marry: bool,
    record: bool,
    pointer: Pointer,
}

/// Which side of a pointer-only marriage records the spouse.
#[derive(Debug, Clone, Copy)]
enum Pointer {
    Both,
    NewcomerOnly,
    EarlierOnly,
}

fn gender(g: u8) -> Gender {
    match g {
        0 => Gender::Male,
        1 => Gender::Female,
        _ => Gender::Other,
    }
}

fn build_family(steps: Vec<Step>) -> (Vec<Person>, Vec<Couple>) {
    let mut persons: Vec<Person> = Vec::with_capacity(steps.len());
    let mut couples: Vec<Couple> = Vec::new();
    let mut spouse_of: Vec<Option<usize>> = Vec::with_capacity(steps.len());

    for (i, step) in steps.into_iter().enumerate() {
        let mut person = Person::new(format!("p{i}")).with_gender(gender(step.gender));
        if i == 0 {
            persons.push(person);
            spouse_of.push(None);
            continue;
        }

        let target = step.pick % i;
        if step.marry && spouse_of[target].is_none() {
            spouse_of[target] = Some(i);
            spouse_of.push(Some(target));
            if step.record {
                couples.push(Couple::new(&format!("c{i}"), persons[target].id.clone(), person.id.clone()));
            } else {
                if !matches!(step.pointer, Pointer::EarlierOnly) {
                    person.spouse = Some(persons[target].id.clone());
                }
                if !matches!(step.pointer, Pointer::NewcomerOnly) {
                    persons[target].spouse = Some(person.id.clone());
                }
            }
            persons.push(person);
            continue;
        }

        let mut parents = vec![persons[target].id.clone()];
        if let Some(s) = spouse_of[target] {
            parents.push(persons[s].id.clone());
        }
        // Alternate which side records the link.
        if step.record {
            for parent in &parents {
                if let Some(p) = persons.iter_mut().find(|p| &p.id == parent) {
                    p.children.push(person.id.clone());
                }
            }
            if let Some(couple) = couples
                .iter_mut()
                .find(|c| parents.contains(&c.husband_id) && parents.contains(&c.wife_id))
            {
                couple.children_ids.push(person.id.clone());
            }
        } else {
            person.parents = parents;
        }
        spouse_of.push(None);
        persons.push(person);
    }

    (persons, couples)
}

fn family_strategy() -> impl Strategy<Value = (Vec<Person>, Vec<Couple>)> {
    prop::collection::vec(
        (
            0usize..1000,
            0u8..3,
            any::<bool>(),
            any::<bool>(),
            prop_oneof![Just(Pointer::Both), Just(Pointer::NewcomerOnly), Just(Pointer::EarlierOnly)],
        )
            .prop_map(|(pick, gender, marry, record, pointer)| Step {
                pick,
                gender,
                marry,
                record,
                pointer,
            }),
        1..30,
    )
    .prop_map(build_family)
}

/// A family together with a reordering of its persons and couples.
fn shuffled_family_strategy() -> impl Strategy<Value = ((Vec<Person>, Vec<Couple>), (Vec<Person>, Vec<Couple>))> {
    family_strategy().prop_flat_map(|(persons, couples)| {
        let original = Just((persons.clone(), couples.clone()));
        let reordered = (Just(persons).prop_shuffle(), Just(couples).prop_shuffle());
        (original, reordered)
    })
}

/// Node geometry keyed by person, and edges keyed by id.
fn canonical(layout: &FamilyLayout) -> (Vec<String>, Vec<String>) {
    let mut nodes: Vec<String> = layout
        .nodes
        .iter()
        .map(|n| format!("{} {} {} {} {:?}", n.person_id, n.x, n.y, n.depth, n.relationship_label))
        .collect();
    nodes.sort();
    let mut edges: Vec<String> = layout
        .edges
        .iter()
        .map(|e| format!("{} {:?} {}", e.id, e.points, e.path))
        .collect();
    edges.sort();
    (nodes, edges)
}

fn config() -> LayoutConfig {
    LayoutConfig {
        node_width: 100.0,
        node_height: 40.0,
        couple_gap: 8.0,
        unit_gap: 24.0,
        level_gap: 60.0,
        padding: 16.0,
    }
}

fn layout_for(persons: &[Person], couples: &[Couple], focal: &Index) -> (FamilyLayout, PersonId) {
    let focal = persons[focal.index(persons.len())].id.clone();
    let layout = FamilyTreeLayout::new(config()).compute(persons, couples, focal.as_str());
    (layout, focal)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_is_deterministic((persons, couples) in family_strategy(), focal in any::<Index>()) {
        let (first, focal_id) = layout_for(&persons, &couples, &focal);
        let second = FamilyTreeLayout::new(config()).compute(&persons.clone(), &couples.clone(), focal_id.as_str());
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. No overlap within a row
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rows_never_overlap((persons, couples) in family_strategy(), focal in any::<Index>()) {
        let (layout, _) = layout_for(&persons, &couples, &focal);
        for (i, a) in layout.nodes.iter().enumerate() {
            for b in &layout.nodes[i + 1..] {
                if (a.y - b.y).abs() > EPS {
                    continue;
                }
                let disjoint = a.x + a.width <= b.x + EPS || b.x + b.width <= a.x + EPS;
                prop_assert!(disjoint, "{} and {} overlap", a.person_id, b.person_id);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Normalization
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn coordinates_are_normalized((persons, couples) in family_strategy(), focal in any::<Index>()) {
        let (layout, _) = layout_for(&persons, &couples, &focal);
        let padding = config().padding;
        let min_x = layout.nodes.iter().map(|n| n.x).fold(f32::INFINITY, f32::min);
        let min_y = layout.nodes.iter().map(|n| n.y).fold(f32::INFINITY, f32::min);
        prop_assert!((min_x - padding).abs() < EPS, "min x {} != padding", min_x);
        prop_assert!((min_y - padding).abs() < EPS, "min y {} != padding", min_y);

        for n in &layout.nodes {
            prop_assert!(n.x + n.width <= layout.width - padding + EPS);
            prop_assert!(n.y + n.height <= layout.height - padding + EPS);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Spouses share a row
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn spouses_share_a_row((persons, couples) in family_strategy(), focal in any::<Index>()) {
        let (layout, _) = layout_for(&persons, &couples, &focal);
        for edge in layout.edges.iter().filter(|e| e.is_marriage()) {
            let left = layout.node(edge.sources[0].as_str()).unwrap();
            let right = layout.node(edge.target.as_str()).unwrap();
            prop_assert_eq!(left.y, right.y);
            prop_assert!(left.x < right.x);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Depth monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn children_sit_one_row_below((persons, couples) in family_strategy(), focal in any::<Index>()) {
        let (layout, _) = layout_for(&persons, &couples, &focal);
        for child in &persons {
            let Some(child_node) = layout.node(child.id.as_str()) else { continue };
            let parents = persons
                .iter()
                .filter(|p| child.parents.contains(&p.id) || p.children.contains(&child.id));
            for parent in parents {
                let parent_node = layout.node(parent.id.as_str()).unwrap();
                prop_assert_eq!(child_node.depth, parent_node.depth + 1);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Everyone laid out once
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn every_person_laid_out_once((persons, couples) in family_strategy(), focal in any::<Index>()) {
        let (layout, focal_id) = layout_for(&persons, &couples, &focal);
        prop_assert_eq!(layout.nodes.len(), persons.len());

        let unique: HashSet<&str> = layout.nodes.iter().map(|n| n.person_id.as_str()).collect();
        prop_assert_eq!(unique.len(), persons.len());

        let me = layout.node(focal_id.as_str()).unwrap();
        prop_assert_eq!(me.depth, 0);
        prop_assert_eq!(me.relationship_label.as_deref(), Some("You"));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Relationship symmetry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn direct_relations_are_symmetric((persons, _couples) in family_strategy()) {
        for a in &persons {
            for b in &persons {
                let forward = resolve_relationship(&persons, a.id.as_str(), b.id.as_str());
                let back = resolve_relationship(&persons, b.id.as_str(), a.id.as_str());
                match forward.as_deref() {
                    Some("Father" | "Mother" | "Parent") => {
                        let expected = match a.gender {
                            Gender::Male => "Son",
                            Gender::Female => "Daughter",
                            Gender::Other => "Child",
                        };
                        prop_assert_eq!(back.as_deref(), Some(expected));
                    }
                    Some("Husband" | "Wife" | "Spouse") => {
                        prop_assert!(matches!(back.as_deref(), Some("Husband" | "Wife" | "Spouse")));
                    }
                    _ => {}
                }
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Input order independence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn input_order_does_not_change_layout(
        ((persons, couples), (shuffled_persons, shuffled_couples)) in shuffled_family_strategy(),
        focal in any::<Index>(),
    ) {
        let (original, focal_id) = layout_for(&persons, &couples, &focal);
        let reordered = FamilyTreeLayout::new(config()).compute(&shuffled_persons, &shuffled_couples, focal_id.as_str());

        prop_assert_eq!(original.nodes.len(), persons.len());
        prop_assert_eq!(canonical(&original), canonical(&reordered));
        prop_assert_eq!(original.width, reordered.width);
        prop_assert_eq!(original.height, reordered.height);
    }
}
