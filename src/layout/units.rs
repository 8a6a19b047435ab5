//! Family unit construction.
//!
//! Partitions a person snapshot into family units (a couple or a single
//! person) and links the units into a parent→child graph.
//!
//! # Algorithm
//!
//! 1. **Couple records:** every record whose husband and wife both resolve,
//!    and neither of whom is already in a unit, becomes a couple unit.
//! 2. **Spouse pointers:** remaining persons are visited by id. Mutual
//!    pointers pair first; then a one-way pointer pairs two remaining persons
//!    whichever side holds it. The unit key is the sorted id pair.
//! 3. **Singles:** everyone left becomes a single unit.
//!
//! Unit handles are assigned in order of each unit's smallest member id, so
//! the graph does not depend on the order of the person snapshot.
//! 4. **Adjacency:** a parent→child unit edge is recorded for every
//!    `parents` entry, every `children` entry and every couple record
//!    `childrenIds` entry whose two ends land in different units. Reading
//!    links from both sides tolerates one-directional data.

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};

use crate::graph::{Couple, FamilyIndex, Person};

/// Stable handle to a unit within a [`UnitGraph`].
pub type UnitIndex = NodeIndex;

/// A couple or a single person, placed as one block.
#[derive(Debug, Clone)]
pub struct FamilyUnit<'a> {
    /// Identity used for edge ids; couple record id, sorted pair, or person id.
    pub key: String,
    /// One or two members, in construction order (not display order).
    pub members: Vec<&'a Person>,
    /// The couple record this unit came from, if any.
    pub record: Option<&'a Couple>,
}

impl<'a> FamilyUnit<'a> {
    fn couple(key: String, first: &'a Person, second: &'a Person, record: Option<&'a Couple>) -> Self {
        Self {
            key,
            members: vec![first, second],
            record,
        }
    }

    fn single(person: &'a Person) -> Self {
        Self {
            key: person.id.to_string(),
            members: vec![person],
            record: None,
        }
    }

    /// Whether this unit holds two spouses.
    #[inline]
    pub fn is_couple(&self) -> bool {
        self.members.len() == 2
    }

    /// Smallest member id; unique across units.
    fn first_id(&self) -> &'a str {
        self.members
            .iter()
            .map(|&m| m.id.as_str())
            .min()
            .unwrap_or_default()
    }

    /// Whether `id` is a member of this unit.
    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m.id.as_str() == id)
    }
}

/// Family units linked by parent→child edges.
pub struct UnitGraph<'a> {
    graph: StableGraph<FamilyUnit<'a>, (), Directed>,
    unit_of: HashMap<&'a str, UnitIndex>,
}

impl<'a> UnitGraph<'a> {
    /// Build units and their adjacency from an indexed snapshot.
    pub fn build(index: &FamilyIndex<'a>, couples: &'a [Couple]) -> Self {
        let mut found: Vec<FamilyUnit<'a>> = Vec::with_capacity(index.len());
        let mut processed: HashSet<&'a str> = HashSet::with_capacity(index.len());

        // 1. Explicit couple records
        for couple in couples {
            let (Some(husband), Some(wife)) = (
                index.get(couple.husband_id.as_str()),
                index.get(couple.wife_id.as_str()),
            ) else {
                tracing::debug!(couple = %couple.id, "couple record references a missing person; skipped");
                continue;
            };
            if husband.id == wife.id {
                tracing::debug!(couple = %couple.id, "couple record pairs a person with themself; skipped");
                continue;
            }
            if processed.contains(husband.id.as_str()) || processed.contains(wife.id.as_str()) {
                tracing::debug!(couple = %couple.id, "couple member already belongs to a unit; skipped");
                continue;
            }

            let key = if couple.id.is_empty() {
                pair_key(husband, wife)
            } else {
                couple.id.clone()
            };
            processed.insert(husband.id.as_str());
            processed.insert(wife.id.as_str());
            found.push(FamilyUnit::couple(key, husband, wife, Some(couple)));
        }

        // Remaining persons are visited by id.
        let mut remaining: Vec<&'a Person> = index
            .persons()
            .iter()
            .copied()
            .filter(|p| !processed.contains(p.id.as_str()))
            .collect();
        remaining.sort_by(|a, b| a.id.cmp(&b.id));

        // 2a. Mutual spouse pointers
        for &person in &remaining {
            if processed.contains(person.id.as_str()) {
                continue;
            }
            let mutual = index
                .own_spouse(person)
                .filter(|s| s.spouse.as_ref() == Some(&person.id))
                .filter(|s| !processed.contains(s.id.as_str()));
            if let Some(spouse) = mutual {
                found.push(pair(person, spouse));
                processed.insert(person.id.as_str());
                processed.insert(spouse.id.as_str());
            }
        }

        // 2b. One-way pointers from either side, 3. singles
        for &person in &remaining {
            if processed.contains(person.id.as_str()) {
                continue;
            }
            let spouse = index
                .own_spouse(person)
                .into_iter()
                .chain(index.spouse_claimants(person.id.as_str()))
                .find(|s| !processed.contains(s.id.as_str()));

            processed.insert(person.id.as_str());
            match spouse {
                Some(spouse) => {
                    processed.insert(spouse.id.as_str());
                    found.push(pair(person, spouse));
                }
                None => found.push(FamilyUnit::single(person)),
            }
        }

        // Handles follow the smallest member id, not input order.
        found.sort_by(|a, b| a.first_id().cmp(b.first_id()));

        let mut graph: StableGraph<FamilyUnit<'a>, (), Directed> =
            StableGraph::with_capacity(found.len(), index.len());
        let mut unit_of: HashMap<&'a str, UnitIndex> = HashMap::with_capacity(index.len());
        for unit in found {
            let members: Vec<&'a Person> = unit.members.clone();
            let ix = graph.add_node(unit);
            for member in members {
                unit_of.insert(member.id.as_str(), ix);
            }
        }

        let mut units = Self { graph, unit_of };
        units.link(index);
        units
    }

    /// 4. Record parent→child unit edges from every link source.
    fn link(&mut self, index: &FamilyIndex<'a>) {
        let mut pending: Vec<(UnitIndex, UnitIndex)> = Vec::new();

        for &person in index.persons() {
            let Some(own) = self.unit_of(person.id.as_str()) else {
                continue;
            };
            for parent in &person.parents {
                if let Some(parent_unit) = self.unit_of(parent.as_str()) {
                    pending.push((parent_unit, own));
                }
            }
            for child in &person.children {
                if let Some(child_unit) = self.unit_of(child.as_str()) {
                    pending.push((own, child_unit));
                }
            }
        }

        for ix in self.graph.node_indices() {
            if let Some(record) = self.graph[ix].record {
                for child in &record.children_ids {
                    if let Some(child_unit) = self.unit_of(child.as_str()) {
                        pending.push((ix, child_unit));
                    }
                }
            }
        }

        for (parent, child) in pending {
            if parent != child {
                self.graph.update_edge(parent, child, ());
            }
        }
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether there are no units.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of distinct parent→child unit edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All unit handles, ordered by each unit's smallest member id.
    pub fn indices(&self) -> impl Iterator<Item = UnitIndex> + '_ {
        self.graph.node_indices()
    }

    /// Get a unit by handle.
    pub fn unit(&self, ix: UnitIndex) -> &FamilyUnit<'a> {
        &self.graph[ix]
    }

    /// The unit a person belongs to.
    pub fn unit_of(&self, id: &str) -> Option<UnitIndex> {
        self.unit_of.get(id).copied()
    }

    /// Units holding a parent of any member, in ascending handle order.
    pub fn parent_units(&self, ix: UnitIndex) -> Vec<UnitIndex> {
        self.sorted_neighbors(ix, Direction::Incoming)
    }

    /// Units holding a child of any member, in ascending handle order.
    pub fn child_units(&self, ix: UnitIndex) -> Vec<UnitIndex> {
        self.sorted_neighbors(ix, Direction::Outgoing)
    }

    /// Whether a parent→child edge links the two units.
    pub fn is_parent_of(&self, parent: UnitIndex, child: UnitIndex) -> bool {
        self.graph.find_edge(parent, child).is_some()
    }

    fn sorted_neighbors(&self, ix: UnitIndex, dir: Direction) -> Vec<UnitIndex> {
        let mut out: Vec<UnitIndex> = self.graph.neighbors_directed(ix, dir).collect();
        out.sort_unstable_by_key(|n| n.index());
        out.dedup();
        out
    }
}

/// A synthetic couple unit with members in id order.
fn pair<'a>(a: &'a Person, b: &'a Person) -> FamilyUnit<'a> {
    let (first, second) = if a.id <= b.id { (a, b) } else { (b, a) };
    FamilyUnit::couple(pair_key(first, second), first, second, None)
}

/// Sorted-pair key for a couple without a record id.
fn pair_key(a: &Person, b: &Person) -> String {
    if a.id <= b.id {
        format!("{}-{}", a.id, b.id)
    } else {
        format!("{}-{}", b.id, a.id)
    }
}
