//! FamilyIndex - tolerant lookup over a person snapshot.
//!
//! The index borrows a snapshot of person documents and answers link
//! queries using *effective* links: the union of what a person's own record
//! says and what other records claim about it. This tolerates the
//! one-directional and stale links an eventually-consistent store produces:
//!
//! - parents of X = X.parents ∪ { P | X ∈ P.children }
//! - children of X = X.children ∪ { C | X ∈ C.parents }
//! - spouse of X = X.spouse if it resolves, else the first P with P.spouse = X
//!
//! Ids that do not resolve to a person are never returned as persons, but
//! remain visible as raw ids through [`FamilyIndex::parent_ids`].

use std::collections::HashMap;

use super::person::{Person, PersonId};

/// Read-only index over a borrowed person snapshot.
pub struct FamilyIndex<'a> {
    /// Unique persons in input order (first occurrence of a duplicate id wins).
    persons: Vec<&'a Person>,

    /// Map from id to person record.
    by_id: HashMap<&'a str, &'a Person>,

    /// Reverse map: child id -> ids of persons listing it in `children`.
    claimed_parents: HashMap<&'a str, Vec<&'a str>>,

    /// Reverse map: parent id -> ids of persons listing it in `parents`.
    claimed_children: HashMap<&'a str, Vec<&'a str>>,

    /// Reverse map: spouse id -> ids of persons pointing at it.
    claimed_spouses: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> FamilyIndex<'a> {
    /// Index a person snapshot.
    pub fn new(snapshot: &'a [Person]) -> Self {
        let mut persons = Vec::with_capacity(snapshot.len());
        let mut by_id: HashMap<&'a str, &'a Person> = HashMap::with_capacity(snapshot.len());

        for person in snapshot {
            if by_id.contains_key(person.id.as_str()) {
                tracing::debug!(id = %person.id, "duplicate person id ignored");
                continue;
            }
            by_id.insert(person.id.as_str(), person);
            persons.push(person);
        }

        let mut claimed_parents: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        let mut claimed_children: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        let mut claimed_spouses: HashMap<&'a str, Vec<&'a str>> = HashMap::new();

        for &person in &persons {
            let id = person.id.as_str();
            for child in &person.children {
                push_unique(claimed_parents.entry(child.as_str()).or_default(), id);
            }
            for parent in &person.parents {
                push_unique(claimed_children.entry(parent.as_str()).or_default(), id);
            }
            if let Some(spouse) = &person.spouse {
                push_unique(claimed_spouses.entry(spouse.as_str()).or_default(), id);
            }
        }

        Self {
            persons,
            by_id,
            claimed_parents,
            claimed_children,
            claimed_spouses,
        }
    }

    /// Number of unique persons.
    pub fn len(&self) -> usize {
        self.persons.len()
    }

    /// Whether the snapshot holds no persons.
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Unique persons in input order.
    pub fn persons(&self) -> &[&'a Person] {
        &self.persons
    }

    /// Look up a person by id. Dangling ids yield `None`.
    pub fn get(&self, id: &str) -> Option<&'a Person> {
        self.by_id.get(id).copied()
    }

    /// Whether `id` resolves to a person.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Effective parent ids of `id`, including ids that do not resolve.
    pub fn parent_ids(&self, id: &str) -> Vec<&'a str> {
        let own = self.get(id).map(|p| p.parents.as_slice()).unwrap_or(&[]);
        let claimed = self.claimed_parents.get(id).map(Vec::as_slice).unwrap_or(&[]);
        merge_ids(id, own, claimed)
    }

    /// Effective child ids of `id`, including ids that do not resolve.
    pub fn child_ids(&self, id: &str) -> Vec<&'a str> {
        let own = self.get(id).map(|p| p.children.as_slice()).unwrap_or(&[]);
        let claimed = self.claimed_children.get(id).map(Vec::as_slice).unwrap_or(&[]);
        merge_ids(id, own, claimed)
    }

    /// Resolvable effective parents of `id`.
    pub fn parents(&self, id: &str) -> Vec<&'a Person> {
        self.parent_ids(id)
            .into_iter()
            .filter_map(|pid| self.get(pid))
            .collect()
    }

    /// Resolvable effective children of `id`.
    pub fn children(&self, id: &str) -> Vec<&'a Person> {
        self.child_ids(id)
            .into_iter()
            .filter_map(|cid| self.get(cid))
            .collect()
    }

    /// Resolvable effective spouse of `id`.
    pub fn spouse(&self, id: &str) -> Option<&'a Person> {
        let own = self
            .get(id)
            .and_then(|p| p.spouse.as_ref())
            .filter(|s| s.as_str() != id)
            .and_then(|s| self.get(s.as_str()));
        if own.is_some() {
            return own;
        }
        self.claimed_spouses
            .get(id)
            .into_iter()
            .flatten()
            .filter(|&&claimant| claimant != id)
            .find_map(|&claimant| self.get(claimant))
    }

    /// The spouse named by `person`'s own record, if it resolves.
    ///
    /// Unlike [`FamilyIndex::spouse`] this ignores claims made by other
    /// records.
    pub fn own_spouse(&self, person: &Person) -> Option<&'a Person> {
        person
            .spouse
            .as_ref()
            .filter(|s| **s != person.id)
            .and_then(|s| self.get(s.as_str()))
    }

    /// Resolvable persons whose own `spouse` pointer names `id`, in input order.
    pub fn spouse_claimants(&self, id: &str) -> Vec<&'a Person> {
        self.claimed_spouses
            .get(id)
            .into_iter()
            .flatten()
            .filter(|&&claimant| claimant != id)
            .filter_map(|&claimant| self.get(claimant))
            .collect()
    }

    /// Whether `a` and `b` share at least one effective parent id.
    pub fn share_parent(&self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        let theirs = self.parent_ids(b);
        self.parent_ids(a).iter().any(|pid| theirs.contains(pid))
    }

    /// Resolvable neighbours through parent, child and spouse links.
    pub fn relatives(&self, id: &str) -> Vec<&'a Person> {
        let mut out = self.parents(id);
        for child in self.children(id) {
            if !out.iter().any(|p| p.id == child.id) {
                out.push(child);
            }
        }
        if let Some(spouse) = self.spouse(id) {
            if !out.iter().any(|p| p.id == spouse.id) {
                out.push(spouse);
            }
        }
        out
    }
}

fn push_unique<'a>(ids: &mut Vec<&'a str>, id: &'a str) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

/// Merge own and claimed ids, preserving order, dropping duplicates and `id` itself.
fn merge_ids<'a>(id: &str, own: &'a [PersonId], claimed: &[&'a str]) -> Vec<&'a str> {
    let mut out: Vec<&'a str> = Vec::with_capacity(own.len() + claimed.len());
    for candidate in own.iter().map(PersonId::as_str).chain(claimed.iter().copied()) {
        if candidate != id && !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&Person]) -> Vec<String> {
        v.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_lookup_and_duplicates() {
        let persons = vec![
            Person::new("a").with_name("First", ""),
            Person::new("b"),
            Person::new("a").with_name("Second", ""),
        ];
        let index = FamilyIndex::new(&persons);

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a").map(|p| p.first_name.as_str()), Some("First"));
        assert!(index.get("missing").is_none());
    }

    #[test]
    fn test_one_directional_links_are_merged() {
        // Parent only lists the child; the child lists nobody.
        let persons = vec![Person::new("p").with_children(["c"]), Person::new("c")];
        let index = FamilyIndex::new(&persons);

        assert_eq!(index.parent_ids("c"), vec!["p"]);
        assert_eq!(ids(&index.children("p")), vec!["c"]);

        // Child only lists the parent.
        let persons = vec![Person::new("p"), Person::new("c").with_parents(["p"])];
        let index = FamilyIndex::new(&persons);
        assert_eq!(ids(&index.parents("c")), vec!["p"]);
        assert_eq!(index.child_ids("p"), vec!["c"]);
    }

    #[test]
    fn test_dangling_ids_are_raw_only() {
        let persons = vec![Person::new("c").with_parents(["ghost", "p"]), Person::new("p")];
        let index = FamilyIndex::new(&persons);

        assert_eq!(index.parent_ids("c"), vec!["ghost", "p"]);
        assert_eq!(ids(&index.parents("c")), vec!["p"]);
    }

    #[test]
    fn test_spouse_resolution() {
        let persons = vec![
            Person::new("a").with_spouse("b"),
            Person::new("b"),
            Person::new("c").with_spouse("nobody"),
            Person::new("d").with_spouse("d"),
        ];
        let index = FamilyIndex::new(&persons);

        assert_eq!(index.spouse("a").map(|p| p.id.as_str()), Some("b"));
        // Asymmetric pointer still resolves from the other side.
        assert_eq!(index.spouse("b").map(|p| p.id.as_str()), Some("a"));
        assert!(index.own_spouse(index.get("b").unwrap()).is_none());
        assert!(index.spouse("c").is_none());
        assert!(index.spouse("d").is_none());
    }

    #[test]
    fn test_share_parent() {
        let persons = vec![
            Person::new("x").with_parents(["p1", "p2"]),
            Person::new("y").with_parents(["p2"]),
            Person::new("z").with_parents(["q"]),
        ];
        let index = FamilyIndex::new(&persons);

        assert!(index.share_parent("x", "y"));
        assert!(!index.share_parent("x", "z"));
        assert!(!index.share_parent("x", "x"));
    }
}
