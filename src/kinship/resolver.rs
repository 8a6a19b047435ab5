//! Priority-chain relationship resolution.
//!
//! Rules are tried in order and the first match wins:
//!
//! 1. Self
//! 2. Parent, child, spouse
//! 3. Sibling (shares a parent id, resolvable or not)
//! 4. Grandparent, then grandchild
//! 5. Parent-in-law, then sibling-in-law (through self's spouse)
//! 6. Aunt/uncle, then cousin (through each of self's parents in turn)
//! 7. Niece/nephew
//! 8. Relative, if reachable through any parent, child or spouse link
//!
//! Deeper degrees (great-grandparents, second cousins) are not modelled and
//! fall through to `Relative`.

use std::collections::{HashSet, VecDeque};

use super::Kinship;
use crate::graph::{FamilyIndex, Person};

/// Labels persons relative to one fixed self person.
///
/// Everything the rules need is derived from the index, and the only
/// precomputed state (the reachable set) is immutable, so `label` calls are
/// independent of each other.
pub struct RelationshipResolver<'i, 'a> {
    index: &'i FamilyIndex<'a>,
    me: Option<&'a Person>,
    reachable: HashSet<&'a str>,
}

impl<'i, 'a> RelationshipResolver<'i, 'a> {
    pub fn new(index: &'i FamilyIndex<'a>, self_id: &str) -> Self {
        let me = index.get(self_id);
        let reachable = me.map(|me| reachable_from(index, me)).unwrap_or_default();
        Self {
            index,
            me,
            reachable,
        }
    }

    /// The self person, if it exists in the snapshot.
    pub fn me(&self) -> Option<&'a Person> {
        self.me
    }

    /// Kinship term for `target_id`, or `None` when either person is
    /// unknown or the target is not connected to self.
    pub fn label(&self, target_id: &str) -> Option<&'static str> {
        let target = self.index.get(target_id)?;
        self.kinship(target_id).map(|k| k.term(target.gender))
    }

    /// Resolve the relation of `target_id` to self.
    pub fn kinship(&self, target_id: &str) -> Option<Kinship> {
        let me = self.me?;
        let target = self.index.get(target_id)?;
        let ix = self.index;
        let me_id = me.id.as_str();
        let them = target.id.as_str();

        if me_id == them {
            return Some(Kinship::You);
        }

        let my_parents = ix.parent_ids(me_id);
        if my_parents.contains(&them) {
            return Some(Kinship::Parent);
        }
        if ix.child_ids(me_id).contains(&them) {
            return Some(Kinship::Child);
        }
        let my_spouse = ix.spouse(me_id);
        if my_spouse.is_some_and(|s| s.id.as_str() == them)
            || ix.spouse(them).is_some_and(|s| s.id.as_str() == me_id)
        {
            return Some(Kinship::Spouse);
        }

        if ix.share_parent(me_id, them) {
            return Some(Kinship::Sibling);
        }

        if my_parents
            .iter()
            .any(|&p| ix.parent_ids(p).contains(&them))
        {
            return Some(Kinship::Grandparent);
        }
        let their_parents = ix.parent_ids(them);
        if their_parents
            .iter()
            .any(|&p| ix.parent_ids(p).contains(&me_id))
        {
            return Some(Kinship::Grandchild);
        }

        if let Some(spouse) = my_spouse {
            if ix.parent_ids(spouse.id.as_str()).contains(&them) {
                return Some(Kinship::ParentInLaw);
            }
            if ix.share_parent(spouse.id.as_str(), them) {
                return Some(Kinship::SiblingInLaw);
            }
        }

        for parent in ix.parents(me_id) {
            let parent_id = parent.id.as_str();
            if ix.share_parent(parent_id, them) {
                return Some(Kinship::ParentsSibling);
            }
            if ix
                .parents(them)
                .iter()
                .any(|their_parent| ix.share_parent(parent_id, their_parent.id.as_str()))
            {
                return Some(Kinship::Cousin);
            }
        }

        if their_parents
            .iter()
            .any(|&p| p != me_id && ix.share_parent(me_id, p))
        {
            return Some(Kinship::SiblingsChild);
        }

        if self.reachable.contains(them) {
            return Some(Kinship::Relative);
        }
        None
    }
}

/// Person ids connected to `me` through effective parent, child or spouse links.
fn reachable_from<'a>(index: &FamilyIndex<'a>, me: &'a Person) -> HashSet<&'a str> {
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut queue: VecDeque<&'a Person> = VecDeque::new();
    seen.insert(me.id.as_str());
    queue.push_back(me);

    while let Some(current) = queue.pop_front() {
        for next in index.relatives(current.id.as_str()) {
            if seen.insert(next.id.as_str()) {
                queue.push_back(next);
            }
        }
    }
    seen
}

/// One-shot resolution over a person snapshot.
///
/// Returns the kinship term of `target_id` relative to `self_id`, `"You"`
/// when they are the same person, and `None` when either is unknown or the
/// two are not connected.
pub fn resolve_relationship(persons: &[Person], self_id: &str, target_id: &str) -> Option<String> {
    let index = FamilyIndex::new(persons);
    RelationshipResolver::new(&index, self_id)
        .label(target_id)
        .map(str::to_owned)
}
