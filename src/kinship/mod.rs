//! Kinship labelling relative to a fixed "self" person.
//!
//! The resolver walks effective parent, child and spouse links (see
//! [`FamilyIndex`](crate::graph::FamilyIndex)) through a strict priority
//! chain and produces a [`Kinship`], which is rendered as a gendered term.

mod resolver;

pub use resolver::{RelationshipResolver, resolve_relationship};

use crate::graph::Gender;

/// A kinship relation of a target person to self.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kinship {
    /// The target is self.
    You,
    Parent,
    Child,
    Spouse,
    Sibling,
    Grandparent,
    Grandchild,
    ParentInLaw,
    SiblingInLaw,
    /// Aunt or uncle.
    ParentsSibling,
    Cousin,
    /// Niece or nephew.
    SiblingsChild,
    /// Connected, but not by any of the relations above.
    Relative,
}

impl Kinship {
    /// Display term for a target of the given gender.
    pub fn term(self, gender: Gender) -> &'static str {
        use Gender::{Female, Male, Other};
        match (self, gender) {
            (Kinship::You, _) => "You",
            (Kinship::Parent, Male) => "Father",
            (Kinship::Parent, Female) => "Mother",
            (Kinship::Parent, Other) => "Parent",
            (Kinship::Child, Male) => "Son",
            (Kinship::Child, Female) => "Daughter",
            (Kinship::Child, Other) => "Child",
            (Kinship::Spouse, Male) => "Husband",
            (Kinship::Spouse, Female) => "Wife",
            (Kinship::Spouse, Other) => "Spouse",
            (Kinship::Sibling, Male) => "Brother",
            (Kinship::Sibling, Female) => "Sister",
            (Kinship::Sibling, Other) => "Sibling",
            (Kinship::Grandparent, Male) => "Grandfather",
            (Kinship::Grandparent, Female) => "Grandmother",
            (Kinship::Grandparent, Other) => "Grandparent",
            (Kinship::Grandchild, Male) => "Grandson",
            (Kinship::Grandchild, Female) => "Granddaughter",
            (Kinship::Grandchild, Other) => "Grandchild",
            (Kinship::ParentInLaw, Male) => "Father-in-law",
            (Kinship::ParentInLaw, Female) => "Mother-in-law",
            (Kinship::ParentInLaw, Other) => "Parent-in-law",
            (Kinship::SiblingInLaw, Male) => "Brother-in-law",
            (Kinship::SiblingInLaw, Female) => "Sister-in-law",
            (Kinship::SiblingInLaw, Other) => "Sibling-in-law",
            (Kinship::ParentsSibling, Male) => "Uncle",
            (Kinship::ParentsSibling, Female) => "Aunt",
            (Kinship::ParentsSibling, Other) => "Parent's sibling",
            (Kinship::Cousin, _) => "Cousin",
            (Kinship::SiblingsChild, Male) => "Nephew",
            (Kinship::SiblingsChild, Female) => "Niece",
            (Kinship::SiblingsChild, Other) => "Sibling's child",
            (Kinship::Relative, _) => "Relative",
        }
    }
}
