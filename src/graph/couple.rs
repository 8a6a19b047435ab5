//! Couple record.
//!
//! A couple is an explicit union document, distinct from the looser `spouse`
//! pointer on a person. When present it is authoritative for:
//! - Which two persons form a family unit
//! - Which children are attributed to the union (`children_ids`)

use serde::{Deserialize, Serialize};

use super::person::{PersonId, null_as_default};

/// An explicit union between two persons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Couple {
    pub id: String,
    pub husband_id: PersonId,
    pub wife_id: PersonId,
    pub marriage_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub children_ids: Vec<PersonId>,
}

impl Couple {
    /// Create a couple record with no children and no marriage date.
    pub fn new(id: &str, husband: impl Into<PersonId>, wife: impl Into<PersonId>) -> Self {
        Self {
            id: id.to_owned(),
            husband_id: husband.into(),
            wife_id: wife.into(),
            ..Default::default()
        }
    }

    pub fn with_children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PersonId>,
    {
        self.children_ids = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_marriage_date(mut self, date: &str) -> Self {
        self.marriage_date = Some(date.to_owned());
        self
    }

    /// Both member ids, sorted. Used for order-independent identity.
    #[inline]
    pub fn sorted_members(&self) -> (&PersonId, &PersonId) {
        if self.husband_id <= self.wife_id {
            (&self.husband_id, &self.wife_id)
        } else {
            (&self.wife_id, &self.husband_id)
        }
    }

    /// Whether `id` is one of the two members.
    #[inline]
    pub fn involves(&self, id: &PersonId) -> bool {
        &self.husband_id == id || &self.wife_id == id
    }
}
