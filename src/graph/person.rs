//! Person record and related identifiers.
//!
//! A person is a vertex in the family graph. Each person has:
//! - An opaque unique identifier assigned by the external store
//! - Display names, gender and optional ISO dates
//! - Best-effort links: parents, children and at most one spouse
//!
//! Links are not guaranteed to be symmetric or to resolve. Every consumer
//! dereferences them through [`FamilyIndex`](super::FamilyIndex), which
//! ignores dangling ids.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque person identifier.
///
/// Ordered lexicographically; the ordering is used for deterministic
/// tie-breaks and for sorted-pair couple keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
    /// Create a new PersonId from anything string-like.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw string value.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PersonId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Gender, used for kinship-term gendering and couple ordering tie-breaks.
///
/// Unknown or missing values from the store deserialize as `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::trim) {
            Some(g) if g.eq_ignore_ascii_case("male") => Gender::Male,
            Some(g) if g.eq_ignore_ascii_case("female") => Gender::Female,
            _ => Gender::Other,
        })
    }
}

/// A person document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub id: PersonId,
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub marriage_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub parents: Vec<PersonId>,
    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<PersonId>,
    pub spouse: Option<PersonId>,
}

/// Store documents sometimes carry `null` where an empty string or list is meant.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Person {
    /// Create a person with the given id and no links.
    pub fn new(id: impl Into<PersonId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, first: &str, last: &str) -> Self {
        self.first_name = first.to_owned();
        self.last_name = last.to_owned();
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_parents<I, T>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PersonId>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PersonId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_spouse(mut self, spouse: impl Into<PersonId>) -> Self {
        self.spouse = Some(spouse.into());
        self
    }

    pub fn with_birth_date(mut self, date: &str) -> Self {
        self.birth_date = Some(date.to_owned());
        self
    }

    pub fn with_death_date(mut self, date: &str) -> Self {
        self.death_date = Some(date.to_owned());
        self
    }

    /// Trimmed "first last", possibly empty.
    pub fn full_name(&self) -> String {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{first} {last}"),
            (false, true) => first.to_owned(),
            (true, false) => last.to_owned(),
            (true, true) => String::new(),
        }
    }

    /// Name suitable for display; `"Unknown"` when no name is recorded.
    pub fn display_name(&self) -> String {
        let name = self.full_name();
        if name.is_empty() {
            "Unknown".to_owned()
        } else {
            name
        }
    }
}
