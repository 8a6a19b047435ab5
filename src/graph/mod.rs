//! Family graph data model.
//!
//! This module provides the person and couple documents consumed by the
//! layout engine and the kinship resolver, plus a borrowed index that
//! resolves their best-effort links, ignoring dangling ids.

mod couple;
mod index;
mod person;

pub use couple::Couple;
pub use index::FamilyIndex;
pub use person::{Gender, Person, PersonId};
