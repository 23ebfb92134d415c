//! Shelter domain model: dogs, breeds, adopters and adoption applications.
//!
//! # Responsibility
//! - Define the four record kinds handled by the generic repository.
//! - Describe, per kind, which relations can be eagerly loaded.
//!
//! # Invariants
//! - Every record is identified by a stable `EntityId` that is never reused.
//! - Relations are linked by foreign identifiers; the populated relation
//!   fields are filled only when a query explicitly includes them.
//! - Status fields are free-form strings; only `Sex` is a closed set.

pub mod adopter;
pub mod application;
pub mod breed;
pub mod dog;
pub mod id;

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

pub use id::EntityId;

/// The four record kinds known to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Dog,
    Breed,
    Adopter,
    AdoptionApplication,
}

impl EntityKind {
    /// Stable lowercase label used in error messages and log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dog => "dog",
            Self::Breed => "breed",
            Self::Adopter => "adopter",
            Self::AdoptionApplication => "adoption_application",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability shared by every record the generic repository can store.
///
/// # Invariants
/// - `id()` never changes once the record has been persisted.
/// - `revision()` is the optimistic-concurrency token last observed by the
///   caller; only the repository advances it.
pub trait Entity: Clone + 'static {
    /// Relations that a query may ask to eagerly materialize.
    type Relation: Copy + Eq + Debug + 'static;

    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    /// Replaces the identity. Used by services when the caller left it unset.
    fn assign_id(&mut self, id: EntityId);

    fn revision(&self) -> u32;

    fn set_revision(&mut self, revision: u32);

    /// Empties every populated relation field.
    fn clear_relations(&mut self);

    /// Checks field-level invariants before the record is written.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Field-level rule violated by a record about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace only.
    BlankField {
        entity: EntityKind,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankField { entity, field } => {
                write!(f, "{entity}.{field} must not be blank")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { entity, field });
    }
    Ok(())
}
