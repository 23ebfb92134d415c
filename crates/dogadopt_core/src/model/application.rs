//! Adoption application record.
//!
//! # Invariants
//! - An application always references exactly one dog and one adopter.
//! - `created_on` is stamped once by the constructor and carried unchanged
//!   through every later write.

use super::adopter::Adopter;
use super::dog::Dog;
use super::{Entity, EntityId, EntityKind, ValidationError};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub const APPLICATION_STATUS_PENDING: &str = "Pending";

/// Relations of an application that a query can include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationRelation {
    Dog,
    Adopter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionApplication {
    pub id: EntityId,
    pub dog_id: EntityId,
    pub adopter_id: EntityId,
    /// Millisecond precision, matching what storage keeps.
    pub created_on: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
    pub revision: u32,
    pub dog: Option<Dog>,
    pub adopter: Option<Adopter>,
}

impl AdoptionApplication {
    /// Creates a `Pending` application stamped with the current time.
    pub fn new(dog_id: EntityId, adopter_id: EntityId) -> Self {
        Self {
            id: EntityId::UNSET,
            dog_id,
            adopter_id,
            created_on: Utc::now().trunc_subsecs(3),
            status: APPLICATION_STATUS_PENDING.to_string(),
            notes: None,
            revision: 0,
            dog: None,
            adopter: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Entity for AdoptionApplication {
    type Relation = ApplicationRelation;

    const KIND: EntityKind = EntityKind::AdoptionApplication;

    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn revision(&self) -> u32 {
        self.revision
    }

    fn set_revision(&mut self, revision: u32) {
        self.revision = revision;
    }

    fn clear_relations(&mut self) {
        self.dog = None;
        self.adopter = None;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
