//! Dog record.
//!
//! # Invariants
//! - `name` is non-blank.
//! - `breed_id` must resolve to a stored breed; the storage engine enforces
//!   this, not the model.
//! - `status` is free-form. `DOG_STATUS_OPTIONS` lists the values offered to
//!   operators, but any string is accepted.

use super::application::AdoptionApplication;
use super::breed::Breed;
use super::{require_text, Entity, EntityId, EntityKind, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

pub const DOG_STATUS_AVAILABLE: &str = "Available";
pub const DOG_STATUS_RESERVED: &str = "Reserved";
pub const DOG_STATUS_ADOPTED: &str = "Adopted";

/// Status values offered to operators when editing a dog.
pub const DOG_STATUS_OPTIONS: [&str; 3] =
    [DOG_STATUS_AVAILABLE, DOG_STATUS_RESERVED, DOG_STATUS_ADOPTED];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    M,
    F,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::M, Sex::F];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::M => "M",
            Self::F => "F",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "M" => Some(Self::M),
            "F" => Some(Self::F),
            _ => None,
        }
    }
}

impl Display for Sex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relations of a dog that a query can include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DogRelation {
    Breed,
    Applications,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    pub id: EntityId,
    pub name: String,
    pub age: u32,
    pub sex: Sex,
    pub breed_id: EntityId,
    pub status: String,
    /// Optimistic-concurrency token, advanced by every successful update.
    pub revision: u32,
    /// Populated only when `DogRelation::Breed` is included.
    pub breed: Option<Breed>,
    /// Populated only when `DogRelation::Applications` is included.
    pub applications: Vec<AdoptionApplication>,
}

impl Dog {
    /// Creates an `Available` dog with unassigned identity.
    pub fn new(name: impl Into<String>, age: u32, sex: Sex, breed_id: EntityId) -> Self {
        Self {
            id: EntityId::UNSET,
            name: name.into(),
            age,
            sex,
            breed_id,
            status: DOG_STATUS_AVAILABLE.to_string(),
            revision: 0,
            breed: None,
            applications: Vec::new(),
        }
    }

    pub fn with_id(
        id: EntityId,
        name: impl Into<String>,
        age: u32,
        sex: Sex,
        breed_id: EntityId,
    ) -> Self {
        Self {
            id,
            ..Self::new(name, age, sex, breed_id)
        }
    }

    pub fn is_adopted(&self) -> bool {
        self.status == DOG_STATUS_ADOPTED
    }
}

impl Entity for Dog {
    type Relation = DogRelation;

    const KIND: EntityKind = EntityKind::Dog;

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
        self.breed = None;
        self.applications.clear();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "name", &self.name)
    }
}
