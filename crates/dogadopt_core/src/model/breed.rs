//! Breed record.

use super::dog::Dog;
use super::{require_text, Entity, EntityId, EntityKind, ValidationError};
use serde::{Deserialize, Serialize};

/// Relations of a breed that a query can include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreedRelation {
    Dogs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breed {
    pub id: EntityId,
    pub name: String,
    pub revision: u32,
    /// Back-reference, populated only when `BreedRelation::Dogs` is included.
    pub dogs: Vec<Dog>,
}

impl Breed {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(EntityId::UNSET, name)
    }

    pub fn with_id(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            revision: 0,
            dogs: Vec::new(),
        }
    }
}

impl Entity for Breed {
    type Relation = BreedRelation;

    const KIND: EntityKind = EntityKind::Breed;

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
        self.dogs.clear();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "name", &self.name)
    }
}
