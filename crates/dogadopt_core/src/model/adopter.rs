//! Adopter record.

use super::application::AdoptionApplication;
use super::{require_text, Entity, EntityId, EntityKind, ValidationError};
use serde::{Deserialize, Serialize};

/// Relations of an adopter that a query can include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdopterRelation {
    Applications,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adopter {
    pub id: EntityId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub revision: u32,
    /// Populated only when `AdopterRelation::Applications` is included.
    pub applications: Vec<AdoptionApplication>,
}

impl Adopter {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: EntityId::UNSET,
            full_name: full_name.into(),
            email: email.into(),
            phone: None,
            revision: 0,
            applications: Vec::new(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

impl Entity for Adopter {
    type Relation = AdopterRelation;

    const KIND: EntityKind = EntityKind::Adopter;

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
        self.applications.clear();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "full_name", &self.full_name)?;
        require_text(Self::KIND, "email", &self.email)
    }
}
