//! Adoption application use-case service.
//!
//! # Responsibility
//! - CRUD entry points for applications, returning both the dog and the
//!   adopter each application links.
//!
//! # Invariants
//! - `dog_id` and `adopter_id` must reference stored records; storage rejects
//!   dangling references as a persistence failure.

use super::crud::Crud;
use super::ServiceResult;
use crate::model::application::{AdoptionApplication, ApplicationRelation};
use crate::model::EntityId;
use crate::repo::Repository;

const APPLICATION_INCLUDES: &[ApplicationRelation] =
    &[ApplicationRelation::Dog, ApplicationRelation::Adopter];

/// Use-case service wrapper for adoption applications.
pub struct AdoptionApplicationService<R: Repository<AdoptionApplication>> {
    crud: Crud<AdoptionApplication, R>,
}

impl<R: Repository<AdoptionApplication>> AdoptionApplicationService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            crud: Crud::new(repo, APPLICATION_INCLUDES),
        }
    }

    pub fn get_all(&self) -> ServiceResult<Vec<AdoptionApplication>> {
        self.crud.get_all()
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<Option<AdoptionApplication>> {
        self.crud.get_by_id(id)
    }

    pub fn add(&self, application: AdoptionApplication) -> ServiceResult<AdoptionApplication> {
        self.crud.add(application)
    }

    pub fn update(&self, application: AdoptionApplication) -> ServiceResult<AdoptionApplication> {
        self.crud.update(application)
    }

    pub fn delete_by_id(&self, id: EntityId) -> ServiceResult<AdoptionApplication> {
        self.crud.delete_by_id(id)
    }

    pub fn insert_many(
        &self,
        applications: Vec<AdoptionApplication>,
    ) -> ServiceResult<Vec<AdoptionApplication>> {
        self.crud.insert_many(applications)
    }
}
