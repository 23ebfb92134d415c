//! Dog use-case service.
//!
//! # Responsibility
//! - CRUD entry points for dogs, always returning the dog's breed.
//! - The one domain transition of the core: marking a dog adopted.
//!
//! # Invariants
//! - `mark_as_adopted` overwrites any prior status, including `Adopted`.

use super::crud::Crud;
use super::{ServiceError, ServiceResult};
use crate::model::dog::{Dog, DogRelation, DOG_STATUS_ADOPTED};
use crate::model::{Entity, EntityId};
use crate::repo::Repository;

const DOG_INCLUDES: &[DogRelation] = &[DogRelation::Breed];

/// Use-case service wrapper for dog CRUD operations.
pub struct DogService<R: Repository<Dog>> {
    crud: Crud<Dog, R>,
}

impl<R: Repository<Dog>> DogService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            crud: Crud::new(repo, DOG_INCLUDES),
        }
    }

    /// Lists every dog with `breed` populated, in storage order.
    pub fn get_all(&self) -> ServiceResult<Vec<Dog>> {
        self.crud.get_all()
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<Option<Dog>> {
        self.crud.get_by_id(id)
    }

    /// Persists a new dog, assigning identity when unset.
    pub fn add(&self, dog: Dog) -> ServiceResult<Dog> {
        self.crud.add(dog)
    }

    /// Replaces the stored dog as a whole.
    ///
    /// # Errors
    /// - `NotFound` when the dog no longer exists.
    /// - `Concurrency` when it exists but `dog.revision` is stale.
    pub fn update(&self, dog: Dog) -> ServiceResult<Dog> {
        self.crud.update(dog)
    }

    pub fn delete_by_id(&self, id: EntityId) -> ServiceResult<Dog> {
        self.crud.delete_by_id(id)
    }

    pub fn insert_many(&self, dogs: Vec<Dog>) -> ServiceResult<Vec<Dog>> {
        self.crud.insert_many(dogs)
    }

    /// Sets status to `Adopted` and stores the dog.
    ///
    /// # Contract
    /// - No guard on the current status; repeated calls succeed.
    /// - Returns the stored dog with its advanced revision.
    pub fn mark_as_adopted(&self, id: EntityId) -> ServiceResult<Dog> {
        let mut dog = self.crud.find(id)?.ok_or(ServiceError::NotFound {
            entity: Dog::KIND,
            id,
        })?;
        dog.status = DOG_STATUS_ADOPTED.to_string();
        self.crud.update(dog)
    }
}
