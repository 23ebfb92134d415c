//! Breed use-case service. Reads include the breed's dogs.

use super::crud::Crud;
use super::ServiceResult;
use crate::model::breed::{Breed, BreedRelation};
use crate::model::EntityId;
use crate::repo::Repository;

const BREED_INCLUDES: &[BreedRelation] = &[BreedRelation::Dogs];

pub struct BreedService<R: Repository<Breed>> {
    crud: Crud<Breed, R>,
}

impl<R: Repository<Breed>> BreedService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            crud: Crud::new(repo, BREED_INCLUDES),
        }
    }

    pub fn get_all(&self) -> ServiceResult<Vec<Breed>> {
        self.crud.get_all()
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<Option<Breed>> {
        self.crud.get_by_id(id)
    }

    pub fn add(&self, breed: Breed) -> ServiceResult<Breed> {
        self.crud.add(breed)
    }

    pub fn update(&self, breed: Breed) -> ServiceResult<Breed> {
        self.crud.update(breed)
    }

    /// Removes the breed. Storage cascades the removal to its dogs.
    pub fn delete_by_id(&self, id: EntityId) -> ServiceResult<Breed> {
        self.crud.delete_by_id(id)
    }

    pub fn insert_many(&self, breeds: Vec<Breed>) -> ServiceResult<Vec<Breed>> {
        self.crud.insert_many(breeds)
    }
}
