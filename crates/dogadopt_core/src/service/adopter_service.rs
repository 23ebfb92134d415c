//! Adopter use-case service.
//!
//! Reads include the adopter's applications, without their nested dog or
//! adopter.

use super::crud::Crud;
use super::ServiceResult;
use crate::model::adopter::{Adopter, AdopterRelation};
use crate::model::EntityId;
use crate::repo::Repository;

const ADOPTER_INCLUDES: &[AdopterRelation] = &[AdopterRelation::Applications];

pub struct AdopterService<R: Repository<Adopter>> {
    crud: Crud<Adopter, R>,
}

impl<R: Repository<Adopter>> AdopterService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            crud: Crud::new(repo, ADOPTER_INCLUDES),
        }
    }

    pub fn get_all(&self) -> ServiceResult<Vec<Adopter>> {
        self.crud.get_all()
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<Option<Adopter>> {
        self.crud.get_by_id(id)
    }

    pub fn add(&self, adopter: Adopter) -> ServiceResult<Adopter> {
        self.crud.add(adopter)
    }

    pub fn update(&self, adopter: Adopter) -> ServiceResult<Adopter> {
        self.crud.update(adopter)
    }

    pub fn delete_by_id(&self, id: EntityId) -> ServiceResult<Adopter> {
        self.crud.delete_by_id(id)
    }

    pub fn insert_many(&self, adopters: Vec<Adopter>) -> ServiceResult<Vec<Adopter>> {
        self.crud.insert_many(adopters)
    }
}
