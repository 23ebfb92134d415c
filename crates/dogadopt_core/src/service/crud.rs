//! CRUD flow shared by the per-entity services.
//!
//! # Invariants
//! - Reads always include the relations pinned at construction.
//! - `delete_by_id` and conflict resolution look the record up with a plain
//!   `get`; an absent result means "does not exist".
//! - A stale update is re-checked once: absent -> `NotFound`, present ->
//!   `Concurrency`. It is never retried or forced.

use super::{ServiceError, ServiceResult};
use crate::model::{Entity, EntityId};
use crate::repo::{Query, RepoError, Repository};
use std::marker::PhantomData;

pub(crate) struct Crud<T: Entity, R> {
    repo: R,
    includes: &'static [T::Relation],
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, R: Repository<T>> Crud<T, R> {
    pub(crate) fn new(repo: R, includes: &'static [T::Relation]) -> Self {
        Self {
            repo,
            includes,
            _entity: PhantomData,
        }
    }

    pub(crate) fn get_all(&self) -> ServiceResult<Vec<T>> {
        let query = Query::new().include_all(self.includes);
        Ok(self.repo.get_all(&query)?.collect())
    }

    pub(crate) fn get_by_id(&self, id: EntityId) -> ServiceResult<Option<T>> {
        let query = Query::by_id(id).include_all(self.includes);
        Ok(self.repo.get(&query)?)
    }

    /// Plain lookup without pinned relations.
    pub(crate) fn find(&self, id: EntityId) -> ServiceResult<Option<T>> {
        Ok(self.repo.get(&Query::by_id(id))?)
    }

    pub(crate) fn add(&self, mut entity: T) -> ServiceResult<T> {
        ensure_identity(&mut entity);
        Ok(self.repo.insert(entity)?)
    }

    pub(crate) fn insert_many(&self, mut entities: Vec<T>) -> ServiceResult<Vec<T>> {
        entities.iter_mut().for_each(ensure_identity);
        Ok(self.repo.insert_many(entities)?)
    }

    pub(crate) fn update(&self, entity: T) -> ServiceResult<T> {
        let id = entity.id();
        match self.repo.update(entity) {
            Ok(stored) => Ok(stored),
            Err(RepoError::Concurrency { entity, id: _ }) if !self.exists(id)? => {
                Err(ServiceError::NotFound { entity, id })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) fn delete_by_id(&self, id: EntityId) -> ServiceResult<T> {
        let entity = self.find(id)?.ok_or(ServiceError::NotFound {
            entity: T::KIND,
            id,
        })?;
        Ok(self.repo.delete(entity)?)
    }

    fn exists(&self, id: EntityId) -> ServiceResult<bool> {
        let query = Query::<T>::by_id(id).select(|_| ());
        Ok(self.repo.get(&query)?.is_some())
    }
}

fn ensure_identity<T: Entity>(entity: &mut T) {
    if entity.id().is_unset() {
        entity.assign_id(EntityId::new());
    }
}
