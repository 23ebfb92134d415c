//! Per-entity use-case services.
//!
//! # Responsibility
//! - Give each entity kind a narrow CRUD contract on top of the generic
//!   repository.
//! - Pin the relations each kind's readers need, assign identity on create
//!   and resolve write conflicts into `NotFound` or `Concurrency`.
//!
//! # Invariants
//! - Services never bypass repository validation or persistence contracts.
//! - Services hold no state between calls and never retry.

pub mod adopter_service;
pub mod application_service;
pub mod breed_service;
mod crud;
pub mod dog_service;

use crate::model::{EntityId, EntityKind};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for entity use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// No record with this identity exists.
    NotFound { entity: EntityKind, id: EntityId },
    /// The record still exists but changed since the caller read it.
    Concurrency { entity: EntityKind, id: EntityId },
    /// Any other repository failure, propagated unchanged.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Concurrency { entity, id } => {
                write!(f, "{entity} {id} was modified since it was read")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Concurrency { entity, id } => Self::Concurrency { entity, id },
            other => Self::Repo(other),
        }
    }
}
