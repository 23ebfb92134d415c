//! Core domain logic for the dog adoption shelter.
//! This crate is the single source of truth for shelter records and their
//! persistence rules.

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, Connection, DbError, DbResult};
pub use gateway::{DogCeoGateway, DogPhoto, GatewayError, PhotoGateway};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::adopter::{Adopter, AdopterRelation};
pub use model::application::{AdoptionApplication, ApplicationRelation};
pub use model::breed::{Breed, BreedRelation};
pub use model::dog::{Dog, DogRelation, Sex, DOG_STATUS_OPTIONS};
pub use model::{Entity, EntityId, EntityKind, ValidationError};
pub use repo::{
    Projected, Query, RepoError, RepoResult, Repository, SqlRecord, SqliteRepository,
};
pub use service::adopter_service::AdopterService;
pub use service::application_service::AdoptionApplicationService;
pub use service::breed_service::BreedService;
pub use service::dog_service::DogService;
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
