//! Generic data access: query specifications and the entity repository.
//!
//! # Responsibility
//! - Define one storage port (`Repository<T>`) shared by all entity kinds.
//! - Keep SQLite details (tables, row decoding, relation loading) behind it.
//!
//! # Invariants
//! - Repository APIs distinguish `NotFound`, `Concurrency` and
//!   `Persistence` failures; none of them is swallowed.
//! - The repository performs no logging.

pub mod query;
pub mod records;
pub mod repository;

pub use query::{Projected, Query};
pub use records::SqlRecord;
pub use repository::{RepoError, RepoResult, Repository, SqliteRepository};
