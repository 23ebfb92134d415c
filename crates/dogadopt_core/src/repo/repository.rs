//! Generic repository contract and its SQLite implementation.
//!
//! # Responsibility
//! - Provide uniform create/read/update/delete for every entity kind.
//! - Execute `Query` specifications against storage.
//!
//! # Invariants
//! - Every call is its own unit of work: writes commit before returning and
//!   no transaction spans two calls.
//! - Write paths call `Entity::validate()` before any SQL mutation.
//! - `update` is optimistic: a stale `revision` yields `Concurrency`, never a
//!   silent overwrite.
//! - Deleting an absent record is reported as `NotFound`, not ignored.
//! - Write results carry stored columns only; relation fields come back
//!   empty.

use super::query::{Projected, Query};
use super::records::{fetch, key_values, SqlRecord};
use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::{Entity, EntityId, EntityKind, ValidationError};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository-level failure.
#[derive(Debug)]
pub enum RepoError {
    /// The record broke a field rule; nothing was written.
    Validation(ValidationError),
    /// Storage rejected or failed the operation (constraint, I/O, ...).
    Persistence(DbError),
    /// The record changed or disappeared since the caller read it.
    Concurrency { entity: EntityKind, id: EntityId },
    /// No stored record has this identity.
    NotFound { entity: EntityKind, id: EntityId },
    /// Persisted data cannot be decoded into a valid record.
    InvalidData(String),
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "persistence failure: {err}"),
            Self::Concurrency { entity, id } => {
                write!(f, "{entity} {id} was modified or removed since it was read")
            }
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Persistence(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(DbError::Sqlite(value))
    }
}

/// Storage port used by the services, generic over one entity kind.
pub trait Repository<T: Entity> {
    /// Persists one new record and returns it.
    fn insert(&self, entity: T) -> RepoResult<T>;

    /// Persists a batch atomically: every record commits or none does.
    fn insert_many(&self, entities: Vec<T>) -> RepoResult<Vec<T>>;

    /// Replaces the stored record with the same identity.
    ///
    /// Returns the record with its advanced revision.
    fn update(&self, entity: T) -> RepoResult<T>;

    /// Removes the stored record with the same identity.
    fn delete(&self, entity: T) -> RepoResult<T>;

    /// First match of `query` under its ordering, or `None`.
    fn get<P>(&self, query: &Query<'_, T, P>) -> RepoResult<Option<P>>;

    /// Every match of `query`, projected lazily.
    fn get_all<'q, 'a, P>(&self, query: &'q Query<'a, T, P>)
        -> RepoResult<Projected<'q, 'a, T, P>>;
}

impl<T: Entity, R: Repository<T>> Repository<T> for &R {
    fn insert(&self, entity: T) -> RepoResult<T> {
        (**self).insert(entity)
    }

    fn insert_many(&self, entities: Vec<T>) -> RepoResult<Vec<T>> {
        (**self).insert_many(entities)
    }

    fn update(&self, entity: T) -> RepoResult<T> {
        (**self).update(entity)
    }

    fn delete(&self, entity: T) -> RepoResult<T> {
        (**self).delete(entity)
    }

    fn get<P>(&self, query: &Query<'_, T, P>) -> RepoResult<Option<P>> {
        (**self).get(query)
    }

    fn get_all<'q, 'a, P>(
        &self,
        query: &'q Query<'a, T, P>,
    ) -> RepoResult<Projected<'q, 'a, T, P>> {
        (**self).get_all(query)
    }
}

/// SQLite-backed generic repository.
///
/// Borrows the connection; several repositories (one per entity kind) can
/// share one connection.
pub struct SqliteRepository<'conn, T> {
    conn: &'conn Connection,
    _entity: PhantomData<fn() -> T>,
}

impl<'conn, T: SqlRecord> SqliteRepository<'conn, T> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable` when the entity table does not exist.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, T::TABLE)?;
        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }

    fn insert_sql() -> String {
        let placeholders = (1..=T::COLUMNS.len() + 2)
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} (uuid, revision, {}) VALUES ({placeholders});",
            T::TABLE,
            T::COLUMNS.join(", ")
        )
    }

    fn update_sql() -> String {
        let assignments = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let key_index = T::COLUMNS.len() + 1;
        format!(
            "UPDATE {} SET {assignments}, revision = revision + 1 WHERE uuid = ?{key_index} AND revision = ?{};",
            T::TABLE,
            key_index + 1
        )
    }

    /// Filter, include and order in one read transaction so relation loads
    /// see the same snapshot as the base rows.
    fn evaluate<P>(&self, query: &Query<'_, T, P>) -> RepoResult<Vec<T>> {
        let tx = self.conn.unchecked_transaction()?;
        let key = query.key().map(|id| [id]);
        let rows = fetch::<T>(&tx, key.as_ref().map(|ids| ("uuid", &ids[..])))?;
        let evaluated = query.evaluate(rows, |records, relation| {
            T::load_relation(&tx, records, relation)
        })?;
        tx.commit()?;
        Ok(evaluated)
    }
}

impl<T: SqlRecord> Repository<T> for SqliteRepository<'_, T> {
    fn insert(&self, mut entity: T) -> RepoResult<T> {
        entity.validate()?;
        self.conn.execute(
            &Self::insert_sql(),
            params_from_iter(key_values(&entity).into_iter().chain(entity.values())),
        )?;
        entity.clear_relations();
        Ok(entity)
    }

    fn insert_many(&self, mut entities: Vec<T>) -> RepoResult<Vec<T>> {
        for entity in &entities {
            entity.validate()?;
        }
        if entities.is_empty() {
            return Ok(entities);
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&Self::insert_sql())?;
            for entity in &entities {
                stmt.execute(params_from_iter(
                    key_values(entity).into_iter().chain(entity.values()),
                ))?;
            }
        }
        tx.commit()?;
        entities.iter_mut().for_each(Entity::clear_relations);
        Ok(entities)
    }

    fn update(&self, mut entity: T) -> RepoResult<T> {
        entity.validate()?;
        let next_revision = entity.revision().checked_add(1).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "{} {} revision is exhausted",
                T::KIND,
                entity.id()
            ))
        })?;
        let [id_value, revision_value] = key_values(&entity);
        let changed = self.conn.execute(
            &Self::update_sql(),
            params_from_iter(entity.values().into_iter().chain([id_value, revision_value])),
        )?;

        if changed == 0 {
            return Err(RepoError::Concurrency {
                entity: T::KIND,
                id: entity.id(),
            });
        }

        entity.set_revision(next_revision);
        entity.clear_relations();
        Ok(entity)
    }

    fn delete(&self, mut entity: T) -> RepoResult<T> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE uuid = ?1;", T::TABLE),
            [entity.id().to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: T::KIND,
                id: entity.id(),
            });
        }

        entity.clear_relations();
        Ok(entity)
    }

    fn get<P>(&self, query: &Query<'_, T, P>) -> RepoResult<Option<P>> {
        Ok(self
            .evaluate(query)?
            .into_iter()
            .next()
            .map(|entity| query.project(entity)))
    }

    fn get_all<'q, 'a, P>(
        &self,
        query: &'q Query<'a, T, P>,
    ) -> RepoResult<Projected<'q, 'a, T, P>> {
        let entities = self.evaluate(query)?;
        Ok(query.project_all(entities))
    }
}

fn ensure_connection_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |_| Ok(()),
        )
        .optional()?;
    if exists.is_none() {
        return Err(RepoError::MissingRequiredTable(table));
    }

    Ok(())
}
