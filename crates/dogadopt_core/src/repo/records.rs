//! Row mapping between shelter entities and their SQLite tables.
//!
//! # Responsibility
//! - Describe, per entity, its table, data columns and row decoding.
//! - Materialize included relations with batched `IN (...)` queries, at
//!   most `MAX_BIND_IDS` ids per statement.
//!
//! # Invariants
//! - `uuid` and `revision` are managed by the generic repository and are not
//!   part of `COLUMNS`.
//! - Relations are loaded one level deep; nested relations stay empty.
//! - Reads reject malformed persisted values instead of masking them.

use super::repository::{RepoError, RepoResult};
use crate::model::adopter::{Adopter, AdopterRelation};
use crate::model::application::{AdoptionApplication, ApplicationRelation};
use crate::model::breed::{Breed, BreedRelation};
use crate::model::dog::{Dog, DogRelation, Sex};
use crate::model::{Entity, EntityId};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::{BTreeSet, HashMap};

/// Storage mapping for an entity kind.
pub trait SqlRecord: Entity + Sized {
    const TABLE: &'static str;

    /// Data columns in bind order, without `uuid` and `revision`.
    const COLUMNS: &'static [&'static str];

    /// Values for `COLUMNS`, in the same order.
    fn values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    /// Populates `relation` on every record in `records`.
    fn load_relation(
        conn: &Connection,
        records: &mut [Self],
        relation: Self::Relation,
    ) -> RepoResult<()>;
}

pub(crate) fn select_sql<T: SqlRecord>() -> String {
    format!(
        "SELECT uuid, revision, {} FROM {}",
        T::COLUMNS.join(", "),
        T::TABLE
    )
}

/// Upper bound on ids bound into one `IN (...)` list; keeps every
/// statement below SQLite's host parameter limit.
pub(crate) const MAX_BIND_IDS: usize = 500;

/// Reads rows of `T` in natural (insertion) order, optionally restricted to
/// `column IN (ids)`.
///
/// Restricted reads run one statement per `MAX_BIND_IDS` ids; rows keep
/// natural order within each chunk.
pub(crate) fn fetch<T: SqlRecord>(
    conn: &Connection,
    restrict: Option<(&str, &[EntityId])>,
) -> RepoResult<Vec<T>> {
    let Some((column, ids)) = restrict else {
        return fetch_where(conn, "", Vec::new());
    };

    let mut records = Vec::new();
    for chunk in ids.chunks(MAX_BIND_IDS) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        records.extend(fetch_where::<T>(
            conn,
            &format!(" WHERE {column} IN ({placeholders})"),
            chunk.iter().map(id_value).collect(),
        )?);
    }
    Ok(records)
}

fn fetch_where<T: SqlRecord>(
    conn: &Connection,
    where_clause: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<T>> {
    let sql = format!("{}{where_clause} ORDER BY rowid ASC", select_sql::<T>());
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(T::from_row(row)?);
    }
    Ok(records)
}

/// Loads the records referenced by `ids`, keyed by identity.
fn load_referenced<R: SqlRecord>(
    conn: &Connection,
    ids: impl IntoIterator<Item = EntityId>,
) -> RepoResult<HashMap<EntityId, R>> {
    let ids: Vec<EntityId> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    Ok(fetch::<R>(conn, Some(("uuid", ids.as_slice())))?
        .into_iter()
        .map(|record| (record.id(), record))
        .collect())
}

/// Loads the records whose `fk_column` points at one of `owner_ids`, grouped
/// by owner.
fn load_referencing<C: SqlRecord>(
    conn: &Connection,
    fk_column: &str,
    owner_ids: Vec<EntityId>,
    owner_of: impl Fn(&C) -> EntityId,
) -> RepoResult<HashMap<EntityId, Vec<C>>> {
    let mut grouped: HashMap<EntityId, Vec<C>> = HashMap::new();
    for child in fetch::<C>(conn, Some((fk_column, owner_ids.as_slice())))? {
        grouped.entry(owner_of(&child)).or_default().push(child);
    }
    Ok(grouped)
}

fn ids_of<T: Entity>(records: &[T]) -> Vec<EntityId> {
    records.iter().map(|record| record.id()).collect()
}

fn id_value(id: &EntityId) -> Value {
    Value::Text(id.to_string())
}

fn text_value(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_text_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text_value)
}

pub(crate) fn key_values<T: Entity>(entity: &T) -> [Value; 2] {
    [
        id_value(&entity.id()),
        Value::Integer(i64::from(entity.revision())),
    ]
}

fn read_id(row: &Row<'_>, table: &str, column: &str) -> RepoResult<EntityId> {
    let text: String = row.get(column)?;
    text.parse().map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{text}` in {table}.{column}"))
    })
}

fn read_u32(row: &Row<'_>, table: &str, column: &str) -> RepoResult<u32> {
    let value: i64 = row.get(column)?;
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!("out of range value `{value}` in {table}.{column}"))
    })
}

impl SqlRecord for Breed {
    const TABLE: &'static str = "breeds";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn values(&self) -> Vec<Value> {
        vec![text_value(&self.name)]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_id(row, Self::TABLE, "uuid")?,
            name: row.get("name")?,
            revision: read_u32(row, Self::TABLE, "revision")?,
            dogs: Vec::new(),
        })
    }

    fn load_relation(
        conn: &Connection,
        records: &mut [Self],
        relation: BreedRelation,
    ) -> RepoResult<()> {
        match relation {
            BreedRelation::Dogs => {
                let mut dogs = load_referencing::<Dog>(
                    conn,
                    "breed_id",
                    ids_of(records),
                    |dog| dog.breed_id,
                )?;
                for breed in records.iter_mut() {
                    breed.dogs = dogs.remove(&breed.id).unwrap_or_default();
                }
            }
        }
        Ok(())
    }
}

impl SqlRecord for Dog {
    const TABLE: &'static str = "dogs";
    const COLUMNS: &'static [&'static str] = &["name", "age", "sex", "breed_id", "status"];

    fn values(&self) -> Vec<Value> {
        vec![
            text_value(&self.name),
            Value::Integer(i64::from(self.age)),
            text_value(self.sex.as_str()),
            id_value(&self.breed_id),
            text_value(&self.status),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let sex_text: String = row.get("sex")?;
        let sex = Sex::parse(&sex_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid sex `{sex_text}` in dogs.sex"))
        })?;

        Ok(Self {
            id: read_id(row, Self::TABLE, "uuid")?,
            name: row.get("name")?,
            age: read_u32(row, Self::TABLE, "age")?,
            sex,
            breed_id: read_id(row, Self::TABLE, "breed_id")?,
            status: row.get("status")?,
            revision: read_u32(row, Self::TABLE, "revision")?,
            breed: None,
            applications: Vec::new(),
        })
    }

    fn load_relation(
        conn: &Connection,
        records: &mut [Self],
        relation: DogRelation,
    ) -> RepoResult<()> {
        match relation {
            DogRelation::Breed => {
                let breeds =
                    load_referenced::<Breed>(conn, records.iter().map(|dog| dog.breed_id))?;
                for dog in records.iter_mut() {
                    dog.breed = breeds.get(&dog.breed_id).cloned();
                }
            }
            DogRelation::Applications => {
                let mut applications = load_referencing::<AdoptionApplication>(
                    conn,
                    "dog_id",
                    ids_of(records),
                    |application| application.dog_id,
                )?;
                for dog in records.iter_mut() {
                    dog.applications = applications.remove(&dog.id).unwrap_or_default();
                }
            }
        }
        Ok(())
    }
}

impl SqlRecord for Adopter {
    const TABLE: &'static str = "adopters";
    const COLUMNS: &'static [&'static str] = &["full_name", "email", "phone"];

    fn values(&self) -> Vec<Value> {
        vec![
            text_value(&self.full_name),
            text_value(&self.email),
            optional_text_value(self.phone.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_id(row, Self::TABLE, "uuid")?,
            full_name: row.get("full_name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            revision: read_u32(row, Self::TABLE, "revision")?,
            applications: Vec::new(),
        })
    }

    fn load_relation(
        conn: &Connection,
        records: &mut [Self],
        relation: AdopterRelation,
    ) -> RepoResult<()> {
        match relation {
            AdopterRelation::Applications => {
                let mut applications = load_referencing::<AdoptionApplication>(
                    conn,
                    "adopter_id",
                    ids_of(records),
                    |application| application.adopter_id,
                )?;
                for adopter in records.iter_mut() {
                    adopter.applications = applications.remove(&adopter.id).unwrap_or_default();
                }
            }
        }
        Ok(())
    }
}

impl SqlRecord for AdoptionApplication {
    const TABLE: &'static str = "adoption_applications";
    const COLUMNS: &'static [&'static str] =
        &["dog_id", "adopter_id", "created_on", "status", "notes"];

    fn values(&self) -> Vec<Value> {
        vec![
            id_value(&self.dog_id),
            id_value(&self.adopter_id),
            Value::Integer(self.created_on.timestamp_millis()),
            text_value(&self.status),
            optional_text_value(self.notes.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let created_ms: i64 = row.get("created_on")?;
        let created_on = DateTime::<Utc>::from_timestamp_millis(created_ms).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{created_ms}` in adoption_applications.created_on"
            ))
        })?;

        Ok(Self {
            id: read_id(row, Self::TABLE, "uuid")?,
            dog_id: read_id(row, Self::TABLE, "dog_id")?,
            adopter_id: read_id(row, Self::TABLE, "adopter_id")?,
            created_on,
            status: row.get("status")?,
            notes: row.get("notes")?,
            revision: read_u32(row, Self::TABLE, "revision")?,
            dog: None,
            adopter: None,
        })
    }

    fn load_relation(
        conn: &Connection,
        records: &mut [Self],
        relation: ApplicationRelation,
    ) -> RepoResult<()> {
        match relation {
            ApplicationRelation::Dog => {
                let dogs = load_referenced::<Dog>(conn, records.iter().map(|app| app.dog_id))?;
                for application in records.iter_mut() {
                    application.dog = dogs.get(&application.dog_id).cloned();
                }
            }
            ApplicationRelation::Adopter => {
                let adopters =
                    load_referenced::<Adopter>(conn, records.iter().map(|app| app.adopter_id))?;
                for application in records.iter_mut() {
                    application.adopter = adopters.get(&application.adopter_id).cloned();
                }
            }
        }
        Ok(())
    }
}
