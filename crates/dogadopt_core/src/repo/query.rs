//! Composable read specification.
//!
//! # Responsibility
//! - Describe one read against one entity kind: projection, filter, ordering
//!   and relation inclusion, each supplied independently.
//! - Own the evaluation pipeline so every repository implementation applies
//!   the parts in the same order.
//!
//! # Invariants
//! - Evaluation order is filter -> include -> order -> project. The filter
//!   always sees the full entity, never a projection.
//! - A query without filter matches every record; without ordering the
//!   storage engine's natural order is kept.
//! - `key` is only a pushdown hint for storage; the filter installed by
//!   `by_id` stays authoritative.

use crate::model::{Entity, EntityId};

type Projection<'a, T, P> = Box<dyn Fn(T) -> P + 'a>;
type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;
type Ordering<'a, T> = Box<dyn Fn(Vec<T>) -> Vec<T> + 'a>;

/// Read specification for entity kind `T`, projected to `P`.
///
/// ```
/// use dogadopt_core::{Dog, DogRelation, Query};
///
/// let names = Query::<Dog>::new()
///     .filter(|dog| dog.age < 3)
///     .include(DogRelation::Breed)
///     .order_by_key(|dog| dog.name.clone())
///     .select(|dog| dog.name);
/// # let _ = names;
/// ```
pub struct Query<'a, T: Entity, P = T> {
    select: Projection<'a, T, P>,
    filter: Option<Predicate<'a, T>>,
    order_by: Option<Ordering<'a, T>>,
    include: Vec<T::Relation>,
    key: Option<EntityId>,
}

impl<'a, T: Entity> Query<'a, T> {
    /// Matches every record and returns whole entities.
    pub fn new() -> Self {
        Self {
            select: Box::new(|entity| entity),
            filter: None,
            order_by: None,
            include: Vec::new(),
            key: None,
        }
    }

    /// Matches the single record with identity `id`.
    pub fn by_id(id: EntityId) -> Self {
        let mut query = Self::new().filter(move |entity: &T| entity.id() == id);
        query.key = Some(id);
        query
    }
}

impl<T: Entity> Default for Query<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Entity, P> Query<'a, T, P> {
    /// Replaces the projection applied to every result.
    pub fn select<Q>(self, projection: impl Fn(T) -> Q + 'a) -> Query<'a, T, Q> {
        Query {
            select: Box::new(projection),
            filter: self.filter,
            order_by: self.order_by,
            include: self.include,
            key: self.key,
        }
    }

    /// Adds a predicate. Repeated calls are combined with logical AND.
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + 'a) -> Self {
        let combined: Predicate<'a, T> = match self.filter.take() {
            Some(existing) => Box::new(move |entity: &T| existing(entity) && predicate(entity)),
            None => Box::new(predicate),
        };
        self.filter = Some(combined);
        self
    }

    /// Sets the function turning the filtered set into an ordered one.
    pub fn order_by(mut self, ordering: impl Fn(Vec<T>) -> Vec<T> + 'a) -> Self {
        self.order_by = Some(Box::new(ordering));
        self
    }

    /// Stable ascending sort on `key`.
    pub fn order_by_key<K: Ord>(self, key: impl Fn(&T) -> K + 'a) -> Self {
        self.order_by(move |mut entities: Vec<T>| {
            entities.sort_by_key(|entity| key(entity));
            entities
        })
    }

    /// Requests eager loading of `relation`. Duplicates are ignored.
    pub fn include(mut self, relation: T::Relation) -> Self {
        if !self.include.contains(&relation) {
            self.include.push(relation);
        }
        self
    }

    pub fn include_all(self, relations: &[T::Relation]) -> Self {
        relations
            .iter()
            .fold(self, |query, relation| query.include(*relation))
    }

    /// Identity the query is restricted to, when built with `by_id`.
    pub fn key(&self) -> Option<EntityId> {
        self.key
    }

    pub fn includes(&self) -> &[T::Relation] {
        &self.include
    }

    pub fn matches(&self, entity: &T) -> bool {
        self.filter.as_ref().map_or(true, |predicate| predicate(entity))
    }

    pub fn project(&self, entity: T) -> P {
        (self.select)(entity)
    }

    /// Runs filter, inclusion and ordering over raw storage rows.
    ///
    /// `load` is called once per included relation with every surviving
    /// record; it is skipped entirely when nothing matched.
    pub fn evaluate<E>(
        &self,
        rows: Vec<T>,
        mut load: impl FnMut(&mut [T], T::Relation) -> Result<(), E>,
    ) -> Result<Vec<T>, E> {
        let mut matched: Vec<T> = match &self.filter {
            Some(predicate) => rows.into_iter().filter(|row| predicate(row)).collect(),
            None => rows,
        };

        if !matched.is_empty() {
            for relation in &self.include {
                load(&mut matched, *relation)?;
            }
        }

        Ok(match &self.order_by {
            Some(ordering) => ordering(matched),
            None => matched,
        })
    }

    /// Wraps evaluated records in an iterator that projects on demand.
    pub fn project_all<'q>(&'q self, entities: Vec<T>) -> Projected<'q, 'a, T, P> {
        Projected {
            entities: entities.into_iter(),
            query: self,
        }
    }
}

/// Lazily projected result sequence returned by `Repository::get_all`.
///
/// Finite and single-pass; re-run the query to read the results again.
pub struct Projected<'q, 'a, T: Entity, P> {
    entities: std::vec::IntoIter<T>,
    query: &'q Query<'a, T, P>,
}

impl<T: Entity, P> Iterator for Projected<'_, '_, T, P> {
    type Item = P;

    fn next(&mut self) -> Option<P> {
        self.entities.next().map(|entity| self.query.project(entity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entities.size_hint()
    }
}

impl<T: Entity, P> ExactSizeIterator for Projected<'_, '_, T, P> {}
