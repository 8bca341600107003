//! Generic table repository: CRUD plus paginated queries over one table.
//!
//! [`PgTable`] owns the SQL for any entity whose table shape is described
//! by a [`TableMapper`]. Per-entity repositories compose a `PgTable` with
//! their own finder queries instead of inheriting from a base class; the
//! mapper carries the row/entity conversion in both directions.

use std::marker::PhantomData;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use clientdesk_core::{FindPaginatedParams, PaginatedResult};

use super::query::{push_filters, push_sort, quote_ident};
use super::{RepositoryError, RepositoryResult};

/// Separated list builder used for insert values and update assignments.
pub type SqlSeparated<'qb, 'args> = sqlx::query_builder::Separated<'qb, 'args, Postgres, &'static str>;

/// Describes one table: its name, its columns, and the bidirectional
/// mapping between storage rows and domain entities.
pub trait TableMapper {
    /// The domain entity this table stores.
    type Entity;
    /// The storage row shape, decodable from a `SELECT *`.
    type Row: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin;

    /// Table name.
    fn table() -> &'static str;

    /// Columns written on insert, in the order the mapper binds them.
    fn insert_columns() -> &'static [&'static str];

    /// Primary key of an entity.
    fn entity_id(entity: &Self::Entity) -> Uuid;

    /// Convert an entity to its row shape.
    fn to_row(entity: &Self::Entity) -> Self::Row;

    /// Convert a row back to an entity. Relations that are not stored in
    /// this table come back unloaded.
    fn to_entity(row: Self::Row) -> Self::Entity;

    /// Bind one row's insert values, matching `insert_columns()` order.
    fn push_insert_values(row: &Self::Row, values: &mut SqlSeparated<'_, '_>);

    /// Bind the `SET` assignments for an update. The id, `created_at` and
    /// `updated_at` columns are excluded; `updated_at` is stamped by the
    /// database.
    fn push_update_assignments(row: &Self::Row, assignments: &mut SqlSeparated<'_, '_>);
}

/// Generic `PostgreSQL` repository for one table, parameterized by its
/// [`TableMapper`].
pub struct PgTable<M> {
    pool: PgPool,
    _mapper: PhantomData<M>,
}

impl<M> Clone for PgTable<M> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _mapper: PhantomData,
        }
    }
}

impl<M: TableMapper> PgTable<M> {
    /// Create a table repository over a shared pool handle.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _mapper: PhantomData,
        }
    }

    /// The underlying pool, for per-entity queries and transactions.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert one entity and return it rehydrated from the stored row, so
    /// storage-generated defaults are reflected.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a unique-constraint
    /// rejection and `RepositoryError::Database` for other failures.
    pub async fn create(&self, entity: &M::Entity) -> RepositoryResult<M::Entity> {
        let row = Self::insert_one(&self.pool, entity).await?;
        Ok(M::to_entity(row))
    }

    /// Bulk insert with no per-row feedback. An empty input is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` or `RepositoryError::Database`
    /// as for [`create`](Self::create).
    pub async fn create_many(&self, entities: &[M::Entity]) -> RepositoryResult<()> {
        Self::insert_all(&self.pool, entities).await
    }

    /// Fetch an entity by id. Absence is `Ok(None)`, never an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<M::Entity>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", quote_ident(M::table()));
        let row = sqlx::query_as::<Postgres, M::Row>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(M::to_entity))
    }

    /// Fetch every row, mapped to entities.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_all(&self) -> RepositoryResult<Vec<M::Entity>> {
        let sql = format!("SELECT * FROM {}", quote_ident(M::table()));
        let rows = sqlx::query_as::<Postgres, M::Row>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(M::to_entity).collect())
    }

    /// Update an entity by id and return the refreshed entity. The stored
    /// `updated_at` is set to the database clock; the caller's value is
    /// overwritten, not trusted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row has this id.
    pub async fn update(&self, entity: &M::Entity) -> RepositoryResult<M::Entity> {
        let row = Self::update_one(&self.pool, entity).await?;
        Ok(M::to_entity(row))
    }

    /// Delete by id. Deleting a nonexistent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", quote_ident(M::table()));
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    /// Run a paginated query: filters, then sort, then a count of the
    /// filtered predicate, then the requested page.
    ///
    /// The count and the page select are two round-trips over the same
    /// predicate with no shared snapshot; callers accept that a
    /// concurrent writer can make them diverge.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails, which
    /// includes filtering or sorting on a column the schema does not
    /// recognize.
    pub async fn find_paginated(
        &self,
        params: &FindPaginatedParams,
    ) -> RepositoryResult<PaginatedResult<M::Entity>> {
        let page = params.effective_page();
        let limit = params.effective_limit();

        let mut count_qb =
            QueryBuilder::new(format!("SELECT count(*) FROM {}", quote_ident(M::table())));
        push_filters(&mut count_qb, &params.filters);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut select_qb =
            QueryBuilder::new(format!("SELECT * FROM {}", quote_ident(M::table())));
        push_filters(&mut select_qb, &params.filters);
        if let Some(sort) = &params.sort {
            push_sort(&mut select_qb, sort);
        }
        select_qb.push(" LIMIT ").push_bind(limit);
        select_qb.push(" OFFSET ").push_bind(params.offset());

        let rows = select_qb
            .build_query_as::<M::Row>()
            .fetch_all(&self.pool)
            .await?;

        Ok(PaginatedResult {
            page,
            limit,
            total,
            data: rows.into_iter().map(M::to_entity).collect(),
        })
    }

    /// Insert one entity on the given executor and return the stored row.
    /// Used by transactional flows.
    pub(crate) async fn insert_one(
        executor: impl sqlx::PgExecutor<'_>,
        entity: &M::Entity,
    ) -> RepositoryResult<M::Row> {
        let mut qb = Self::insert_builder(std::slice::from_ref(entity));
        qb.push(" RETURNING *");
        let row = qb.build_query_as::<M::Row>().fetch_one(executor).await?;
        Ok(row)
    }

    /// Bulk insert on the given executor, returning the stored rows.
    pub(crate) async fn insert_all_returning(
        executor: impl sqlx::PgExecutor<'_>,
        entities: &[M::Entity],
    ) -> RepositoryResult<Vec<M::Row>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = Self::insert_builder(entities);
        qb.push(" RETURNING *");
        let rows = qb.build_query_as::<M::Row>().fetch_all(executor).await?;
        Ok(rows)
    }

    /// Bulk insert on the given executor with no row feedback.
    pub(crate) async fn insert_all(
        executor: impl sqlx::PgExecutor<'_>,
        entities: &[M::Entity],
    ) -> RepositoryResult<()> {
        if entities.is_empty() {
            return Ok(());
        }
        let mut qb = Self::insert_builder(entities);
        qb.build().execute(executor).await?;
        Ok(())
    }

    /// Update one entity on the given executor and return the stored row.
    pub(crate) async fn update_one(
        executor: impl sqlx::PgExecutor<'_>,
        entity: &M::Entity,
    ) -> RepositoryResult<M::Row> {
        let row = M::to_row(entity);
        let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", quote_ident(M::table())));
        let mut assignments = qb.separated(", ");
        M::push_update_assignments(&row, &mut assignments);
        assignments.push("updated_at = now()");
        qb.push(" WHERE id = ");
        qb.push_bind(M::entity_id(entity));
        qb.push(" RETURNING *");
        let updated = qb
            .build_query_as::<M::Row>()
            .fetch_optional(executor)
            .await?;
        updated.ok_or(RepositoryError::NotFound)
    }

    fn insert_builder(entities: &[M::Entity]) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("INSERT INTO {} (", quote_ident(M::table())));
        let mut columns = qb.separated(", ");
        for column in M::insert_columns() {
            columns.push(quote_ident(column));
        }
        qb.push(") ");
        let rows: Vec<M::Row> = entities.iter().map(|entity| M::to_row(entity)).collect();
        qb.push_values(rows.iter(), |mut values, row| {
            M::push_insert_values(row, &mut values);
        });
        qb
    }
}
