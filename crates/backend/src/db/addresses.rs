//! Address repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use clientdesk_core::{AddressId, ClientId, FindPaginatedParams, PaginatedResult};

use super::table::{PgTable, SqlSeparated, TableMapper};
use super::RepositoryResult;
use crate::models::Address;
use crate::repository::{AddressRepository, PaginatedRepository, Repository};

// =============================================================================
// Row Type & Mapper
// =============================================================================

/// Storage row for the `addresses` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AddressRow {
    id: Uuid,
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
    complement: Option<String>,
    client_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) struct AddressMapper;

impl TableMapper for AddressMapper {
    type Entity = Address;
    type Row = AddressRow;

    fn table() -> &'static str {
        "addresses"
    }

    fn insert_columns() -> &'static [&'static str] {
        &[
            "id",
            "street",
            "city",
            "state",
            "zip_code",
            "country",
            "complement",
            "client_id",
            "created_at",
            "updated_at",
        ]
    }

    fn entity_id(entity: &Self::Entity) -> Uuid {
        entity.id.as_uuid()
    }

    fn to_row(entity: &Self::Entity) -> Self::Row {
        AddressRow {
            id: entity.id.as_uuid(),
            street: entity.street.clone(),
            city: entity.city.clone(),
            state: entity.state.clone(),
            zip_code: entity.zip_code.clone(),
            country: entity.country.clone(),
            complement: entity.complement.clone(),
            client_id: entity.client_id.as_uuid(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    fn to_entity(row: Self::Row) -> Self::Entity {
        Address {
            id: AddressId::new(row.id),
            street: row.street,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            country: row.country,
            complement: row.complement,
            client_id: ClientId::new(row.client_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn push_insert_values(row: &Self::Row, values: &mut SqlSeparated<'_, '_>) {
        values.push_bind(row.id);
        values.push_bind(row.street.clone());
        values.push_bind(row.city.clone());
        values.push_bind(row.state.clone());
        values.push_bind(row.zip_code.clone());
        values.push_bind(row.country.clone());
        values.push_bind(row.complement.clone());
        values.push_bind(row.client_id);
        values.push_bind(row.created_at);
        values.push_bind(row.updated_at);
    }

    fn push_update_assignments(row: &Self::Row, assignments: &mut SqlSeparated<'_, '_>) {
        assignments
            .push("street = ")
            .push_bind_unseparated(row.street.clone());
        assignments
            .push("city = ")
            .push_bind_unseparated(row.city.clone());
        assignments
            .push("state = ")
            .push_bind_unseparated(row.state.clone());
        assignments
            .push("zip_code = ")
            .push_bind_unseparated(row.zip_code.clone());
        assignments
            .push("country = ")
            .push_bind_unseparated(row.country.clone());
        assignments
            .push("complement = ")
            .push_bind_unseparated(row.complement.clone());
        assignments
            .push("client_id = ")
            .push_bind_unseparated(row.client_id);
    }
}

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` repository for addresses.
#[derive(Clone)]
pub struct PgAddressRepository {
    table: PgTable<AddressMapper>,
}

impl PgAddressRepository {
    /// Create a new address repository over a shared pool handle.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            table: PgTable::new(pool),
        }
    }
}

impl Repository<Address> for PgAddressRepository {
    type Id = AddressId;

    async fn create(&self, entity: &Address) -> RepositoryResult<Address> {
        self.table.create(entity).await
    }

    async fn create_many(&self, entities: &[Address]) -> RepositoryResult<()> {
        self.table.create_many(entities).await
    }

    async fn find_by_id(&self, id: AddressId) -> RepositoryResult<Option<Address>> {
        self.table.find_by_id(id.as_uuid()).await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Address>> {
        self.table.find_all().await
    }

    async fn update(&self, entity: &Address) -> RepositoryResult<Address> {
        self.table.update(entity).await
    }

    async fn delete(&self, id: AddressId) -> RepositoryResult<()> {
        self.table.delete(id.as_uuid()).await
    }
}

impl PaginatedRepository<Address> for PgAddressRepository {
    async fn find_paginated(
        &self,
        params: &FindPaginatedParams,
    ) -> RepositoryResult<PaginatedResult<Address>> {
        self.table.find_paginated(params).await
    }
}

impl AddressRepository for PgAddressRepository {
    async fn find_by_zip_codes(&self, zip_codes: &[String]) -> RepositoryResult<Vec<Address>> {
        if zip_codes.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<Postgres, AddressRow>(
            "SELECT * FROM addresses WHERE zip_code = ANY($1)",
        )
        .bind(zip_codes.to_vec())
        .fetch_all(self.table.pool())
        .await?;
        Ok(rows.into_iter().map(AddressMapper::to_entity).collect())
    }

    async fn find_by_client_id(&self, client_id: ClientId) -> RepositoryResult<Vec<Address>> {
        let rows = sqlx::query_as::<Postgres, AddressRow>(
            "SELECT * FROM addresses WHERE client_id = $1",
        )
        .bind(client_id.as_uuid())
        .fetch_all(self.table.pool())
        .await?;
        Ok(rows.into_iter().map(AddressMapper::to_entity).collect())
    }

    async fn delete_by_client_id(&self, client_id: ClientId) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM addresses WHERE client_id = $1")
            .bind(client_id.as_uuid())
            .execute(self.table.pool())
            .await?;
        Ok(())
    }
}
