//! Client repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use clientdesk_core::{ClientId, FindPaginatedParams, PaginatedResult};

use super::addresses::AddressMapper;
use super::query::quote_ident;
use super::table::{PgTable, SqlSeparated, TableMapper};
use super::RepositoryResult;
use crate::models::{Address, Client};
use crate::repository::{ClientRepository, PaginatedRepository, Repository};

// =============================================================================
// Row Type & Mapper
// =============================================================================

/// Storage row for the `clients` table. The address relation lives in its
/// own table and is attached lazily, so it has no column here.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ClientRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) struct ClientMapper;

impl TableMapper for ClientMapper {
    type Entity = Client;
    type Row = ClientRow;

    fn table() -> &'static str {
        "clients"
    }

    fn insert_columns() -> &'static [&'static str] {
        &["id", "name", "email", "phone", "created_at", "updated_at"]
    }

    fn entity_id(entity: &Self::Entity) -> Uuid {
        entity.id.as_uuid()
    }

    fn to_row(entity: &Self::Entity) -> Self::Row {
        ClientRow {
            id: entity.id.as_uuid(),
            name: entity.name.clone(),
            email: entity.email.clone(),
            phone: entity.phone.clone(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    fn to_entity(row: Self::Row) -> Self::Entity {
        Client {
            id: ClientId::new(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            addresses: None,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn push_insert_values(row: &Self::Row, values: &mut SqlSeparated<'_, '_>) {
        values.push_bind(row.id);
        values.push_bind(row.name.clone());
        values.push_bind(row.email.clone());
        values.push_bind(row.phone.clone());
        values.push_bind(row.created_at);
        values.push_bind(row.updated_at);
    }

    fn push_update_assignments(row: &Self::Row, assignments: &mut SqlSeparated<'_, '_>) {
        assignments
            .push("name = ")
            .push_bind_unseparated(row.name.clone());
        assignments
            .push("email = ")
            .push_bind_unseparated(row.email.clone());
        assignments
            .push("phone = ")
            .push_bind_unseparated(row.phone.clone());
    }
}

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` repository for clients.
#[derive(Clone)]
pub struct PgClientRepository {
    table: PgTable<ClientMapper>,
}

impl PgClientRepository {
    /// Create a new client repository over a shared pool handle.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            table: PgTable::new(pool),
        }
    }

    fn find_one_sql(column: &str) -> String {
        format!(
            "SELECT * FROM {} WHERE {} = $1",
            quote_ident(ClientMapper::table()),
            quote_ident(column)
        )
    }

    async fn find_one_by(&self, column: &str, value: &str) -> RepositoryResult<Option<Client>> {
        let sql = Self::find_one_sql(column);
        let row = sqlx::query_as::<Postgres, ClientRow>(&sql)
            .bind(value)
            .fetch_optional(self.table.pool())
            .await?;
        Ok(row.map(ClientMapper::to_entity))
    }
}

impl Repository<Client> for PgClientRepository {
    type Id = ClientId;

    async fn create(&self, entity: &Client) -> RepositoryResult<Client> {
        self.table.create(entity).await
    }

    async fn create_many(&self, entities: &[Client]) -> RepositoryResult<()> {
        self.table.create_many(entities).await
    }

    async fn find_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>> {
        self.table.find_by_id(id.as_uuid()).await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Client>> {
        self.table.find_all().await
    }

    async fn update(&self, entity: &Client) -> RepositoryResult<Client> {
        self.table.update(entity).await
    }

    async fn delete(&self, id: ClientId) -> RepositoryResult<()> {
        self.table.delete(id.as_uuid()).await
    }
}

impl PaginatedRepository<Client> for PgClientRepository {
    async fn find_paginated(
        &self,
        params: &FindPaginatedParams,
    ) -> RepositoryResult<PaginatedResult<Client>> {
        self.table.find_paginated(params).await
    }
}

impl ClientRepository for PgClientRepository {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Client>> {
        self.find_one_by("email", email).await
    }

    async fn find_by_phone(&self, phone: &str) -> RepositoryResult<Option<Client>> {
        self.find_one_by("phone", phone).await
    }

    async fn create_with_addresses(
        &self,
        client: &Client,
        addresses: &[Address],
    ) -> RepositoryResult<Client> {
        let mut tx = self.table.pool().begin().await?;
        let client_row = PgTable::<ClientMapper>::insert_one(&mut *tx, client).await?;
        let address_rows =
            PgTable::<AddressMapper>::insert_all_returning(&mut *tx, addresses).await?;
        tx.commit().await?;

        tracing::debug!(client_id = %client.id, addresses = address_rows.len(), "client created");

        let mut created = ClientMapper::to_entity(client_row);
        created.addresses = Some(
            address_rows
                .into_iter()
                .map(AddressMapper::to_entity)
                .collect(),
        );
        Ok(created)
    }

    async fn update_with_addresses(
        &self,
        client: &Client,
        replacement: &[Address],
    ) -> RepositoryResult<Client> {
        let mut tx = self.table.pool().begin().await?;
        sqlx::query("DELETE FROM addresses WHERE client_id = $1")
            .bind(client.id.as_uuid())
            .execute(&mut *tx)
            .await?;
        let address_rows =
            PgTable::<AddressMapper>::insert_all_returning(&mut *tx, replacement).await?;
        let client_row = PgTable::<ClientMapper>::update_one(&mut *tx, client).await?;
        tx.commit().await?;

        tracing::debug!(client_id = %client.id, addresses = address_rows.len(), "client addresses replaced");

        let mut updated = ClientMapper::to_entity(client_row);
        updated.addresses = Some(
            address_rows
                .into_iter()
                .map(AddressMapper::to_entity)
                .collect(),
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_round_trip_preserves_every_field() {
        let client = Client::new("Ann", "ann@example.com", "+351900000001");
        let round_tripped = ClientMapper::to_entity(ClientMapper::to_row(&client));
        assert_eq!(round_tripped, client);
        // The relation is not a column, so it comes back unloaded.
        assert!(round_tripped.addresses.is_none());
    }

    #[test]
    fn test_finder_sql_quotes_the_column() {
        assert_eq!(
            PgClientRepository::find_one_sql("email"),
            "SELECT * FROM \"clients\" WHERE \"email\" = $1"
        );
        assert_eq!(
            PgClientRepository::find_one_sql("phone"),
            "SELECT * FROM \"clients\" WHERE \"phone\" = $1"
        );
    }
}
