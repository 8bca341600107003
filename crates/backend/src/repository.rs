//! Repository trait contracts.
//!
//! Use-cases are generic over these traits, so they can run against the
//! Postgres implementations in [`crate::db`] or against in-memory
//! doubles in tests. The async methods leak auto-trait details into the
//! signatures, which is fine here because callers bind the concrete type
//! at compile time rather than going through `dyn`.

#![allow(async_fn_in_trait)]

use clientdesk_core::{ClientId, FindPaginatedParams, PaginatedResult};

use crate::db::RepositoryResult;
use crate::models::{Address, Client};

/// The generic CRUD contract every entity repository satisfies.
pub trait Repository<T> {
    /// The typed id for this entity.
    type Id: Copy + Send;

    /// Insert one entity, returning it rehydrated from storage.
    async fn create(&self, entity: &T) -> RepositoryResult<T>;

    /// Bulk insert, no per-row feedback; empty input is a no-op.
    async fn create_many(&self, entities: &[T]) -> RepositoryResult<()>;

    /// Fetch by id; absence is `Ok(None)`.
    async fn find_by_id(&self, id: Self::Id) -> RepositoryResult<Option<T>>;

    /// Fetch everything.
    async fn find_all(&self) -> RepositoryResult<Vec<T>>;

    /// Update by id; `updated_at` is stamped server-side.
    async fn update(&self, entity: &T) -> RepositoryResult<T>;

    /// Delete by id; idempotent.
    async fn delete(&self, id: Self::Id) -> RepositoryResult<()>;
}

/// CRUD plus the dynamic paginated query.
pub trait PaginatedRepository<T>: Repository<T> {
    /// Apply filters, sort, count the filtered predicate, then fetch the
    /// requested page.
    async fn find_paginated(
        &self,
        params: &FindPaginatedParams,
    ) -> RepositoryResult<PaginatedResult<T>>;
}

/// Client storage, including the transactional client+address writes.
pub trait ClientRepository: PaginatedRepository<Client, Id = ClientId> {
    /// Find the client owning this email, if any.
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Client>>;

    /// Find the client owning this phone number, if any.
    async fn find_by_phone(&self, phone: &str) -> RepositoryResult<Option<Client>>;

    /// Insert a client together with its addresses in one transaction.
    /// Returns the client with the stored addresses attached.
    async fn create_with_addresses(
        &self,
        client: &Client,
        addresses: &[Address],
    ) -> RepositoryResult<Client>;

    /// Replace the client's address set and update the client row in one
    /// transaction: existing addresses are deleted, the replacement set
    /// inserted. Returns the client with the stored addresses attached.
    async fn update_with_addresses(
        &self,
        client: &Client,
        replacement: &[Address],
    ) -> RepositoryResult<Client>;
}

/// Address storage.
pub trait AddressRepository: PaginatedRepository<Address> {
    /// Addresses whose zip code is in `zip_codes`.
    async fn find_by_zip_codes(&self, zip_codes: &[String]) -> RepositoryResult<Vec<Address>>;

    /// Addresses owned by this client.
    async fn find_by_client_id(&self, client_id: ClientId) -> RepositoryResult<Vec<Address>>;

    /// Remove every address owned by this client.
    async fn delete_by_client_id(&self, client_id: ClientId) -> RepositoryResult<()>;
}
