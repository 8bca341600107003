//! Client use-cases: create, update, delete, find by id, find paginated.

use serde::{Deserialize, Serialize};

use clientdesk_core::{ClientId, FindPaginatedParams, PaginatedResult};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::{Address, Client, NewAddress};
use crate::repository::{AddressRepository, ClientRepository};

/// Input for the create-client use-case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClientInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub addresses: Vec<NewAddress>,
}

/// Input for the update-client use-case. Absent fields are left as they
/// are; a supplied non-empty address list replaces the whole set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub addresses: Option<Vec<NewAddress>>,
}

/// Client use-cases over a client and an address repository.
pub struct ClientService<C, A> {
    clients: C,
    addresses: A,
}

impl<C, A> ClientService<C, A>
where
    C: ClientRepository,
    A: AddressRepository,
{
    /// Assemble the service from its repositories.
    pub const fn new(clients: C, addresses: A) -> Self {
        Self { clients, addresses }
    }

    /// Create a client with its initial addresses.
    ///
    /// Email, phone and every supplied zip code are checked for
    /// uniqueness concurrently; any violation fails before a single
    /// write happens. The checks race against concurrent writers, so the
    /// database's unique constraints remain the backstop (surfacing as a
    /// storage conflict instead of these named errors).
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` with `EMAIL_ALREADY_EXISTS`,
    /// `PHONE_ALREADY_EXISTS` or `ZIP_CODE_ALREADY_EXISTS` on a
    /// uniqueness violation, or a repository error.
    pub async fn create(&self, input: CreateClientInput) -> AppResult<Client> {
        let zip_codes: Vec<String> = input
            .addresses
            .iter()
            .map(|address| address.zip_code.clone())
            .collect();

        let (same_email, same_phone, existing_addresses) = tokio::try_join!(
            self.clients.find_by_email(&input.email),
            self.clients.find_by_phone(&input.phone),
            self.addresses.find_by_zip_codes(&zip_codes),
        )?;

        if same_email.is_some() {
            return Err(AppError::bad_request(
                "Client with same email already exists",
                ErrorCode::EmailAlreadyExists,
            ));
        }
        if same_phone.is_some() {
            return Err(AppError::bad_request(
                "Client with same phone already exists",
                ErrorCode::PhoneAlreadyExists,
            ));
        }
        if !existing_addresses.is_empty() {
            return Err(AppError::bad_request(
                "Some addresses with same zip code already exists",
                ErrorCode::ZipCodeAlreadyExists,
            ));
        }

        let client = Client::new(input.name, input.email, input.phone);
        let addresses: Vec<Address> = input
            .addresses
            .into_iter()
            .map(|fields| Address::new(fields, client.id))
            .collect();

        let created = self.clients.create_with_addresses(&client, &addresses).await?;
        tracing::info!(client_id = %created.id, "client created");
        Ok(created)
    }

    /// Update a client's fields, optionally replacing its address set.
    ///
    /// Uniqueness re-checks exclude the client itself. A supplied
    /// non-empty address list is a destructive replace-all; a supplied
    /// empty list leaves the existing addresses untouched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when the client does not exist,
    /// `AppError::BadRequest` on a uniqueness violation, or a repository
    /// error.
    pub async fn update(&self, id: ClientId, input: UpdateClientInput) -> AppResult<Client> {
        let Some(mut client) = self.clients.find_by_id(id).await? else {
            return Err(AppError::not_found("Client not found"));
        };

        if let Some(name) = input.name {
            client.name = name;
        }

        if let Some(email) = input.email {
            if let Some(other) = self.clients.find_by_email(&email).await? {
                if other.id != client.id {
                    return Err(AppError::bad_request(
                        "Client with same email already exists",
                        ErrorCode::EmailAlreadyExists,
                    ));
                }
            }
            client.email = email;
        }

        if let Some(phone) = input.phone {
            if let Some(other) = self.clients.find_by_phone(&phone).await? {
                if other.id != client.id {
                    return Err(AppError::bad_request(
                        "Client with same phone already exists",
                        ErrorCode::PhoneAlreadyExists,
                    ));
                }
            }
            client.phone = phone;
        }

        if let Some(new_addresses) = input.addresses {
            if !new_addresses.is_empty() {
                let zip_codes: Vec<String> = new_addresses
                    .iter()
                    .map(|address| address.zip_code.clone())
                    .collect();
                let owned_elsewhere = self
                    .addresses
                    .find_by_zip_codes(&zip_codes)
                    .await?
                    .iter()
                    .any(|address| address.client_id != client.id);
                if owned_elsewhere {
                    return Err(AppError::bad_request(
                        "Some addresses belong to another client",
                        ErrorCode::ZipCodeAlreadyExists,
                    ));
                }

                let replacement: Vec<Address> = new_addresses
                    .into_iter()
                    .map(|fields| Address::new(fields, client.id))
                    .collect();
                let updated = self
                    .clients
                    .update_with_addresses(&client, &replacement)
                    .await?;
                tracing::info!(client_id = %updated.id, "client updated");
                return Ok(updated);
            }
        }

        let updated = self.clients.update(&client).await?;
        tracing::info!(client_id = %updated.id, "client updated");
        Ok(updated)
    }

    /// Delete a client. Owned addresses are removed by the storage
    /// layer's cascading foreign key. Deleting twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the delete fails.
    pub async fn delete(&self, id: ClientId) -> AppResult<()> {
        self.clients.delete(id).await?;
        tracing::info!(client_id = %id, "client deleted");
        Ok(())
    }

    /// Load a client and attach its addresses.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when the client does not exist, or a
    /// repository error.
    pub async fn find_by_id(&self, id: ClientId) -> AppResult<Client> {
        let Some(mut client) = self.clients.find_by_id(id).await? else {
            return Err(AppError::not_found("Client not found"));
        };
        let addresses = self.addresses.find_by_client_id(client.id).await?;
        client.addresses = Some(addresses);
        Ok(client)
    }

    /// Paginated client listing; a pure passthrough to the repository.
    ///
    /// # Errors
    ///
    /// Returns a repository error, including for unknown filter or sort
    /// columns.
    pub async fn find_paginated(
        &self,
        params: &FindPaginatedParams,
    ) -> AppResult<PaginatedResult<Client>> {
        Ok(self.clients.find_paginated(params).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use clientdesk_core::AddressId;

    use super::*;
    use crate::db::{RepositoryError, RepositoryResult};
    use crate::repository::{PaginatedRepository, Repository};

    /// Shared in-memory store standing in for the database.
    #[derive(Default)]
    struct Store {
        clients: Mutex<Vec<Client>>,
        addresses: Mutex<Vec<Address>>,
    }

    #[derive(Clone)]
    struct MemClients(Arc<Store>);

    #[derive(Clone)]
    struct MemAddresses(Arc<Store>);

    impl Repository<Client> for MemClients {
        type Id = ClientId;

        async fn create(&self, entity: &Client) -> RepositoryResult<Client> {
            self.0.clients.lock().unwrap().push(entity.clone());
            Ok(entity.clone())
        }

        async fn create_many(&self, entities: &[Client]) -> RepositoryResult<()> {
            self.0.clients.lock().unwrap().extend_from_slice(entities);
            Ok(())
        }

        async fn find_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>> {
            Ok(self
                .0
                .clients
                .lock()
                .unwrap()
                .iter()
                .find(|client| client.id == id)
                .cloned())
        }

        async fn find_all(&self) -> RepositoryResult<Vec<Client>> {
            Ok(self.0.clients.lock().unwrap().clone())
        }

        async fn update(&self, entity: &Client) -> RepositoryResult<Client> {
            let mut clients = self.0.clients.lock().unwrap();
            let stored = clients
                .iter_mut()
                .find(|client| client.id == entity.id)
                .ok_or(RepositoryError::NotFound)?;
            *stored = Client {
                updated_at: Utc::now(),
                addresses: None,
                ..entity.clone()
            };
            Ok(stored.clone())
        }

        async fn delete(&self, id: ClientId) -> RepositoryResult<()> {
            self.0.clients.lock().unwrap().retain(|client| client.id != id);
            Ok(())
        }
    }

    impl PaginatedRepository<Client> for MemClients {
        async fn find_paginated(
            &self,
            params: &FindPaginatedParams,
        ) -> RepositoryResult<PaginatedResult<Client>> {
            let clients = self.0.clients.lock().unwrap();
            let page = params.effective_page();
            let limit = params.effective_limit();
            let offset = usize::try_from(params.offset()).unwrap();
            let data: Vec<Client> = clients
                .iter()
                .skip(offset)
                .take(usize::try_from(limit).unwrap())
                .cloned()
                .collect();
            Ok(PaginatedResult {
                page,
                limit,
                total: i64::try_from(clients.len()).unwrap(),
                data,
            })
        }
    }

    impl ClientRepository for MemClients {
        async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Client>> {
            Ok(self
                .0
                .clients
                .lock()
                .unwrap()
                .iter()
                .find(|client| client.email == email)
                .cloned())
        }

        async fn find_by_phone(&self, phone: &str) -> RepositoryResult<Option<Client>> {
            Ok(self
                .0
                .clients
                .lock()
                .unwrap()
                .iter()
                .find(|client| client.phone == phone)
                .cloned())
        }

        async fn create_with_addresses(
            &self,
            client: &Client,
            addresses: &[Address],
        ) -> RepositoryResult<Client> {
            self.0.clients.lock().unwrap().push(client.clone());
            self.0
                .addresses
                .lock()
                .unwrap()
                .extend_from_slice(addresses);
            let mut created = client.clone();
            created.addresses = Some(addresses.to_vec());
            Ok(created)
        }

        async fn update_with_addresses(
            &self,
            client: &Client,
            replacement: &[Address],
        ) -> RepositoryResult<Client> {
            {
                let mut addresses = self.0.addresses.lock().unwrap();
                addresses.retain(|address| address.client_id != client.id);
                addresses.extend_from_slice(replacement);
            }
            let updated = Repository::update(self, client).await?;
            let mut updated = updated;
            updated.addresses = Some(replacement.to_vec());
            Ok(updated)
        }
    }

    impl Repository<Address> for MemAddresses {
        type Id = AddressId;

        async fn create(&self, entity: &Address) -> RepositoryResult<Address> {
            self.0.addresses.lock().unwrap().push(entity.clone());
            Ok(entity.clone())
        }

        async fn create_many(&self, entities: &[Address]) -> RepositoryResult<()> {
            self.0.addresses.lock().unwrap().extend_from_slice(entities);
            Ok(())
        }

        async fn find_by_id(&self, id: AddressId) -> RepositoryResult<Option<Address>> {
            Ok(self
                .0
                .addresses
                .lock()
                .unwrap()
                .iter()
                .find(|address| address.id == id)
                .cloned())
        }

        async fn find_all(&self) -> RepositoryResult<Vec<Address>> {
            Ok(self.0.addresses.lock().unwrap().clone())
        }

        async fn update(&self, entity: &Address) -> RepositoryResult<Address> {
            let mut addresses = self.0.addresses.lock().unwrap();
            let stored = addresses
                .iter_mut()
                .find(|address| address.id == entity.id)
                .ok_or(RepositoryError::NotFound)?;
            *stored = entity.clone();
            Ok(stored.clone())
        }

        async fn delete(&self, id: AddressId) -> RepositoryResult<()> {
            self.0
                .addresses
                .lock()
                .unwrap()
                .retain(|address| address.id != id);
            Ok(())
        }
    }

    impl PaginatedRepository<Address> for MemAddresses {
        async fn find_paginated(
            &self,
            params: &FindPaginatedParams,
        ) -> RepositoryResult<PaginatedResult<Address>> {
            let addresses = self.0.addresses.lock().unwrap();
            Ok(PaginatedResult {
                page: params.effective_page(),
                limit: params.effective_limit(),
                total: i64::try_from(addresses.len()).unwrap(),
                data: addresses.clone(),
            })
        }
    }

    impl AddressRepository for MemAddresses {
        async fn find_by_zip_codes(&self, zip_codes: &[String]) -> RepositoryResult<Vec<Address>> {
            Ok(self
                .0
                .addresses
                .lock()
                .unwrap()
                .iter()
                .filter(|address| zip_codes.contains(&address.zip_code))
                .cloned()
                .collect())
        }

        async fn find_by_client_id(&self, client_id: ClientId) -> RepositoryResult<Vec<Address>> {
            Ok(self
                .0
                .addresses
                .lock()
                .unwrap()
                .iter()
                .filter(|address| address.client_id == client_id)
                .cloned()
                .collect())
        }

        async fn delete_by_client_id(&self, client_id: ClientId) -> RepositoryResult<()> {
            self.0
                .addresses
                .lock()
                .unwrap()
                .retain(|address| address.client_id != client_id);
            Ok(())
        }
    }

    fn service() -> (ClientService<MemClients, MemAddresses>, Arc<Store>) {
        let store = Arc::new(Store::default());
        (
            ClientService::new(MemClients(store.clone()), MemAddresses(store.clone())),
            store,
        )
    }

    fn new_address(zip_code: &str) -> NewAddress {
        NewAddress {
            street: "1 Main St".into(),
            city: "Lisbon".into(),
            state: "LX".into(),
            zip_code: zip_code.into(),
            country: "PT".into(),
            complement: None,
        }
    }

    fn create_input(email: &str, phone: &str, zips: &[&str]) -> CreateClientInput {
        CreateClientInput {
            name: "Ann".into(),
            email: email.into(),
            phone: phone.into(),
            addresses: zips.iter().map(|zip| new_address(zip)).collect(),
        }
    }

    fn assert_bad_request(err: &AppError, code: ErrorCode) {
        match err {
            AppError::BadRequest { code: got, .. } => assert_eq!(*got, code),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_persists_client_and_addresses() {
        let (service, store) = service();
        let created = service
            .create(create_input("x@y.com", "+1", &["z1", "z2", "z3"]))
            .await
            .unwrap();

        let addresses = created.addresses.as_ref().unwrap();
        assert_eq!(addresses.len(), 3);
        assert!(addresses.iter().all(|address| address.client_id == created.id));
        assert_eq!(store.addresses.lock().unwrap().len(), 3);
        assert_eq!(store.clients.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email_without_writing() {
        let (service, store) = service();
        service
            .create(create_input("x@y.com", "+1", &[]))
            .await
            .unwrap();

        let err = service
            .create(create_input("x@y.com", "+2", &[]))
            .await
            .unwrap_err();
        assert_bad_request(&err, ErrorCode::EmailAlreadyExists);
        assert_eq!(store.clients.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_phone() {
        let (service, _store) = service();
        service
            .create(create_input("x@y.com", "+1", &[]))
            .await
            .unwrap();

        let err = service
            .create(create_input("other@y.com", "+1", &[]))
            .await
            .unwrap_err();
        assert_bad_request(&err, ErrorCode::PhoneAlreadyExists);
    }

    #[tokio::test]
    async fn test_create_rejects_existing_zip_code() {
        let (service, store) = service();
        service
            .create(create_input("x@y.com", "+1", &["z1"]))
            .await
            .unwrap();

        let err = service
            .create(create_input("other@y.com", "+2", &["z1"]))
            .await
            .unwrap_err();
        assert_bad_request(&err, ErrorCode::ZipCodeAlreadyExists);
        assert_eq!(store.clients.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_client_is_not_found() {
        let (service, _store) = service();
        let err = service
            .update(ClientId::generate(), UpdateClientInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_another_client() {
        let (service, _store) = service();
        service
            .create(create_input("a@y.com", "+1", &[]))
            .await
            .unwrap();
        let target = service
            .create(create_input("b@y.com", "+2", &[]))
            .await
            .unwrap();

        let err = service
            .update(
                target.id,
                UpdateClientInput {
                    email: Some("a@y.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_bad_request(&err, ErrorCode::EmailAlreadyExists);
    }

    #[tokio::test]
    async fn test_update_allows_keeping_own_email() {
        let (service, _store) = service();
        let client = service
            .create(create_input("a@y.com", "+1", &[]))
            .await
            .unwrap();

        let updated = service
            .update(
                client.id,
                UpdateClientInput {
                    name: Some("Renamed".into()),
                    email: Some("a@y.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, "a@y.com");
    }

    #[tokio::test]
    async fn test_update_with_empty_address_list_keeps_existing_addresses() {
        let (service, store) = service();
        let client = service
            .create(create_input("a@y.com", "+1", &["z1", "z2"]))
            .await
            .unwrap();

        service
            .update(
                client.id,
                UpdateClientInput {
                    addresses: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(store.addresses.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_replaces_address_set() {
        let (service, store) = service();
        let client = service
            .create(create_input("a@y.com", "+1", &["z1", "z2"]))
            .await
            .unwrap();

        let updated = service
            .update(
                client.id,
                UpdateClientInput {
                    addresses: Some(vec![new_address("z9")]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = store.addresses.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].zip_code, "z9");
        assert_eq!(stored[0].client_id, client.id);
        assert_eq!(updated.addresses.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_zip_owned_by_another_client() {
        let (service, _store) = service();
        service
            .create(create_input("a@y.com", "+1", &["z1"]))
            .await
            .unwrap();
        let target = service
            .create(create_input("b@y.com", "+2", &["z2"]))
            .await
            .unwrap();

        let err = service
            .update(
                target.id,
                UpdateClientInput {
                    addresses: Some(vec![new_address("z1")]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_bad_request(&err, ErrorCode::ZipCodeAlreadyExists);
    }

    #[tokio::test]
    async fn test_update_allows_reusing_own_zip_codes() {
        let (service, store) = service();
        let client = service
            .create(create_input("a@y.com", "+1", &["z1", "z2"]))
            .await
            .unwrap();

        service
            .update(
                client.id,
                UpdateClientInput {
                    addresses: Some(vec![new_address("z1")]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(store.addresses.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (service, store) = service();
        let client = service
            .create(create_input("a@y.com", "+1", &[]))
            .await
            .unwrap();

        service.delete(client.id).await.unwrap();
        assert!(store.clients.lock().unwrap().is_empty());
        // Deleting again is still a success.
        service.delete(client.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_id_attaches_addresses() {
        let (service, _store) = service();
        let client = service
            .create(create_input("a@y.com", "+1", &["z1", "z2"]))
            .await
            .unwrap();

        let found = service.find_by_id(client.id).await.unwrap();
        assert_eq!(found.id, client.id);
        assert_eq!(found.addresses.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_not_found() {
        let (service, _store) = service();
        let err = service.find_by_id(ClientId::generate()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_paginated_passes_through() {
        let (service, _store) = service();
        for index in 0..25 {
            service
                .create(create_input(&format!("c{index}@y.com"), &format!("+{index}"), &[]))
                .await
                .unwrap();
        }

        let page = service
            .find_paginated(&FindPaginatedParams::default().page(3).limit(10))
            .await
            .unwrap();
        assert_eq!(page.page, 3);
        assert_eq!(page.limit, 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.data.len(), 5);
    }

    #[tokio::test]
    async fn test_find_paginated_normalizes_page_and_limit() {
        let (service, _store) = service();
        let page = service
            .find_paginated(&FindPaginatedParams::default().page(0).limit(500))
            .await
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
    }
}
