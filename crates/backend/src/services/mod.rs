//! Application services (use-cases).
//!
//! Each operation orchestrates pre-condition checks and repository calls;
//! there are no business rules beyond that. Services are generic over the
//! repository traits so tests can run them against in-memory doubles.

pub mod clients;

pub use clients::{ClientService, CreateClientInput, UpdateClientInput};
