//! Domain entities.
//!
//! Entities are plain records with identity and timestamps. Construction
//! generates the id and stamps both timestamps with the same instant;
//! `updated_at` is refreshed server-side by the repository on update.

pub mod address;
pub mod client;

pub use address::{Address, NewAddress};
pub use client::Client;
