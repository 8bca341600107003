//! Shared type definitions for Clientdesk.

pub mod id;

pub use id::{AddressId, ClientId};
