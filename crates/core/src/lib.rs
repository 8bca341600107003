//! Clientdesk Core - Shared types library.
//!
//! This crate provides common types used across all Clientdesk components:
//!
//! - `backend` - Repositories and application services
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no
//! HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere, including the boundary layer that renders responses.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe entity IDs
//! - [`pagination`] - The page/sort/filter request contract and the
//!   paginated result shape

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pagination;
pub mod types;

pub use pagination::*;
pub use types::*;
