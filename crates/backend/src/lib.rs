//! Clientdesk Backend - repositories and application services.
//!
//! This crate is the application core behind the HTTP boundary: it owns
//! the domain entities, the Postgres repository layer, and the use-case
//! services that orchestrate them. The boundary layer (routing, request
//! validation, response rendering) lives elsewhere and talks to this
//! crate through [`services::ClientService`] and the error taxonomy in
//! [`error`].
//!
//! # Architecture
//!
//! - [`models`] - Domain entities (`Client`, `Address`)
//! - [`repository`] - Trait contracts for CRUD + paginated queries
//! - [`db`] - `PostgreSQL` implementations over a shared [`sqlx::PgPool`],
//!   built on a generic table repository plus per-entity mappers
//! - [`services`] - Use-cases (create/update/delete/find), generic over
//!   the repository traits
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Application error taxonomy with status classification
//!
//! The connection pool is constructed explicitly at process start (see
//! [`db::create_pool`]) and injected into each repository; there is no
//! global state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
