//! Workspace token service.
//!
//! Issues, lists, toggles and deletes API tokens scoped to a workspace, and
//! lets a cluster administrator enable or disable every token of a workspace
//! at once. Workspace primary and cluster admin tokens are protected: only a
//! cluster admin may mint, toggle or delete them.
//!
//! # Modules
//!
//! - `config` - Environment configuration
//! - `crypto` - Token key and signing key generation
//! - `errors` - Error type and HTTP mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Actor resolution and HTTP metrics
//! - `models` - Domain and wire types
//! - `observability` - Prometheus metrics
//! - `repositories` - Token store trait with PostgreSQL and in-memory backends
//! - `routes` - Router assembly
//! - `services` - Token policy and operations

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
