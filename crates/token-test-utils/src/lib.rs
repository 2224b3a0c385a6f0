//! # Token Service Test Utilities
//!
//! Shared test utilities for the token service.
//!
//! This crate provides:
//! - Fixed test keys and workspace ids
//! - Seeded fixtures (cluster admin plus two tenant workspaces)
//! - A fault-injecting repository wrapper
//! - Server test harness (TestTokenServer for E2E tests)
//! - Error body assertions (ErrorAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use token_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestTokenServer::spawn().await?;
//!
//!     let response = reqwest::Client::new()
//!         .get(server.workspace_url(TEST_WORKSPACE_A, "/tokens"))
//!         .bearer_auth(TEST_MEMBER_KEY_A)
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod fault_injection;
pub mod fixtures;
pub mod server_harness;
pub mod test_ids;

// Re-export commonly used items
pub use assertions::*;
pub use fault_injection::*;
pub use fixtures::*;
pub use server_harness::*;
pub use test_ids::*;
