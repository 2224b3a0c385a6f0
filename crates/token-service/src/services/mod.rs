//! Service layer.
//!
//! - `token_policy` - who may do what to which token type
//! - `token_service` - token lifecycle operations built on the policy
//! - `workspace_service` - workspace resolution from public ids

pub mod token_policy;
pub mod token_service;
pub mod workspace_service;
