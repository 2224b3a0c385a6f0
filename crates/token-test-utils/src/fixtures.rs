//! Seeded workspaces and tokens.
//!
//! Layout:
//! - `cluster-admin`: one cluster admin token
//! - `ws-a`: primary, enabled member, disabled member
//! - `ws-b`: primary, enabled member

use crate::test_ids::*;
use token_service::models::{Token, TokenType, Workspace};
use token_service::repositories::InMemoryTokenRepository;

/// Handles to everything [`seed_fixtures`] created.
#[derive(Debug)]
pub struct Fixtures {
    pub admin_workspace: Workspace,
    pub workspace_a: Workspace,
    pub workspace_b: Workspace,
    pub admin: Token,
    pub primary_a: Token,
    pub member_a: Token,
    pub disabled_a: Token,
    pub primary_b: Token,
    pub member_b: Token,
}

/// Seed the standard fixture set into `repo`.
pub async fn seed_fixtures(repo: &InMemoryTokenRepository) -> Fixtures {
    let admin_workspace = repo
        .insert_workspace(TEST_ADMIN_WORKSPACE, "Cluster admin", TEST_SIGNING_KEY_ADMIN)
        .await;
    let workspace_a = repo
        .insert_workspace(TEST_WORKSPACE_A, "Workspace A", TEST_SIGNING_KEY_A)
        .await;
    let workspace_b = repo
        .insert_workspace(TEST_WORKSPACE_B, "Workspace B", TEST_SIGNING_KEY_B)
        .await;

    let admin = repo
        .insert_token(admin_workspace.id, TokenType::ClusterAdmin, true, TEST_ADMIN_KEY)
        .await;
    let primary_a = repo
        .insert_token(workspace_a.id, TokenType::WorkspacePrimary, true, TEST_PRIMARY_KEY_A)
        .await;
    let member_a = repo
        .insert_token(workspace_a.id, TokenType::Workspace, true, TEST_MEMBER_KEY_A)
        .await;
    let disabled_a = repo
        .insert_token(workspace_a.id, TokenType::Workspace, false, TEST_DISABLED_KEY_A)
        .await;
    let primary_b = repo
        .insert_token(workspace_b.id, TokenType::WorkspacePrimary, true, TEST_PRIMARY_KEY_B)
        .await;
    let member_b = repo
        .insert_token(workspace_b.id, TokenType::Workspace, true, TEST_MEMBER_KEY_B)
        .await;

    Fixtures {
        admin_workspace,
        workspace_a,
        workspace_b,
        admin,
        primary_a,
        member_a,
        disabled_a,
        primary_b,
        member_b,
    }
}
