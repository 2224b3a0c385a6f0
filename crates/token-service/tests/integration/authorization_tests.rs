//! Actor resolution, workspace scoping and protected token types.

use reqwest::{header, StatusCode};
use serde_json::Value;
use token_test_utils::*;

#[tokio::test]
async fn test_missing_key_is_unauthorized_with_challenge() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(server.workspace_url(TEST_WORKSPACE_A, "/tokens"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    let body: Value = response.json().await?;
    body.assert_error_code("INVALID_TOKEN");
    Ok(())
}

#[tokio::test]
async fn test_disabled_and_unknown_keys_are_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();

    for key in [TEST_DISABLED_KEY_A, "not-a-key"] {
        let response = client
            .get(server.workspace_url(TEST_WORKSPACE_A, "/tokens"))
            .bearer_auth(key)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "key {}", key);
    }
    Ok(())
}

#[tokio::test]
async fn test_foreign_workspace_is_forbidden() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(server.workspace_url(TEST_WORKSPACE_B, "/tokens"))
        .bearer_auth(TEST_PRIMARY_KEY_A)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_cross_tenant_token_id_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();
    let foreign = &server.fixtures().member_b;

    let response = client
        .post(server.workspace_url(
            TEST_WORKSPACE_A,
            &format!("/tokens/{}/toggle", foreign.external_id),
        ))
        .bearer_auth(TEST_PRIMARY_KEY_A)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .delete(server.workspace_url(
            TEST_WORKSPACE_A,
            &format!("/tokens/{}", foreign.external_id),
        ))
        .bearer_auth(TEST_PRIMARY_KEY_A)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let untouched = server.store().find_token(&foreign.external_id).await;
    assert_eq!(untouched.map(|t| t.enabled), Some(true));
    Ok(())
}

#[tokio::test]
async fn test_non_admin_cannot_mint_protected_types() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();

    for (key, token_type) in [
        (TEST_MEMBER_KEY_A, "workspace_primary"),
        (TEST_PRIMARY_KEY_A, "workspace_primary"),
        (TEST_PRIMARY_KEY_A, "admin"),
    ] {
        let response = client
            .post(server.workspace_url(
                TEST_WORKSPACE_A,
                &format!("/tokens?token_type={}", token_type),
            ))
            .bearer_auth(key)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await?;
        body.assert_error_code("INVALID_TOKEN_TYPE");
    }
    Ok(())
}

#[tokio::test]
async fn test_member_cannot_mint_cluster_admin_token() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .post(server.workspace_url(TEST_WORKSPACE_A, "/tokens?token_type=admin"))
        .bearer_auth(TEST_MEMBER_KEY_A)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_code("INVALID_TOKEN_TYPE");

    let response = client
        .get(server.workspace_url(TEST_WORKSPACE_A, "/tokens"))
        .bearer_auth(TEST_MEMBER_KEY_A)
        .send()
        .await?;
    let tokens: Vec<Value> = response.json().await?;
    assert!(tokens.iter().all(|t| t["token_type"] != "admin"));
    Ok(())
}

#[tokio::test]
async fn test_cluster_admin_can_mint_primary_in_any_workspace() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(server.workspace_url(TEST_WORKSPACE_B, "/tokens?token_type=workspace_primary"))
        .bearer_auth(TEST_ADMIN_KEY)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["token_type"], "workspace_primary");

    let token_id = body["token_id"].as_str().unwrap_or_default();
    let stored = server.store().find_token(token_id).await;
    assert_eq!(
        stored.map(|t| t.workspace_id),
        Some(server.fixtures().workspace_b.id)
    );
    Ok(())
}

#[tokio::test]
async fn test_primary_token_protected_from_workspace_actors() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();
    let primary = &server.fixtures().primary_a;

    for key in [TEST_MEMBER_KEY_A, TEST_PRIMARY_KEY_A] {
        let response = client
            .post(server.workspace_url(
                TEST_WORKSPACE_A,
                &format!("/tokens/{}/toggle", primary.external_id),
            ))
            .bearer_auth(key)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: Value = response.json().await?;
        body.assert_error_code("FORBIDDEN")
            .assert_error_message("Cannot toggle primary token");

        let response = client
            .delete(server.workspace_url(
                TEST_WORKSPACE_A,
                &format!("/tokens/{}", primary.external_id),
            ))
            .bearer_auth(key)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: Value = response.json().await?;
        body.assert_error_message("Cannot delete primary token");
    }

    let stored = server.store().find_token(&primary.external_id).await;
    assert_eq!(stored.map(|t| t.enabled), Some(true));
    Ok(())
}

#[tokio::test]
async fn test_cluster_admin_can_toggle_and_delete_primary() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();
    let primary = &server.fixtures().primary_b;

    let response = client
        .post(server.workspace_url(
            TEST_WORKSPACE_B,
            &format!("/tokens/{}/toggle", primary.external_id),
        ))
        .bearer_auth(TEST_ADMIN_KEY)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["enabled"], false);

    let response = client
        .delete(server.workspace_url(
            TEST_WORKSPACE_B,
            &format!("/tokens/{}", primary.external_id),
        ))
        .bearer_auth(TEST_ADMIN_KEY)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(server.store().find_token(&primary.external_id).await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_unknown_workspace_is_invalid_for_cluster_admin() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(server.workspace_url(TEST_UNKNOWN_WORKSPACE, "/tokens"))
        .bearer_auth(TEST_ADMIN_KEY)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_code("INVALID_WORKSPACE");
    Ok(())
}
