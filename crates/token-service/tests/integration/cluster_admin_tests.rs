//! Cluster-admin bulk enable/disable.

use reqwest::StatusCode;
use serde_json::{json, Value};
use token_test_utils::*;

#[tokio::test]
async fn test_bulk_update_requires_cluster_admin() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .patch(server.admin_tokens_url(TEST_WORKSPACE_A))
        .bearer_auth(TEST_PRIMARY_KEY_A)
        .json(&json!({"disabled": true}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .patch(server.admin_tokens_url(TEST_WORKSPACE_A))
        .json(&json!({"disabled": true}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let stored = server
        .store()
        .find_token(&server.fixtures().member_a.external_id)
        .await;
    assert_eq!(stored.map(|t| t.enabled), Some(true));
    Ok(())
}

#[tokio::test]
async fn test_bulk_disable_then_enable_workspace() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();
    let fixtures = server.fixtures();

    let response = client
        .patch(server.admin_tokens_url(TEST_WORKSPACE_A))
        .bearer_auth(TEST_ADMIN_KEY)
        .json(&json!({"disabled": true}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["ok"], true);
    assert_eq!(body["updated"], 3);

    for token in [&fixtures.primary_a, &fixtures.member_a, &fixtures.disabled_a] {
        let stored = server.store().find_token(&token.external_id).await;
        assert_eq!(stored.map(|t| t.enabled), Some(false));
    }

    // Other workspaces are untouched
    let stored = server.store().find_token(&fixtures.member_b.external_id).await;
    assert_eq!(stored.map(|t| t.enabled), Some(true));

    // Disabled primary key can no longer act
    let response = client
        .get(server.workspace_url(TEST_WORKSPACE_A, "/tokens"))
        .bearer_auth(TEST_PRIMARY_KEY_A)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .patch(server.admin_tokens_url(TEST_WORKSPACE_A))
        .bearer_auth(TEST_ADMIN_KEY)
        .json(&json!({"disabled": false}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    for token in [&fixtures.primary_a, &fixtures.member_a, &fixtures.disabled_a] {
        let stored = server.store().find_token(&token.external_id).await;
        assert_eq!(stored.map(|t| t.enabled), Some(true));
    }
    Ok(())
}

#[tokio::test]
async fn test_bulk_update_rejects_malformed_body() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();

    for body in [json!({}), json!({"disabled": "yes"}), json!([true])] {
        let response = client
            .patch(server.admin_tokens_url(TEST_WORKSPACE_A))
            .bearer_auth(TEST_ADMIN_KEY)
            .json(&body)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);
        let error: Value = response.json().await?;
        error.assert_error_code("BAD_REQUEST");
    }
    Ok(())
}

#[tokio::test]
async fn test_bulk_update_unknown_workspace() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .patch(server.admin_tokens_url(TEST_UNKNOWN_WORKSPACE))
        .bearer_auth(TEST_ADMIN_KEY)
        .json(&json!({"disabled": true}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_code("INVALID_WORKSPACE");
    Ok(())
}

#[tokio::test]
async fn test_bulk_update_partial_failure_keeps_earlier_updates() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let fixtures = server.fixtures();
    server
        .faults()
        .fail_cluster_admin_update(&fixtures.member_a.external_id)
        .await;

    let response = reqwest::Client::new()
        .patch(server.admin_tokens_url(TEST_WORKSPACE_A))
        .bearer_auth(TEST_ADMIN_KEY)
        .json(&json!({"disabled": true}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await?;
    body.assert_error_code("DATABASE_ERROR");

    // Listing order is primary, member, disabled: the primary was updated
    // before the failure and stays updated.
    let primary = server.store().find_token(&fixtures.primary_a.external_id).await;
    assert_eq!(primary.map(|t| t.enabled), Some(false));
    let member = server.store().find_token(&fixtures.member_a.external_id).await;
    assert_eq!(member.map(|t| t.enabled), Some(true));
    Ok(())
}
