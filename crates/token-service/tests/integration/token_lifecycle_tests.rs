//! Create, list, toggle and delete through the HTTP surface.

use reqwest::StatusCode;
use serde_json::Value;
use token_test_utils::*;

#[tokio::test]
async fn test_create_defaults_to_workspace_token() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .post(server.workspace_url(TEST_WORKSPACE_A, "/tokens"))
        .bearer_auth(TEST_MEMBER_KEY_A)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["token_type"], "workspace");
    assert_eq!(body["enabled"], true);
    let key = body["key"].as_str().unwrap_or_default();
    assert_eq!(key.len(), 64, "key should be 32 random bytes hex encoded");

    // The new key authenticates immediately
    let response = client
        .get(server.workspace_url(TEST_WORKSPACE_A, "/tokens"))
        .bearer_auth(key)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_empty_token_type_means_workspace() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(server.workspace_url(TEST_WORKSPACE_A, "/tokens?token_type="))
        .bearer_auth(TEST_PRIMARY_KEY_A)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["token_type"], "workspace");
    Ok(())
}

#[tokio::test]
async fn test_unknown_token_type_rejected() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(server.workspace_url(TEST_WORKSPACE_A, "/tokens?token_type=superuser"))
        .bearer_auth(TEST_ADMIN_KEY)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_code("INVALID_TOKEN_TYPE");
    Ok(())
}

#[tokio::test]
async fn test_list_returns_workspace_tokens_in_creation_order() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let fixtures = server.fixtures();

    let response = reqwest::Client::new()
        .get(server.workspace_url(TEST_WORKSPACE_A, "/tokens"))
        .bearer_auth(TEST_MEMBER_KEY_A)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Vec<Value> = response.json().await?;
    let ids: Vec<&str> = body
        .iter()
        .filter_map(|t| t["token_id"].as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            fixtures.primary_a.external_id.as_str(),
            fixtures.member_a.external_id.as_str(),
            fixtures.disabled_a.external_id.as_str(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_toggle_flips_enabled_and_controls_authentication() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();
    let member = &server.fixtures().member_a;

    let toggle_url = server.workspace_url(
        TEST_WORKSPACE_A,
        &format!("/tokens/{}/toggle", member.external_id),
    );

    let response = client
        .post(&toggle_url)
        .bearer_auth(TEST_PRIMARY_KEY_A)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["enabled"], false);
    assert_eq!(body["token_id"], member.external_id.as_str());

    // Disabled keys no longer authenticate
    let response = client
        .get(server.workspace_url(TEST_WORKSPACE_A, "/tokens"))
        .bearer_auth(TEST_MEMBER_KEY_A)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post(&toggle_url)
        .bearer_auth(TEST_PRIMARY_KEY_A)
        .send()
        .await?;
    let body: Value = response.json().await?;
    assert_eq!(body["enabled"], true);

    Ok(())
}

#[tokio::test]
async fn test_delete_token_then_delete_again_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();
    let disabled = &server.fixtures().disabled_a;
    let url = server.workspace_url(TEST_WORKSPACE_A, &format!("/tokens/{}", disabled.external_id));

    let response = client.delete(&url).bearer_auth(TEST_MEMBER_KEY_A).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["ok"], true);
    assert!(server.store().find_token(&disabled.external_id).await.is_none());

    let response = client.delete(&url).bearer_auth(TEST_MEMBER_KEY_A).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    body.assert_error_code("TOKEN_NOT_FOUND")
        .assert_error_message("Invalid token ID");

    Ok(())
}

#[tokio::test]
async fn test_unknown_token_id_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(server.workspace_url(
            TEST_WORKSPACE_A,
            &format!("/tokens/{}/toggle", TEST_UNKNOWN_TOKEN_ID),
        ))
        .bearer_auth(TEST_MEMBER_KEY_A)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
