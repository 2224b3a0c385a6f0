//! Signing key disclosure.

use reqwest::StatusCode;
use serde_json::Value;
use token_test_utils::*;

#[tokio::test]
async fn test_workspace_actor_reads_own_signing_key() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(server.workspace_url(TEST_WORKSPACE_A, "/signing-key"))
        .bearer_auth(TEST_MEMBER_KEY_A)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["signing_key"], TEST_SIGNING_KEY_A);
    Ok(())
}

#[tokio::test]
async fn test_signing_key_is_workspace_scoped() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(server.workspace_url(TEST_WORKSPACE_B, "/signing-key"))
        .bearer_auth(TEST_PRIMARY_KEY_A)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .get(server.workspace_url(TEST_WORKSPACE_B, "/signing-key"))
        .bearer_auth(TEST_ADMIN_KEY)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["signing_key"], TEST_SIGNING_KEY_B);
    Ok(())
}

#[tokio::test]
async fn test_signing_key_unknown_workspace() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(server.workspace_url(TEST_UNKNOWN_WORKSPACE, "/signing-key"))
        .bearer_auth(TEST_ADMIN_KEY)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    body.assert_error_code("INVALID_WORKSPACE");
    Ok(())
}
