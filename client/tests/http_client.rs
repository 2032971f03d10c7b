//! `BaseClient` against a local mock server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use base_site_client::{ApiError, BaseApi, BaseClient, Credentials, NewUser, Upload};
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

async fn setup() -> (MockServer, BaseClient) {
    let server = MockServer::start().await;
    let client = BaseClient::new(TOKEN, server.uri());
    (server, client)
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "u1", "email": "a@b.com"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let user = client.get_user("u1").await.unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(user.email, "a@b.com");
}

#[tokio::test]
async fn test_create_user_sends_registration_fields() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({
            "email": "a@b.com",
            "password": "pw",
            "confirmation": "pw",
            "custom_data": {"plan": "pro"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "u9",
            "email": "a@b.com",
            "custom_data": {"plan": "pro"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client
        .create_user(&NewUser {
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
            confirmation: "pw".to_string(),
            custom_data: Some(json!({"plan": "pro"})),
        })
        .await
        .unwrap();
    assert_eq!(user.id, "u9");
}

#[tokio::test]
async fn test_wrong_credentials_are_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sessions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .mount(&server)
        .await;

    let result = client
        .authenticate(&Credentials {
            email: "a@b.com".to_string(),
            password: "wrong".to_string(),
        })
        .await;
    assert_eq!(result, Err(ApiError::Unauthorized));
}

#[tokio::test]
async fn test_validation_failure_carries_detail() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/users/u1"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"error": "Email is already taken"})),
        )
        .mount(&server)
        .await;

    let result = client
        .update_user(
            "u1",
            &base_site_client::UserUpdate {
                email: "taken@b.com".to_string(),
                custom_data: None,
            },
        )
        .await;
    assert_eq!(
        result,
        Err(ApiError::invalid_request("Email is already taken"))
    );
}

#[tokio::test]
async fn test_server_error_is_unknown() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/files/f1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client.delete_file("f1").await;
    assert!(matches!(result, Err(ApiError::Unknown { .. })));
}

#[tokio::test]
async fn test_unreachable_api_is_unknown() {
    let client = BaseClient::new(TOKEN, "http://127.0.0.1:9");
    let result = client.list_users(1).await;
    assert!(matches!(result, Err(ApiError::Unknown { .. })));
}

#[tokio::test]
async fn test_list_passes_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/mailing-lists"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "l1", "name": "News", "subscribers": ["a@b.com"]}],
            "page": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client.list_mailing_lists(3).await.unwrap();
    assert_eq!(page.page, 3);
    assert_eq!(page.items[0].subscribers, vec!["a@b.com".to_string()]);
}

#[tokio::test]
async fn test_subscribe_posts_email() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mailing-lists/l1/subscribe"))
        .and(body_json(json!({"email": "a@b.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "l1",
            "subscribers": ["a@b.com"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = client.subscribe("l1", "a@b.com").await.unwrap();
    assert_eq!(list.id, "l1");
}

#[tokio::test]
async fn test_upload_sends_file_contents() {
    let (server, client) = setup().await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"hello upload").unwrap();

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(body_string_contains("hello upload"))
        .and(body_string_contains("notes.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "f1",
            "content_type": "text/plain",
            "name": "notes.txt"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create_file(&Upload {
            path: file.path().to_path_buf(),
            filename: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "f1");
}

#[tokio::test]
async fn test_missing_upload_fails_before_calling_api() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client
        .create_image(&Upload {
            path: "/nonexistent/upload".into(),
            filename: "cat.png".to_string(),
            content_type: "image/png".to_string(),
        })
        .await;
    assert!(matches!(result, Err(ApiError::Unknown { .. })));
}
