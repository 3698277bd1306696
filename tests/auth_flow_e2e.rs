//! End-to-end tests for registration, login and the role-gated catalog.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bookshelf_backend::{
    auth::{CredentialService, JwtHandler, UserStore},
    build_router,
    catalog::BookStore,
    errors::ErrorVerbosity,
    AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "e2e-secret-key-0123456789";

struct TestApp {
    router: Router,
    credentials: CredentialService,
}

fn create_test_app() -> TestApp {
    let user_store = Arc::new(UserStore::in_memory().unwrap());
    let book_store = Arc::new(BookStore::in_memory().unwrap());
    let jwt = Arc::new(JwtHandler::new(SECRET));

    let credentials = CredentialService::new(user_store.clone(), jwt.clone(), 4);
    let state = AppState::new(
        user_store,
        book_store,
        jwt,
        4,
        ErrorVerbosity { expose_stack: true },
    );

    TestApp {
        router: build_router(state),
        credentials,
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Bearer {t}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Bearer {t}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn sample_book(isbn: &str) -> Value {
    json!({
        "title": "The Rust Programming Language",
        "author": "Steve Klabnik",
        "description": "The book",
        "genre": "programming",
        "publicationYear": 2018,
        "isbn": isbn,
        "price": 39.95,
        "isAvailable": true
    })
}

async fn register(app: &Router, username: &str, email: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/register",
            None,
            json!({ "username": username, "email": email, "password": password }),
        ))
        .await
        .unwrap()
}

async fn login_token(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            None,
            json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn admin_token(test: &TestApp) -> String {
    test.credentials
        .ensure_admin("root", "root@x.com", "rootpass")
        .await
        .unwrap();
    login_token(&test.router, "root@x.com", "rootpass").await
}

// ==================== Registration & Login ====================

#[tokio::test]
async fn test_register_returns_sanitized_user() {
    let test = create_test_app();

    let response = register(&test.router, "bob", "Bob@X.com", "secret1").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    let user = &body["user"];
    assert_eq!(user["username"], "bob");
    assert_eq!(user["email"], "bob@x.com");
    assert_eq!(user["role"], "user");
    assert!(user["id"].as_str().is_some());

    let raw = body.to_string();
    assert!(!raw.contains("secret1"));
    assert!(!raw.contains("password"));
    assert!(!raw.contains("$2"));
}

#[tokio::test]
async fn test_register_missing_fields_and_short_password() {
    let test = create_test_app();

    let response = test
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/register",
            None,
            json!({ "username": "bob", "email": "bob@x.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = register(&test.router, "bob", "bob@x.com", "12345").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The rejected attempt left nothing behind
    let response = register(&test.router, "bob", "bob@x.com", "123456").await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_conflicts() {
    let test = create_test_app();
    assert_eq!(
        register(&test.router, "bob", "bob@x.com", "secret1").await.status(),
        StatusCode::CREATED
    );

    let same_email = register(&test.router, "robert", "bob@x.com", "secret1").await;
    assert_eq!(same_email.status(), StatusCode::CONFLICT);
    let body = json_body(same_email).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("already exists"));

    let same_username = register(&test.router, "bob", "other@x.com", "secret1").await;
    assert_eq!(same_username.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_success_and_generic_failure() {
    let test = create_test_app();
    register(&test.router, "bob", "bob@x.com", "secret1").await;

    let response = test
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            None,
            json!({ "email": "bob@x.com", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user"]["username"], "bob");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["expiresIn"], 3600);
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
    assert!(!body.to_string().contains("secret1"));

    let wrong_password = test
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            None,
            json!({ "email": "bob@x.com", "password": "nope123" }),
        ))
        .await
        .unwrap();
    let unknown_email = test
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            None,
            json!({ "email": "alice@x.com", "password": "secret1" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(wrong_password).await["message"],
        json_body(unknown_email).await["message"]
    );

    let missing = test
        .router
        .clone()
        .oneshot(json_request("POST", "/login", None, json!({ "email": "bob@x.com" })))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

// ==================== Catalog access control ====================

#[tokio::test]
async fn test_reader_scenario() {
    let test = create_test_app();
    let admin = admin_token(&test).await;

    let created = test
        .router
        .clone()
        .oneshot(json_request("POST", "/books", Some(&admin), sample_book("isbn-1")))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let book_id = json_body(created).await["book"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = register(&test.router, "bob", "bob@x.com", "secret1").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["user"]["role"], "user");
    let token = login_token(&test.router, "bob@x.com", "secret1").await;

    // Non-admin can read
    let response = test
        .router
        .clone()
        .oneshot(empty_request("GET", &format!("/books/{book_id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["isbn"], "isbn-1");

    // An id in some other format is simply unknown
    let response = test
        .router
        .clone()
        .oneshot(empty_request("GET", "/books/507f1f77bcf86cd799439011", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["message"], "Book not found");

    // ...but not write
    let response = test
        .router
        .clone()
        .oneshot(json_request("POST", "/books", Some(&token), sample_book("isbn-2")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test
        .router
        .clone()
        .oneshot(empty_request("DELETE", &format!("/books/{book_id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // No header at all
    for (method, uri) in [
        ("GET", format!("/books/{book_id}")),
        ("POST", "/books".to_string()),
        ("PUT", format!("/books/{book_id}")),
        ("DELETE", format!("/books/{book_id}")),
    ] {
        let response = test
            .router
            .clone()
            .oneshot(empty_request(method, &uri, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }

    // The forbidden write never reached the store
    let response = test
        .router
        .clone()
        .oneshot(empty_request("GET", "/books", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["books"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let test = create_test_app();
    register(&test.router, "bob", "bob@x.com", "secret1").await;
    let token = login_token(&test.router, "bob@x.com", "secret1").await;

    let (head, sig) = token.rsplit_once('.').unwrap();
    let first = if sig.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{head}.{first}{}", &sig[1..]);

    let response = test
        .router
        .clone()
        .oneshot(empty_request(
            "GET",
            "/books/507f1f77-bcf8-4cd7-9943-9011aabbccdd",
            Some(&tampered),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_crud() {
    let test = create_test_app();
    let admin = admin_token(&test).await;

    let created = test
        .router
        .clone()
        .oneshot(json_request("POST", "/books", Some(&admin), sample_book("isbn-1")))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let book_id = json_body(created).await["book"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let dup = test
        .router
        .clone()
        .oneshot(json_request("POST", "/books", Some(&admin), sample_book("isbn-1")))
        .await
        .unwrap();
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    let incomplete = test
        .router
        .clone()
        .oneshot(json_request("POST", "/books", Some(&admin), json!({ "title": "x" })))
        .await
        .unwrap();
    assert_eq!(incomplete.status(), StatusCode::BAD_REQUEST);

    let empty_patch = test
        .router
        .clone()
        .oneshot(json_request("PUT", &format!("/books/{book_id}"), Some(&admin), json!({})))
        .await
        .unwrap();
    assert_eq!(empty_patch.status(), StatusCode::BAD_REQUEST);

    let bad_id = test
        .router
        .clone()
        .oneshot(json_request("PUT", "/books/not-an-id", Some(&admin), json!({ "price": 1.0 })))
        .await
        .unwrap();
    assert_eq!(bad_id.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(bad_id).await["message"], "Book not found");

    let updated = test
        .router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/books/{book_id}"),
            Some(&admin),
            json!({ "price": 19.5 }),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(json_body(updated).await["updatedBook"]["price"], 19.5);

    let deleted = test
        .router
        .clone()
        .oneshot(empty_request("DELETE", &format!("/books/{book_id}"), Some(&admin)))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let gone = test
        .router
        .clone()
        .oneshot(empty_request("GET", &format!("/books/{book_id}"), Some(&admin)))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(gone).await["message"], "Book not found");

    let missing_update = test
        .router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/books/{book_id}"),
            Some(&admin),
            json!({ "price": 1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(missing_update.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_routes() {
    let test = create_test_app();

    let response = test
        .router
        .clone()
        .oneshot(empty_request("GET", "/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["message"],
        "Book Directory server is running"
    );

    let response = test
        .router
        .clone()
        .oneshot(empty_request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test
        .router
        .clone()
        .oneshot(empty_request("GET", "/nowhere", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
