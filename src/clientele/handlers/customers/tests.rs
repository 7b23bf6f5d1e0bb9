//! Integration-style handler tests for the customer API.
//!
//! These tests exercise the assembled router end-to-end against a disposable
//! PostgreSQL database named by `CLIENTELE_TEST_DSN`. When the variable is
//! unset each test logs a skip and returns, so the suite stays green on
//! machines without a database. The tests share one table, so they take a
//! process-wide lock and reset the table during setup.

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64ct::{Base64, Encoding};
use secrecy::SecretString;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use crate::clientele::{auth::AuthConfig, router};

use super::storage;

const USERNAME: &str = "admin";
const PASSWORD: &str = "password";

static TEST_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// Builds the full router against a clean customers table, or `None` when no
/// test database is configured.
async fn test_router() -> Result<Option<Router>> {
    let Ok(dsn) = std::env::var("CLIENTELE_TEST_DSN") else {
        eprintln!("Skipping integration test: CLIENTELE_TEST_DSN is not set");
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&dsn)
        .await
        .context("failed to connect test pool")?;

    sqlx::query("DROP TABLE IF EXISTS customers")
        .execute(&pool)
        .await
        .context("failed to reset customers table")?;
    storage::ensure_schema(&pool)
        .await
        .context("failed to create customers table")?;

    let config = AuthConfig::new(USERNAME.to_string(), SecretString::from(PASSWORD.to_string()));

    Ok(Some(router(pool, config)))
}

fn basic(user: &str, pass: &str) -> String {
    let encoded = Base64::encode_string(format!("{user}:{pass}").as_bytes());
    format!("Basic {encoded}")
}

/// Sends an authenticated request and returns the status plus the decoded
/// body. Non-JSON bodies (extractor rejections) come back as a string value.
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(USERNAME, PASSWORD));

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    Ok((status, value))
}

fn john() -> Value {
    json!({
        "first_name": "John",
        "middle_name": "A",
        "last_name": "Doe",
        "prefix": "Mr.",
        "suffix": "Jr.",
        "email": "john.doe@example.com",
        "phone_number": "123-456-7890"
    })
}

fn jane() -> Value {
    json!({
        "first_name": "Jane",
        "middle_name": "B",
        "last_name": "Doe",
        "prefix": "Ms.",
        "suffix": "Sr.",
        "email": "jane.doe@example.com",
        "phone_number": "098-765-4321"
    })
}

#[tokio::test]
async fn customer_lifecycle_round_trip() -> Result<()> {
    let _guard = TEST_LOCK.lock().await;
    let Some(app) = test_router().await? else {
        return Ok(());
    };

    // Create
    let (status, created) = send(&app, Method::POST, "/v1/customers/", Some(john())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["email"], "john.doe@example.com");
    let id = created["id"].as_i64().context("created id")?;

    // Read back by id, every field round-trips
    let (status, fetched) = send(&app, Method::GET, &format!("/v1/customers/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    // Read back by email
    let (status, by_email) = send(
        &app,
        Method::GET,
        "/v1/customers/email/john.doe@example.com",
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_email["id"], created["id"]);

    // Full replace, not a merge
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/v1/customers/{id}"),
        Some(jane()),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["email"], "jane.doe@example.com");

    let (status, refetched) = send(&app, Method::GET, &format!("/v1/customers/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    let mut expected = jane();
    expected["id"] = json!(id);
    assert_eq!(refetched, expected);

    // Delete returns the final snapshot
    let (status, deleted) = send(&app, Method::DELETE, &format!("/v1/customers/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, expected);

    // Gone afterwards, and a second delete is still 404, not a crash
    let (status, _) = send(&app, Method::GET, &format!("/v1/customers/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/v1/customers/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn duplicate_email_yields_exactly_one_success() -> Result<()> {
    let _guard = TEST_LOCK.lock().await;
    let Some(app) = test_router().await? else {
        return Ok(());
    };

    let (status, _) = send(&app, Method::POST, "/v1/customers/", Some(john())).await?;
    assert_eq!(status, StatusCode::OK);

    let mut same_email = jane();
    same_email["email"] = json!("john.doe@example.com");
    let (status, body) = send(&app, Method::POST, "/v1/customers/", Some(same_email)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");

    let (status, listed) = send(&app, Method::GET, "/v1/customers/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn update_keeps_own_email_but_rejects_a_taken_one() -> Result<()> {
    let _guard = TEST_LOCK.lock().await;
    let Some(app) = test_router().await? else {
        return Ok(());
    };

    let (_, first) = send(&app, Method::POST, "/v1/customers/", Some(john())).await?;
    let (_, second) = send(&app, Method::POST, "/v1/customers/", Some(jane())).await?;
    let second_id = second["id"].as_i64().context("second id")?;

    // Re-submitting the record's own email is not a conflict
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/v1/customers/{second_id}"),
        Some(jane()),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    // Taking the other record's email is
    let mut stolen = jane();
    stolen["email"] = first["email"].clone();
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/v1/customers/{second_id}"),
        Some(stolen),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");

    // Updating an absent id is 404
    let (status, _) = send(&app, Method::PUT, "/v1/customers/999999", Some(jane())).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn pagination_returns_contiguous_slices() -> Result<()> {
    let _guard = TEST_LOCK.lock().await;
    let Some(app) = test_router().await? else {
        return Ok(());
    };

    for index in 0..5 {
        let mut draft = john();
        draft["email"] = json!(format!("customer{index}@example.com"));
        let (status, _) = send(&app, Method::POST, "/v1/customers/", Some(draft)).await?;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, all) = send(&app, Method::GET, "/v1/customers/", None).await?;
    assert_eq!(status, StatusCode::OK);
    let all = all.as_array().context("full listing")?.clone();
    assert_eq!(all.len(), 5);

    // A window is never larger than `limit` and lines up with the full set
    let (status, page) = send(&app, Method::GET, "/v1/customers/?skip=1&limit=2", None).await?;
    assert_eq!(status, StatusCode::OK);
    let page = page.as_array().context("page")?.clone();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0], all[1]);
    assert_eq!(page[1], all[2]);

    // Past the end of the set the page is empty
    let (status, past) = send(&app, Method::GET, "/v1/customers/?skip=10&limit=2", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(past.as_array().map(Vec::len), Some(0));

    // Unspecified input has a defined outcome instead of a database error
    let (status, unlimited) = send(&app, Method::GET, "/v1/customers/?limit=0", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unlimited.as_array().map(Vec::len), Some(5));

    let (status, negative) = send(&app, Method::GET, "/v1/customers/?skip=-3", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(negative.as_array().map(Vec::len), Some(5));

    Ok(())
}

#[tokio::test]
async fn invalid_payloads_are_rejected_without_side_effects() -> Result<()> {
    let _guard = TEST_LOCK.lock().await;
    let Some(app) = test_router().await? else {
        return Ok(());
    };

    // Missing required field is stopped by deserialization
    let mut missing = john();
    missing.as_object_mut().context("draft object")?.remove("last_name");
    let (status, _) = send(&app, Method::POST, "/v1/customers/", Some(missing)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Malformed email is reported by name
    let mut malformed = john();
    malformed["email"] = json!("not-an-email");
    let (status, body) = send(&app, Method::POST, "/v1/customers/", Some(malformed)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], json!(["email"]));

    // Neither attempt left a record behind
    let (status, listed) = send(&app, Method::GET, "/v1/customers/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(0));

    Ok(())
}

#[tokio::test]
async fn wrong_credentials_are_challenged() -> Result<()> {
    let _guard = TEST_LOCK.lock().await;
    let Some(app) = test_router().await? else {
        return Ok(());
    };

    let request = Request::builder()
        .uri("/v1/customers/")
        .header(header::AUTHORIZATION, basic(USERNAME, "wrong"))
        .body(Body::empty())?;

    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok()),
        Some("Basic")
    );

    let request = Request::builder()
        .uri("/v1/customers/")
        .body(Body::empty())?;

    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn lookup_by_unknown_email_is_not_found() -> Result<()> {
    let _guard = TEST_LOCK.lock().await;
    let Some(app) = test_router().await? else {
        return Ok(());
    };

    let (status, body) = send(
        &app,
        Method::GET,
        "/v1/customers/email/ghost@example.com",
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Customer not found");

    Ok(())
}
