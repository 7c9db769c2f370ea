//! Integration tests for SeedMart.
//!
//! The tests drive a running server over HTTP and expect the demo data from
//! `sm-cli seed`. They are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! sm-cli migrate && sm-cli seed
//! cargo run -p seedmart-server &
//! cargo test -p seedmart-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `SEEDMART_TEST_URL` - Server base URL (default `http://localhost:3000`)

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use uuid::Uuid;

/// Demo admin created by `sm-cli seed`.
pub const ADMIN: (&str, &str) = ("admin@seedsco.com", "admin123");
/// Demo buyer in the seller's state, credit enabled.
pub const INTRA_STATE_BUYER: (&str, &str) = ("buyer@test.com", "buyer123");
/// Demo buyer outside the seller's state, credit disabled.
pub const INTER_STATE_BUYER: (&str, &str) = ("punjab@test.com", "buyer123");

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("SEEDMART_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client with its own cookie jar, so each one holds a separate session.
///
/// Every client also claims its own `X-Forwarded-For` address so the
/// per-IP limiter on the auth routes does not throttle the suite.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client() -> Client {
    let [a, b, c, ..] = Uuid::new_v4().into_bytes();
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&format!("10.{a}.{b}.{c}")).expect("Invalid header value"),
    );

    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// A client logged in as the given account.
///
/// # Panics
///
/// Panics if the login request fails or is rejected.
pub async fn logged_in((email, password): (&str, &str)) -> Client {
    let client = client();
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(resp.status(), StatusCode::OK, "login failed for {email}");
    client
}

/// A complete registration body for `email`.
#[must_use]
pub fn registration(email: &str) -> Value {
    json!({
        "email": email,
        "password": "Seeds2024",
        "company_name": "Integration Agro",
        "phone": "9876543210",
        "gst_number": "27AABCU9603R1ZX",
        "pan_number": "AABCU9603R",
        "state": "Maharashtra",
        "district": "Pune",
        "pincode": "411001",
        "address": "1 Test Road"
    })
}

/// Register a fresh buyer, approve their KYC and enable credit up to
/// `credit_limit`. Returns the buyer's logged-in client and id.
///
/// A fresh account keeps credit assertions independent of other tests.
///
/// # Panics
///
/// Panics if any step is rejected.
pub async fn credit_buyer(admin: &Client, credit_limit: &str) -> (Client, Value) {
    let base = base_url();
    let email = format!("credit-{}@example.com", Uuid::new_v4().simple());

    let resp = client()
        .post(format!("{base}/api/auth/register"))
        .json(&registration(&email))
        .send()
        .await
        .expect("Failed to register");
    let body = expect_json(resp, StatusCode::CREATED).await;
    let buyer_id = body["user_id"].clone();

    let resp = admin
        .patch(format!("{base}/api/admin/buyers"))
        .json(&json!({ "buyer_id": buyer_id, "kyc_status": "approved" }))
        .send()
        .await
        .expect("Failed to approve KYC");
    expect_json(resp, StatusCode::OK).await;

    let resp = admin
        .patch(format!("{base}/api/admin/credit"))
        .json(&json!({
            "buyer_id": buyer_id,
            "credit_limit": credit_limit,
            "credit_enabled": true
        }))
        .send()
        .await
        .expect("Failed to update credit");
    expect_json(resp, StatusCode::OK).await;

    (logged_in((&email, "Seeds2024")).await, buyer_id)
}

/// `GET /api/admin/credit` for one buyer.
///
/// # Panics
///
/// Panics if the request is rejected.
pub async fn credit_position(admin: &Client, buyer_id: &Value) -> Value {
    let resp = admin
        .get(format!("{}/api/admin/credit?buyer_id={buyer_id}", base_url()))
        .send()
        .await
        .expect("Failed to fetch credit summary");
    expect_json(resp, StatusCode::OK).await
}

/// Parse a decimal amount serialized as a JSON string.
///
/// # Panics
///
/// Panics if `value` is not a decimal string.
#[must_use]
pub fn amount(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("not an amount: {value}"))
}

/// Decode a JSON body, asserting the status first.
///
/// # Panics
///
/// Panics on a status mismatch or a body that is not JSON.
pub async fn expect_json(resp: Response, status: StatusCode) -> Value {
    let actual = resp.status();
    let body: Value = resp.json().await.expect("Response body is not JSON");
    assert_eq!(actual, status, "unexpected status, body: {body}");
    body
}
