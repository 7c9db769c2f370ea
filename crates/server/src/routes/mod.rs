//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Liveness
//! GET    /health/ready             - Readiness (database reachable)
//!
//! # Auth (register/login rate limited)
//! POST   /api/auth/register        - Distributor registration (KYC pending)
//! POST   /api/auth/login           - Password login, starts a session
//! POST   /api/auth/logout          - End the session
//! GET    /api/auth/me              - Current account
//!
//! # Catalogue (anonymous, admin, or KYC-approved buyer)
//! GET    /api/products             - Active products (?category=&search=)
//! GET    /api/products/{id}        - Product detail
//! POST   /api/products             - Create (admin)
//! PUT    /api/products/{id}        - Update (admin)
//! DELETE /api/products/{id}        - Deactivate (admin)
//!
//! # Orders (session)
//! GET    /api/orders               - Own orders, or all for admins
//! POST   /api/orders               - Place an order
//! GET    /api/orders/{id}          - Order detail
//! PATCH  /api/orders/{id}          - Status and shipping update (admin)
//!
//! # Invoices (session)
//! GET    /api/invoices/{id}        - Printable tax invoice (HTML)
//!
//! # Admin
//! GET    /api/admin/buyers         - Buyers (?status=)
//! PATCH  /api/admin/buyers         - KYC decision
//! GET    /api/admin/credit         - Credit summary (?buyer_id=)
//! PATCH  /api/admin/credit         - Credit limit / enabled flag
//! POST   /api/admin/credit         - Manual ledger entry
//! GET    /api/admin/stats          - Dashboard numbers
//! POST   /api/admin/promote        - First-admin bootstrap (setup secret)
//!
//! # Seed advisor
//! POST   /api/ai/recommend         - Scored recommendations
//! POST   /api/ai/chat              - Assistant reply
//! ```

pub mod admin;
pub mod ai;
pub mod auth;
pub mod invoices;
pub mod orders;
pub mod products;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{Span, field::Empty};

use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// All `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/invoices", invoices::router())
        .nest("/admin", admin::router())
        .nest("/ai", ai::router())
}

/// The complete application: routes, sessions and the middleware stack.
///
/// Sentry layers are added by the binary so tests run without a hub.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = Empty,
                    )
                })
                .on_response(
                    |response: &axum::response::Response, latency: std::time::Duration, _span: &Span| {
                        tracing::info!(
                            status = response.status().as_u16(),
                            latency_ms = latency.as_millis(),
                            "Request finished"
                        );
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, header::CONTENT_TYPE};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::config::test_config;

    const SETUP_SECRET: &str = "k7#Qm2vX9pL4wR8zT1nB6yH3";

    /// App over a pool that never connects; only routes that reject before
    /// touching the database are exercised here.
    fn test_app() -> Router {
        app_with_config(test_config())
    }

    fn app_with_config(config: crate::config::ServerConfig) -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/seedmart_test")
            .unwrap();
        app(AppState::new(config, pool).unwrap())
    }

    async fn call(method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        call_app(test_app(), method, uri, body).await
    }

    async fn call_app(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "203.0.113.10");
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_owned())))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_session_required() {
        for (method, uri) in [
            (Method::GET, "/api/auth/me"),
            (Method::GET, "/api/orders"),
            (Method::GET, "/api/orders/1"),
            (Method::GET, "/api/invoices/1"),
            (Method::GET, "/api/admin/stats"),
            (Method::GET, "/api/admin/buyers"),
        ] {
            let (status, body) = call(method, uri, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["error"], "Unauthorized");
        }
    }

    #[tokio::test]
    async fn test_admin_writes_require_session() {
        let (status, _) = call(Method::POST, "/api/products", Some("{}")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(Method::PATCH, "/api/orders/1", Some(r#"{"status":"approved"}"#)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_registration_reports_all_fields() {
        let (status, body) = call(
            Method::POST,
            "/api/auth/register",
            Some(r#"{"email":"not-an-email","password":"short","gst_number":"XYZ"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        let fields = body["fields"].as_object().unwrap();
        for field in ["email", "password", "company_name", "gst_number", "pan_number", "state", "pincode"] {
            assert!(fields.contains_key(field), "missing {field}");
        }
    }

    #[tokio::test]
    async fn test_promote_disabled_without_secret() {
        let (status, body) = call(
            Method::POST,
            "/api/admin/promote",
            Some(r#"{"email":"ops@seedmart.in","secret":"anything"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "ADMIN_SETUP_SECRET is not configured on the server.");
    }

    #[tokio::test]
    async fn test_promote_checks_secret_before_email() {
        let mut config = test_config();
        config.admin_setup_secret = Some(secrecy::SecretString::from(SETUP_SECRET.to_owned()));

        let (status, body) = call_app(
            app_with_config(config.clone()),
            Method::POST,
            "/api/admin/promote",
            Some(r#"{"secret":"wrong"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Invalid secret.");

        let (status, body) = call_app(
            app_with_config(config),
            Method::POST,
            "/api/admin/promote",
            Some(&format!(r#"{{"secret":"{SETUP_SECRET}"}}"#)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "email is required.");
    }

    #[tokio::test]
    async fn test_malformed_bodies_get_json_errors() {
        let (status, body) = call(Method::POST, "/api/ai/chat", Some("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        // missing fields reach the handler's own check instead of a 422
        let (status, body) = call(Method::POST, "/api/ai/recommend", Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "state, soil_type and season are required");

        let (status, body) = call(Method::POST, "/api/auth/login", Some(r#"{"email":1}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        // no content type
        let (status, body) = call(Method::POST, "/api/ai/chat", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_advisor_input_checked() {
        let (status, body) = call(Method::POST, "/api/ai/chat", Some(r#"{"message":"   "}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "message is required");

        let (status, _) = call(
            Method::POST,
            "/api/ai/recommend",
            Some(r#"{"state":"Punjab","soil_type":"","season":"Rabi"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
