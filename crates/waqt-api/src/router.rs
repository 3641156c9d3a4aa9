//! Route configuration

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        Method,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put, MethodRouter},
    BoxError, Router,
};
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use waqt_gate::Schema;

use crate::error::ApiError;
use crate::handlers;
use crate::middleware::{auth_middleware, validation_middleware, BodySchema};
use crate::state::AppState;

/// Create the application router
///
/// ## Routes
/// - GET /health - Health check (no authentication)
/// - `/api/v1/auth` - guarded by the authentication gate, except for the
///   configured exclusions (signup, login, Google login and callback)
///   - POST /signup, /login, /google/login, /google/callback, /logout
///   - GET /me
/// - `/api/v1/settings` - always authenticated
///   - GET /
///   - PUT /update
///
/// Within a guarded router the authentication layer wraps each route's
/// validation layer, so a request is authenticated before its body is read.
pub fn create_router(state: AppState) -> Router {
    let limit = state.max_body_bytes;
    let schemas = &state.schemas;

    let auth_routes = Router::new()
        .route("/signup", validated(post(handlers::signup), &schemas.signup, limit))
        .route("/login", validated(post(handlers::login), &schemas.login, limit))
        .route(
            "/google/login",
            validated(post(handlers::google_login), &schemas.google_login, limit),
        )
        .route(
            "/google/callback",
            validated(post(handlers::google_callback), &schemas.google_callback, limit),
        )
        .route("/logout", validated(post(handlers::logout), &schemas.logout, limit))
        .route("/me", get(handlers::me))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.auth_gate),
            auth_middleware,
        ));

    let settings_routes = Router::new()
        .route("/", get(handlers::get_settings))
        .route(
            "/update",
            validated(put(handlers::update_settings), &schemas.settings_update, limit),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.strict_gate),
            auth_middleware,
        ));

    let router = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/settings", settings_routes);

    with_service_layers(router, state.request_timeout)
}

/// Tracing, panic recovery, the request timeout and CORS, around every route.
fn with_service_layers(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(HandleErrorLayer::new(handle_layer_error))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(cors_layer()),
    )
}

/// Bind a body schema to a route.
fn validated(route: MethodRouter, schema: &Arc<Schema>, max_body_bytes: usize) -> MethodRouter {
    route.layer(middleware::from_fn_with_state(
        BodySchema::new(Arc::clone(schema), max_body_bytes),
        validation_middleware,
    ))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_headers([ORIGIN, CONTENT_TYPE, ACCEPT, AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

async fn handle_layer_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("request timed out");
        ApiError::Timeout
    } else {
        tracing::error!(error = %err, "unhandled service error");
        ApiError::Internal
    }
}

fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    ApiError::Internal.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};
    use tower::ServiceExt; // For `oneshot`

    use crate::config::AppConfig;

    const SECRET: &str = "router-test-secret";

    fn app() -> Router {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = SECRET.to_string();
        create_router(AppState::new(&config).unwrap())
    }

    fn bearer(id: &str) -> String {
        let token = encode(
            &Header::default(),
            &json!({ "id": id, "exp": Utc::now().timestamp() + 600 }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        format!("Bearer {token}")
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let (status, body) = send(Request::builder().uri("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, _) = send(Request::builder().uri("/notfound").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_signup_is_excluded_from_auth() {
        let body = r#"{"email":"a@b.com","password":"longenough","username":"ada","first_name":"Ada"}"#;
        let (status, body) = send(post_json("/api/v1/auth/signup", None, body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "SignUp successful" }));
    }

    #[tokio::test]
    async fn test_login_validation_errors() {
        let (status, body) = send(post_json(
            "/api/v1/auth/login",
            None,
            r#"{"identifier":"","password":"123"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "errors": ["identifier is required", "password must be at least 8"] })
        );
    }

    #[tokio::test]
    async fn test_login_malformed_body() {
        let (status, body) = send(post_json("/api/v1/auth/login", None, "{")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid request body" }));
    }

    #[tokio::test]
    async fn test_google_callback_excluded() {
        let (status, body) =
            send(post_json("/api/v1/auth/google/callback", None, r#"{"code":"abc"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Google callback successful" }));
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let (status, body) =
            send(Request::builder().uri("/api/v1/auth/me").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Missing authorization token" }));
    }

    #[tokio::test]
    async fn test_me_returns_identity() {
        let request = Request::builder()
            .uri("/api/v1/auth/me")
            .header(AUTHORIZATION, bearer("user-123"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": "user-123" }));
    }

    #[tokio::test]
    async fn test_auth_runs_before_validation() {
        // Invalid body and no token: the authentication rejection wins.
        let (status, body) = send(post_json("/api/v1/auth/logout", None, "{")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Missing authorization token" }));
    }

    #[tokio::test]
    async fn test_logout_with_token() {
        let token = bearer("user-1");
        let (status, body) = send(post_json("/api/v1/auth/logout", Some(&token), "{}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Logout successful" }));
    }

    #[tokio::test]
    async fn test_settings_always_authenticated() {
        let (status, _) =
            send(Request::builder().uri("/api/v1/settings").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/api/v1/settings")
            .header(AUTHORIZATION, bearer("user-1"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body, json!({ "error": "Not implemented" }));
    }

    #[tokio::test]
    async fn test_settings_update_validated() {
        let token = bearer("user-1");
        let request = Request::builder()
            .method("PUT")
            .uri("/api/v1/settings/update")
            .header(AUTHORIZATION, token.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"theme_reference":"dark","task_reminder_inter":0}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "errors": ["task_reminder_inter must be at least 1"] })
        );
    }

    #[tokio::test]
    async fn test_timeout_renders_json() {
        let slow = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "done"
            }),
        );
        let app = with_service_layers(slow, Duration::from_millis(20));

        let response = app
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Request timed out" }));
    }

    #[tokio::test]
    async fn test_fast_request_within_timeout() {
        let fast = Router::new().route("/fast", get(|| async { "done" }));
        let app = with_service_layers(fast, Duration::from_secs(5));
        let response = app
            .oneshot(Request::builder().uri("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/v1/auth/me")
            .header(ORIGIN, "https://app.example.com")
            .header("access-control-request-method", "GET")
            .header("access-control-request-headers", "authorization")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
