pub mod articles;
pub mod auth;
pub mod cards;
pub mod error;
pub mod server;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use snowthaw_backend::config::CorsConfig;

use crate::state::AppState;

/// Upload body limit / 上传大小限制
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Build the application router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/health", get(server::health_check))
        .route("/auth/login", post(auth::login))
        .route("/admin/cards", post(cards::create_card))
        .route("/admin/cards/upload", post(cards::upload_cards))
        .route("/articles/search", get(articles::search_articles))
        .route("/articles/:id", get(articles::get_article))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Permissive when no origin is configured / 未配置来源时放行全部
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.frontend_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use snowthaw_backend::auth::TokenService;
    use snowthaw_backend::config::AppConfig;
    use snowthaw_backend::store::StoreHandle;

    const BOUNDARY: &str = "snowthaw-test-boundary";

    fn test_state() -> Arc<AppState> {
        let config = AppConfig::default();
        let tokens = TokenService::new("test-secret", 60).unwrap();
        Arc::new(AppState::new(config, tokens, StoreHandle::lazy("sqlite::memory:")))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    fn json_request(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, bearer(token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn multipart_request(token: &str, files: &[(&str, &str, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (field, filename, data) in files {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    field, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: text/plain\r\n\r\n");
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/admin/cards/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .header(header::AUTHORIZATION, bearer(token))
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let state = test_state();
        let response = router(state).oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["store_initialized"], false);
    }

    #[tokio::test]
    async fn test_login() {
        let state = test_state();

        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=admin&password=admin123"))
            .unwrap();
        let response = router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["token_type"], "bearer");
        let token = body["access_token"].as_str().unwrap();
        assert_eq!(state.tokens.validate(token).unwrap(), "admin");
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=admin&password=nope"))
            .unwrap();
        let response = router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_admin_routes_require_token() {
        let state = test_state();
        let body = json!({"name": "Alice", "story": "remembers the snow"});

        let response = router(state.clone())
            .oneshot(json_request("/admin/cards", None, body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let foreign = TokenService::new("other-secret", 60).unwrap().issue("admin");
        let response = router(state.clone())
            .oneshot(json_request("/admin/cards", Some(&foreign), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Rejected before the store is touched
        assert!(!state.store.is_initialized());
    }

    #[tokio::test]
    async fn test_create_then_search_and_fetch() {
        let state = test_state();
        let token = state.tokens.issue("admin");

        let response = router(state.clone())
            .oneshot(json_request(
                "/admin/cards",
                Some(&token),
                json!({"name": "Alice", "story": "remembers the Snow"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let card = body_json(response).await;
        assert_eq!(card["name"], "Alice");
        assert_eq!(card["type"], "remembrance");
        let id = card["id"].as_str().unwrap().to_string();

        let response = router(state.clone())
            .oneshot(get_request("/articles/search?q=snow"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["query"], "snow");
        assert_eq!(body["total"], 1);
        assert_eq!(body["results"][0]["id"], id.as_str());
        assert_eq!(body["results"][0]["name"], "Alice");

        let response = router(state.clone())
            .oneshot(get_request(&format!("/articles/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["story"], "remembers the Snow");

        let response = router(state)
            .oneshot(get_request("/articles/does-not-exist"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_card_validation() {
        let state = test_state();
        let token = state.tokens.issue("admin");

        let response = router(state.clone())
            .oneshot(json_request("/admin/cards", Some(&token), json!({"name": "", "story": "x"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router(state)
            .oneshot(json_request("/admin/cards", Some(&token), json!({"name": "Alice"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let state = test_state();

        let response = router(state.clone())
            .oneshot(get_request("/articles/search"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router(state)
            .oneshot(get_request("/articles/search?q=%20%20"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["detail"], "Query is required");
    }

    #[tokio::test]
    async fn test_upload_and_filter_by_type() {
        let state = test_state();
        let token = state.tokens.issue("admin");

        let response = router(state.clone())
            .oneshot(multipart_request(
                &token,
                &[
                    ("files", "a.txt", b"first snow"),
                    ("files", "b.txt", b"second snow"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["inserted"], 2);
        assert_eq!(body["names"], json!(["a", "b"]));

        let response = router(state.clone())
            .oneshot(get_request("/articles/search?q=SNOW&types=remembrance"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["results"][0]["name"], "a");
        assert_eq!(body["results"][1]["name"], "b");

        let response = router(state)
            .oneshot(get_request("/articles/search?q=snow&types=letter"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["total"], 0);
    }

    #[tokio::test]
    async fn test_upload_without_files() {
        let state = test_state();
        let token = state.tokens.issue("admin");

        let response = router(state).oneshot(multipart_request(&token, &[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["detail"], "No files uploaded");
    }

    #[tokio::test]
    async fn test_input_errors_do_not_need_the_store() {
        let tokens = TokenService::new("test-secret", 60).unwrap();
        let token = tokens.issue("admin");
        let store = StoreHandle::lazy("sqlite:/nonexistent-dir/for/sure/cards.db");
        let state = Arc::new(AppState::new(AppConfig::default(), tokens, store));

        let response = router(state.clone())
            .oneshot(get_request("/articles/search?q=%20"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router(state.clone())
            .oneshot(multipart_request(&token, &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router(state.clone())
            .oneshot(json_request("/admin/cards", Some(&token), json!({"name": "", "story": "x"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // A valid query does reach the store and reports its failure
        let response = router(state.clone())
            .oneshot(get_request("/articles/search?q=snow"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!state.store.is_initialized());
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        let config = CorsConfig {
            frontend_origins: vec!["http://localhost:5173".into(), "bad\norigin".into()],
        };
        // Construction must not panic on an invalid entry
        let _ = cors_layer(&config);
    }
}
