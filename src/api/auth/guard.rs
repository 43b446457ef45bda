use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

use snowthaw_backend::auth::AuthGateway;

use crate::api::error::ApiError;
use crate::state::AppState;

/// Extractor for admin-only routes, holds the token subject / 管理员鉴权提取器
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        match AuthGateway::new(&state.tokens).authorize(&parts.headers) {
            Ok(subject) => Ok(RequireAdmin(subject)),
            Err(e) => {
                tracing::debug!("Rejected {} {}: {}", parts.method, parts.uri.path(), e);
                Err(e.into())
            }
        }
    }
}
