use axum::{
    extract::{rejection::FormRejection, State},
    Form, Json,
};
use std::sync::Arc;

use snowthaw_backend::auth::verify_admin;
use snowthaw_backend::models::{LoginForm, TokenResponse};

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /auth/login - 管理员登录，返回访问令牌
pub async fn login(
    State(state): State<Arc<AppState>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Form(form) = form.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if let Err(e) = verify_admin(&state.config.auth, &form.username, &form.password) {
        tracing::warn!("Admin login failed for user {:?}", form.username);
        return Err(e.into());
    }

    let access_token = state.tokens.issue(&form.username);
    tracing::info!("Admin {} logged in", form.username);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
