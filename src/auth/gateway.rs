//! Write-path gate: only requests carrying a valid admin token pass / 写操作鉴权

use axum::http::{header, HeaderMap};

use super::token::TokenService;
use crate::error::AuthError;

/// Extract the bearer token from the Authorization header / 从请求头中提取Bearer令牌
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Admin gate in front of every write operation
#[derive(Debug, Clone, Copy)]
pub struct AuthGateway<'a> {
    tokens: &'a TokenService,
}

impl<'a> AuthGateway<'a> {
    pub fn new(tokens: &'a TokenService) -> Self {
        Self { tokens }
    }

    /// Returns the admin subject on success / 验证通过时返回管理员用户名
    pub fn authorize(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        let token = extract_bearer_token(headers).ok_or(AuthError::MissingToken)?;
        self.tokens.validate(token)
    }
}
