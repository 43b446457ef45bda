//! Admin login check against the configured credentials / 管理员登录校验

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Verify admin credentials / 校验管理员账号密码
pub fn verify_admin(config: &AuthConfig, username: &str, password: &str) -> Result<(), AuthError> {
    let user_ok = constant_time_eq(username.as_bytes(), config.admin_username.as_bytes());
    let pass_ok = constant_time_eq(password.as_bytes(), config.admin_password.as_bytes());
    if user_ok & pass_ok {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
