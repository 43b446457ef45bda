//! Admin authentication / 管理员认证
//!
//! - token: issue and validate signed admin tokens
//! - credentials: login check against configured admin account
//! - gateway: bearer-token gate for write operations

pub mod credentials;
pub mod gateway;
pub mod token;

pub use credentials::verify_admin;
pub use gateway::{extract_bearer_token, AuthGateway};
pub use token::{Claims, TokenService, ADMIN_ROLE};
