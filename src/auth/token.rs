//! Signed admin access tokens / 管理员访问令牌
//!
//! Tokens use the compact JWS layout `header.claims.signature`, each segment
//! base64url without padding, signed with HMAC-SHA256 over `header.claims`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;

use crate::config::AuthConfig;
use crate::error::{AuthError, ConfigError};

type HmacSha256 = Hmac<Sha256>;

/// Role carried by every token this service issues / 管理员角色
pub const ADMIN_ROLE: &str = "admin";

const TOKEN_ALG: &str = "HS256";
const TOKEN_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Token claims / 令牌声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "sub", default)]
    pub subject: String,
    #[serde(default)]
    pub role: String,
    /// Unix timestamp (seconds) / 过期时间戳
    #[serde(rename = "exp")]
    pub expiry: i64,
}

impl Claims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now.timestamp()
    }

    fn to_json(&self) -> String {
        json!({
            "sub": self.subject,
            "role": self.role,
            "exp": self.expiry,
        })
        .to_string()
    }
}

#[derive(Deserialize)]
struct TokenHeader {
    alg: String,
}

/// Issues and validates admin tokens. Immutable after construction, so one
/// instance is shared across all requests / 令牌服务
#[derive(Clone)]
pub struct TokenService {
    mac: HmacSha256,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_minutes", &self.ttl.num_minutes())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl_minutes: u64) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        let ttl = i64::try_from(ttl_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .ok_or(ConfigError::InvalidTokenLifetime(ttl_minutes))?;
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| ConfigError::MissingSecret)?;
        Ok(Self { mac, ttl })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Self::new(&config.secret_key, config.access_token_expire_minutes)
    }

    /// Configured token lifetime / 令牌有效期
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue an admin token for `subject` / 签发管理员令牌
    pub fn issue(&self, subject: &str) -> String {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> String {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let claims = Claims {
            subject: subject.to_string(),
            role: ADMIN_ROLE.to_string(),
            expiry: expires_at.timestamp(),
        };
        self.encode_payload(&claims.to_json())
    }

    /// Validate a token and return its subject / 校验令牌并返回用户名
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = self.decode(token)?;
        if claims.is_expired_at(now) {
            return Err(AuthError::InvalidToken);
        }
        if claims.role != ADMIN_ROLE || claims.subject.is_empty() {
            return Err(AuthError::Forbidden);
        }
        Ok(claims.subject)
    }

    /// Verify structure and signature, then decode the claims
    fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let segments: Vec<&str> = token.trim().split('.').collect();
        let [header_b64, payload_b64, signature_b64] = segments[..] else {
            return Err(AuthError::InvalidToken);
        };

        let header_bytes = decode_segment(header_b64)?;
        let header: TokenHeader =
            serde_json::from_slice(&header_bytes).map_err(|_| AuthError::InvalidToken)?;
        if header.alg != TOKEN_ALG {
            return Err(AuthError::InvalidToken);
        }

        let signature = decode_segment(signature_b64)?;
        let mut mac = self.mac.clone();
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let payload = decode_segment(payload_b64)?;
        serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidToken)
    }

    fn encode_payload(&self, payload: &str) -> String {
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(TOKEN_HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{}.{}", signing_input, signature)
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::InvalidToken)
}
