use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::config::jwt::JwtConfig;

/// Tokens from any other issuer are refused even if the secret matches.
pub const ISSUER: &str = "hexagon";

static JWT_CONFIG: OnceLock<JwtConfig> = OnceLock::new();

/// Must be called once at startup before any token is issued or checked.
pub fn init_jwt_config(config: JwtConfig) -> Result<()> {
    JWT_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("JWT config already initialized"))
}

fn get_config() -> Result<&'static JwtConfig> {
    JWT_CONFIG
        .get()
        .context("JWT config not initialized, call init_jwt_config() at startup")
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

pub fn encode_access_token(user_id: i32) -> Result<String> {
    let config = get_config()?;
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        iss: ISSUER.to_string(),
        exp: now + config.access_token_expiry as usize,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .context("Failed to encode access token")
}

pub fn decode_jwt(token: &str) -> Result<Claims> {
    let config = get_config()?;
    let mut validation = Validation::default();
    validation.set_issuer(&[ISSUER]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .context("Failed to decode JWT")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    fn ensure_config() {
        INIT.call_once(|| {
            let _ = init_jwt_config(JwtConfig {
                secret: "a_very_long_secret_key_that_is_at_least_32_chars".to_string(),
                access_token_expiry: 600,
            });
        });
    }

    fn sign(claims: &Claims) -> String {
        let secret = &get_config().unwrap().secret;
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_carries_user_id() {
        ensure_config();
        let token = encode_access_token(42).unwrap();
        let claims = decode_jwt(&token).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn foreign_issuer_is_refused() {
        ensure_config();
        let now = chrono::Utc::now().timestamp() as usize;
        let token = sign(&Claims {
            sub: "42".to_string(),
            iss: "someone-else".to_string(),
            exp: now + 600,
            iat: now,
        });
        assert!(decode_jwt(&token).is_err());
    }

    #[test]
    fn expired_token_fails() {
        ensure_config();
        let now = chrono::Utc::now().timestamp() as usize;
        let token = sign(&Claims {
            sub: "42".to_string(),
            iss: ISSUER.to_string(),
            exp: now - 3600,
            iat: now - 7200,
        });
        assert!(decode_jwt(&token).is_err());
    }

    #[test]
    fn non_numeric_subject_has_no_user() {
        let claims = Claims {
            sub: "admin".to_string(),
            iss: ISSUER.to_string(),
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.user_id(), None);
    }
}
