/// JWT validation for blog-service
///
/// Tokens are issued by the identity provider; this service only validates
/// them. RS256 with the provider's public key is preferred. HS256 with a
/// shared secret is accepted when no public key is configured.
use crate::config::AuthConfig;
use crate::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims read from an access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    cookie_name: String,
}

impl JwtValidator {
    pub fn rs256(
        public_key_pem: &str,
        cookie_name: &str,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            decoding_key: DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?,
            validation: Validation::new(Algorithm::RS256),
            cookie_name: cookie_name.to_string(),
        })
    }

    pub fn hs256(secret: &str, cookie_name: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            cookie_name: cookie_name.to_string(),
        }
    }

    /// Build the validator from config. `None` when no key is configured.
    pub fn from_config(config: &AuthConfig) -> Result<Option<Self>, jsonwebtoken::errors::Error> {
        if let Some(pem) = &config.jwt_public_key_pem {
            return Self::rs256(pem, &config.cookie_name).map(Some);
        }
        Ok(config
            .jwt_secret
            .as_deref()
            .map(|secret| Self::hs256(secret, &config.cookie_name)))
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Validate a token and return the user it was issued to
    pub fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("token rejected: {}", e);
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user ID".to_string()))
    }
}
