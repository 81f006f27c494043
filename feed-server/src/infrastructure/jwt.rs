use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error("token has no subject")]
    MissingSubject,
}

/// Session claims issued by the identity provider. `sub` is the user id.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) exp: i64,
}

/// Verifies session tokens signed by the identity provider with a shared secret.
pub(crate) struct JwtService {
    secret: String,
}

impl JwtService {
    const LEEWAY_SECONDS: u64 = 10;

    pub(crate) fn new(secret: &str) -> Self {
        JwtService {
            secret: secret.into(),
        }
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = Self::LEEWAY_SECONDS;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(JwtError::Decode)?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(JwtError::MissingSubject);
        }
        Ok(token_data.claims)
    }

    #[cfg(test)]
    pub(crate) fn issue_token(&self, user_id: &str, ttl_seconds: i64) -> String {
        use chrono::{Duration, Utc};
        use jsonwebtoken::{EncodingKey, Header, encode};

        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + Duration::seconds(ttl_seconds)).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("test token must encode")
    }
}
