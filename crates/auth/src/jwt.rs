//! Bearer token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("malformed or unsigned token: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HMAC-SHA256 token verifier sharing a secret with the identity provider.
pub struct Hs256JwtValidator {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window lives in our own claim names and is checked by `validate_claims`.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            decoding: DecodingKey::from_secret(&secret),
            encoding: EncodingKey::from_secret(&secret),
            validation,
        }
    }

    /// Sign claims with the shared secret (dev tooling and tests).
    pub fn issue(&self, claims: &JwtClaims) -> Result<String, JwtError> {
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding,
        )?)
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use chrono::Duration;
    use stocktally_core::AccountId;

    fn claims(role: Role) -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: AccountId::new(),
            role,
            issued_at: now - Duration::seconds(5),
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn issued_token_validates() {
        let v = Hs256JwtValidator::new(b"secret".to_vec());
        let c = claims(Role::Manager);
        let token = v.issue(&c).unwrap();

        let decoded = v.validate(&token, Utc::now()).unwrap();
        assert_eq!(decoded, c);
    }

    #[test]
    fn wrong_secret_rejected() {
        let issuer = Hs256JwtValidator::new(b"one".to_vec());
        let verifier = Hs256JwtValidator::new(b"two".to_vec());
        let token = issuer.issue(&claims(Role::Admin)).unwrap();

        assert!(matches!(verifier.validate(&token, Utc::now()), Err(JwtError::Decode(_))));
    }

    #[test]
    fn expired_token_rejected() {
        let v = Hs256JwtValidator::new(b"secret".to_vec());
        let token = v.issue(&claims(Role::Staff)).unwrap();

        let later = Utc::now() + Duration::hours(1);
        assert!(matches!(
            v.validate(&token, later),
            Err(JwtError::Claims(TokenValidationError::Expired))
        ));
    }
}
