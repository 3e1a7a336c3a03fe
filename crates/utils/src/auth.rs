//! Bearer-token verification against the identity provider's signing secret.
//!
//! Tokens are issued elsewhere; this only resolves `Authorization: Bearer`
//! credentials to a user id.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no authorization header")]
    MissingHeader,
    #[error("invalid token")]
    InvalidToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: u64,
}

/// Identity resolved from a valid bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Strip the `Bearer ` scheme from an Authorization header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidToken)
}

/// Validates HS256 bearer tokens with the provider's shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::InvalidToken)?;

        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthUser {
            id,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn mint(secret: &str, sub: &str, exp_offset_secs: i64) -> String {
        let exp = (std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
            + exp_offset_secs) as u64;
        let claims = Claims {
            sub: sub.to_string(),
            email: Some("user@example.com".to_string()),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_resolves_to_the_subject() {
        let id = Uuid::new_v4();
        let token = mint("s3cret", &id.to_string(), 3600);

        let user = TokenVerifier::new("s3cret").verify(&token).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint("s3cret", &Uuid::new_v4().to_string(), 3600);
        let err = TokenVerifier::new("other").verify(&token).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = mint("s3cret", &Uuid::new_v4().to_string(), -3600);
        let err = TokenVerifier::new("s3cret").verify(&token).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let token = mint("s3cret", "not-a-uuid", 3600);
        let err = TokenVerifier::new("s3cret").verify(&token).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn bearer_scheme_is_required() {
        assert_eq!(bearer_token(None).unwrap_err(), AuthError::MissingHeader);
        assert_eq!(
            bearer_token(Some("Basic abc")).unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
    }
}
