use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use portal_types::{AuthError, Error, Result};
use serde::{Deserialize, Serialize};

/// Bearer token claims: subject is the account id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub iat: usize,
    pub exp: usize,
}

/// Issues and validates HS256 bearer tokens. Holds the signing secret
/// and the configured TTL; the clock is a parameter so expiry can be
/// tested deterministically.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl_minutes: i64) -> Self {
        Self { secret: secret.into(), ttl: Duration::minutes(ttl_minutes) }
    }

    pub fn issue(&self, account_id: i64) -> Result<String> {
        self.issue_at(account_id, Utc::now())
    }

    pub fn issue_at(&self, account_id: i64, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: account_id,
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| Error::Storage(format!("token signing failed: {e}")))
    }

    /// Expired and malformed are distinct failures for logging, though
    /// both surface to clients as plain "unauthenticated".
    pub fn verify(&self, token: &str) -> Result<i64> {
        // Zero leeway: a token is invalid the second its exp passes.
        let mut validation = Validation::default();
        validation.leeway = 0;

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => Ok(data.claims.sub),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(AuthError::Expired.into()),
                _ => Err(AuthError::Malformed.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 30)
    }

    #[test]
    fn issue_then_verify_within_ttl() {
        let tokens = service();
        let token = tokens.issue(17).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), 17);
    }

    #[test]
    fn token_expires_after_ttl() {
        let tokens = service();
        // Issued 31 minutes in the past with a 30-minute TTL.
        let past = Utc::now() - Duration::minutes(31);
        let token = tokens.issue_at(9, past).unwrap();

        let err = tokens.verify(&token).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Expired)));
    }

    #[test]
    fn garbage_is_malformed_not_expired() {
        let err = service().verify("not.a.token").unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Malformed)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = service().issue(17).unwrap();
        let other = TokenService::new("different-secret", 30);
        assert!(matches!(other.verify(&token), Err(Error::Auth(AuthError::Malformed))));
    }
}
