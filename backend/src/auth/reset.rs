//! Password-reset tokens
//!
//! Self-contained HS256 JWTs signed with the server secret. Nothing is stored
//! server-side, so a token stays usable until it expires.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Reset token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    /// Id of the user allowed to reset their password
    pub reset_password: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Pre-computed keys for reset tokens
#[derive(Clone)]
pub struct ResetTokenService {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    ttl_secs: i64,
}

impl ResetTokenService {
    /// Create the service from the server secret
    ///
    /// Call once at start-up and keep it in `AppState`.
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            ttl_secs,
        }
    }

    /// Issue a reset token for a user, valid from now
    pub fn issue(&self, user_id: i64) -> Result<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a reset token as if the current time were `now`
    pub fn issue_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<String> {
        let exp = now + Duration::seconds(self.ttl_secs);
        let claims = ResetClaims {
            reset_password: user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to generate reset token: {}", e))
    }

    /// Verify a reset token and return the user id it names
    pub fn verify(&self, token: &str) -> Option<i64> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a reset token against the supplied clock
    ///
    /// Every failure (bad encoding, wrong algorithm, bad signature, expiry)
    /// collapses to `None`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<i64> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against `now`
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = match decode::<ResetClaims>(token, &self.decoding, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "reset token rejected");
                return None;
            }
        };

        if claims.exp <= now.timestamp() {
            debug!(user_id = claims.reset_password, "reset token expired");
            return None;
        }

        Some(claims.reset_password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn create_test_service() -> ResetTokenService {
        ResetTokenService::new("test-secret", 600)
    }

    #[test]
    fn test_issue_and_verify() {
        let service = create_test_service();
        let token = service.issue(42).unwrap();
        assert_eq!(service.verify(&token), Some(42));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();
        let issued = Utc::now();
        let token = service.issue_at(42, issued).unwrap();

        assert_eq!(service.verify_at(&token, issued + Duration::seconds(599)), Some(42));
        assert_eq!(service.verify_at(&token, issued + Duration::seconds(600)), None);
        assert_eq!(service.verify_at(&token, issued + Duration::hours(2)), None);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let service = create_test_service();
        let other = ResetTokenService::new("another-secret", 600);
        let token = other.issue(42).unwrap();
        assert_eq!(service.verify(&token), None);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let service = create_test_service();
        let token = service.issue(42).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        let mut claims: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        claims["reset_password"] = serde_json::json!(1);
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(service.verify(&forged), None);
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let service = create_test_service();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let payload = URL_SAFE_NO_PAD.encode(
            format!(r#"{{"reset_password":42,"iat":0,"exp":{}}}"#, exp).as_bytes(),
        );
        let token = format!("{}.{}.", header, payload);
        assert_eq!(service.verify(&token), None);
    }

    #[test]
    fn test_garbage_rejected() {
        let service = create_test_service();
        assert_eq!(service.verify(""), None);
        assert_eq!(service.verify("invalid.token.here"), None);
    }

    #[test]
    fn test_token_is_reusable_until_expiry() {
        let service = create_test_service();
        let token = service.issue(7).unwrap();
        assert_eq!(service.verify(&token), Some(7));
        assert_eq!(service.verify(&token), Some(7));
    }
}
