// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification.
//!
//! Tokens are compact JWTs signed with HMAC-SHA256 under the process-wide
//! secret. They are never stored: validity is recomputed on every request
//! from the signature and the `exp` claim.
//!
//! Expiry is checked here rather than by `jsonwebtoken` so that the clock is
//! an explicit argument (`issue_at` / `verify_at`) and there is no leeway:
//! a token is valid strictly before its `exp` second.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::claims::{Claims, Identity};
use super::error::{AuthError, TokenRejection};
use crate::config::{ConfigError, TokenConfig, JWT_EXPIRATION_ENV, MAX_TOKEN_TTL, MIN_TOKEN_TTL};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Failure to produce a token. Only reachable if the clock or ttl is out of
/// the representable date range, or signing itself fails.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expiry is out of range")]
    ExpiryOutOfRange,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// A freshly signed token and the instant it stops verifying.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies signed session tokens. Immutable once built and
/// shared read-only between requests.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl TokenCodec {
    /// Build a codec from startup configuration.
    ///
    /// # Errors
    /// An empty secret, a ttl under one second or a ttl over
    /// [`MAX_TOKEN_TTL`] is a configuration error. Past this point issuing
    /// only fails if the system clock is near the end of the date range.
    pub fn new(config: &TokenConfig) -> Result<Self, ConfigError> {
        if config.secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if config.ttl < MIN_TOKEN_TTL {
            return Err(ConfigError::TtlTooShort(config.ttl.as_millis()));
        }
        let too_long = || ConfigError::InvalidValue {
            var: JWT_EXPIRATION_ENV,
            value: config.ttl.as_millis().to_string(),
        };
        if config.ttl > MAX_TOKEN_TTL {
            return Err(too_long());
        }
        let ttl = TimeDelta::from_std(config.ttl).map_err(|_| too_long())?;

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Issue a token for `identity` valid from now for the configured ttl.
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        // `exp` is whole seconds; advertise exactly the instant it encodes.
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?
            .timestamp();
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(TokenError::ExpiryOutOfRange)?;

        let claims = Claims {
            sub: identity.as_str().to_string(),
            iat: now.timestamp(),
            exp,
        };
        debug_assert!(claims.exp > claims.iat);

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Verify `token` against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as if the current time were `now`.
    ///
    /// # Errors
    /// Every failure is [`AuthError::InvalidToken`]; the carried
    /// [`TokenRejection`] says why.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| AuthError::InvalidToken(rejection_for(e.kind())))?;
        let claims = data.claims;

        if claims.sub.is_empty() {
            return Err(TokenRejection::MissingClaims.into());
        }
        if !claims.is_live_at(now.timestamp()) {
            return Err(TokenRejection::Expired.into());
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn rejection_for(kind: &ErrorKind) -> TokenRejection {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenRejection::BadSignature,
        ErrorKind::ExpiredSignature => TokenRejection::Expired,
        ErrorKind::MissingRequiredClaim(_) => TokenRejection::MissingClaims,
        _ => TokenRejection::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(3600);

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(&TokenConfig::new(secret, TTL)).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn issued_token_verifies_and_returns_subject() {
        let codec = codec("primary-secret");
        let identity = Identity::from("ana@example.com");

        let issued = codec.issue(&identity).unwrap();
        let claims = codec.verify(&issued.token).unwrap();

        assert_eq!(claims.identity(), identity);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn token_expires_after_ttl() {
        let codec = codec("primary-secret");
        let issued_at = at(1_700_000_000);
        let issued = codec
            .issue_at(&Identity::from("ana@example.com"), issued_at)
            .unwrap();

        let just_before = issued_at + TimeDelta::seconds(3599);
        assert!(codec.verify_at(&issued.token, just_before).is_ok());

        let at_expiry = issued_at + TimeDelta::seconds(3600);
        assert!(matches!(
            codec.verify_at(&issued.token, at_expiry),
            Err(AuthError::InvalidToken(TokenRejection::Expired))
        ));

        let long_after = issued_at + TimeDelta::days(2);
        assert!(matches!(
            codec.verify_at(&issued.token, long_after),
            Err(AuthError::InvalidToken(TokenRejection::Expired))
        ));
    }

    #[test]
    fn token_from_another_secret_never_verifies() {
        let ours = codec("primary-secret");
        let theirs = codec("attacker-secret");

        for subject in ["ana@example.com", "bob@example.com", "", "x", "ünïcødé@example.com"] {
            let forged = theirs.issue(&Identity::from(subject)).unwrap();
            assert!(matches!(
                ours.verify(&forged.token),
                Err(AuthError::InvalidToken(TokenRejection::BadSignature))
            ));
        }
    }

    #[test]
    fn tampered_claims_are_detected() {
        let codec = codec("primary-secret");
        let issued = codec.issue(&Identity::from("ana@example.com")).unwrap();
        let parts: Vec<&str> = issued.token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let forged_claims = format!(
            r#"{{"sub":"bob@example.com","iat":{},"exp":{}}}"#,
            Utc::now().timestamp(),
            Utc::now().timestamp() + 3600
        );
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(forged_claims.as_bytes()),
            parts[2]
        );

        assert!(matches!(
            codec.verify(&forged),
            Err(AuthError::InvalidToken(TokenRejection::BadSignature))
        ));
    }

    #[test]
    fn tokens_from_different_instants_differ_but_both_verify() {
        let codec = codec("primary-secret");
        let identity = Identity::from("ana@example.com");
        let first = codec.issue_at(&identity, at(1_700_000_000)).unwrap();
        let second = codec.issue_at(&identity, at(1_700_000_005)).unwrap();

        assert_ne!(first.token, second.token);

        let now = at(1_700_000_010);
        assert_eq!(codec.verify_at(&first.token, now).unwrap().sub, "ana@example.com");
        assert_eq!(codec.verify_at(&second.token, now).unwrap().sub, "ana@example.com");

        // First expires five seconds before the second.
        let between = at(1_700_003_602);
        assert!(codec.verify_at(&first.token, between).is_err());
        assert!(codec.verify_at(&second.token, between).is_ok());
    }

    #[test]
    fn malformed_input_is_rejected() {
        let codec = codec("primary-secret");
        for token in ["", "not-a-token", "a.b.c", "....", "eyJhbGciOiJIUzI1NiJ9.e30"] {
            assert!(
                matches!(
                    codec.verify(token),
                    Err(AuthError::InvalidToken(TokenRejection::Malformed))
                ),
                "expected malformed for {token:?}"
            );
        }
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let codec = codec("primary-secret");
        let claims = Claims {
            sub: "ana@example.com".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"primary-secret"),
        )
        .unwrap();

        assert!(matches!(
            codec.verify(&token),
            Err(AuthError::InvalidToken(TokenRejection::BadSignature))
        ));
    }

    #[test]
    fn token_without_subject_is_rejected() {
        #[derive(Serialize)]
        struct NoSubject {
            iat: i64,
            exp: i64,
        }

        let codec = codec("primary-secret");
        let token = encode(
            &Header::new(ALGORITHM),
            &NoSubject {
                iat: Utc::now().timestamp(),
                exp: Utc::now().timestamp() + 3600,
            },
            &EncodingKey::from_secret(b"primary-secret"),
        )
        .unwrap();

        assert!(matches!(
            codec.verify(&token),
            Err(AuthError::InvalidToken(
                TokenRejection::Malformed | TokenRejection::MissingClaims
            ))
        ));
    }

    #[test]
    fn advertised_expiry_matches_the_exp_claim() {
        let codec = TokenCodec::new(&TokenConfig::new("primary-secret", Duration::from_secs(10))).unwrap();
        let issued_at = at(1_700_000_000) + TimeDelta::milliseconds(900);
        let issued = codec
            .issue_at(&Identity::from("ana@example.com"), issued_at)
            .unwrap();

        assert_eq!(issued.expires_at, at(1_700_000_010));
        let just_before = issued.expires_at - TimeDelta::milliseconds(1);
        assert!(codec.verify_at(&issued.token, just_before).is_ok());
        assert!(codec.verify_at(&issued.token, issued.expires_at).is_err());
    }

    #[test]
    fn oversized_ttl_is_a_configuration_error() {
        let huge = TokenCodec::new(&TokenConfig::new("s", Duration::from_millis(9_000_000_000_000_000_000)));
        assert!(matches!(
            huge,
            Err(ConfigError::InvalidValue { var: JWT_EXPIRATION_ENV, .. })
        ));

        let longest = TokenCodec::new(&TokenConfig::new("s", MAX_TOKEN_TTL)).unwrap();
        assert!(longest.issue(&Identity::from("ana@example.com")).is_ok());
    }

    #[test]
    fn empty_secret_and_short_ttl_are_configuration_errors() {
        assert!(matches!(
            TokenCodec::new(&TokenConfig::new("", TTL)),
            Err(ConfigError::MissingSecret)
        ));
        assert!(matches!(
            TokenCodec::new(&TokenConfig::new("s", Duration::from_millis(10))),
            Err(ConfigError::TtlTooShort(10))
        ));
    }
}
