//! JWT implementation of the `TokenCodec` port.
//!
//! Tokens are HS256-signed and carry `{sub, email, iat, exp}`. Verification
//! is a pure signature-and-expiry check, so any instance validates any
//! request without server-side session state.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenCodec, TokenError};
use crate::domain::{AccessToken, EmailAddress, TokenClaims, UserId};

/// Default token lifetime in hours.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Wire shape of the signed claims.
#[derive(Debug, Serialize, Deserialize)]
struct ClaimsDto {
    /// Subject: the user's numeric id.
    sub: i32,
    /// Email bound into the token at issuance.
    email: String,
    /// Issued-at, seconds since the epoch.
    iat: i64,
    /// Expiry, seconds since the epoch.
    exp: i64,
}

/// HS256 token codec with a fixed time-to-live.
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenCodec {
    /// Create a codec from a shared secret and token lifetime.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    /// Create a codec with the default 24-hour lifetime.
    #[must_use]
    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::hours(DEFAULT_TTL_HOURS))
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, claims: &TokenClaims) -> Result<AccessToken, TokenError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let dto = ClaimsDto {
            sub: claims.user_id.get(),
            email: claims.email.as_ref().to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let encoded = encode(&Header::default(), &dto, &self.encoding)
            .map_err(|err| TokenError::issue(err.to_string()))?;
        Ok(AccessToken::new(encoded))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = decode::<ClaimsDto>(token, &self.decoding, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            },
        )?;

        let email =
            EmailAddress::new(data.claims.email).map_err(|_| TokenError::Invalid)?;
        Ok(TokenClaims {
            user_id: UserId::new(data.claims.sub),
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    const SECRET: &[u8] = b"test-secret";

    fn claims() -> TokenClaims {
        TokenClaims {
            user_id: UserId::new(7),
            email: EmailAddress::new("a@x.com").expect("valid email"),
        }
    }

    #[rstest]
    fn issued_token_verifies_with_same_secret() {
        let codec = JwtTokenCodec::with_default_ttl(SECRET);
        let token = codec.issue(&claims()).expect("issue succeeds");

        let verified = codec.verify(token.as_str()).expect("verify succeeds");
        assert_eq!(verified.user_id.get(), 7);
        assert_eq!(verified.email.as_ref(), "a@x.com");
    }

    #[rstest]
    fn token_signed_with_another_secret_is_invalid() {
        let codec = JwtTokenCodec::with_default_ttl(SECRET);
        let other = JwtTokenCodec::with_default_ttl(b"different-secret");
        let token = other.issue(&claims()).expect("issue succeeds");

        let err = codec
            .verify(token.as_str())
            .expect_err("foreign signature must fail");
        assert_eq!(err, TokenError::Invalid);
    }

    #[rstest]
    fn tampered_token_is_invalid() {
        let codec = JwtTokenCodec::with_default_ttl(SECRET);
        let token = codec.issue(&claims()).expect("issue succeeds");
        let tampered = format!("{}x", token.as_str());

        let err = codec
            .verify(&tampered)
            .expect_err("tampered token must fail");
        assert_eq!(err, TokenError::Invalid);
    }

    #[rstest]
    fn expired_token_reports_expiry() {
        // Issue a token whose validity window already passed. The default
        // validation leeway is 60 seconds, so go well beyond it.
        let codec = JwtTokenCodec::new(SECRET, Duration::hours(-2));
        let token = codec.issue(&claims()).expect("issue succeeds");

        let err = codec
            .verify(token.as_str())
            .expect_err("expired token must fail");
        assert_eq!(err, TokenError::Expired);
    }

    #[rstest]
    fn garbage_is_invalid() {
        let codec = JwtTokenCodec::with_default_ttl(SECRET);
        let err = codec
            .verify("not-a-token")
            .expect_err("garbage must fail");
        assert_eq!(err, TokenError::Invalid);
    }
}
