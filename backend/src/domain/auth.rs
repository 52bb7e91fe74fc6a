//! Authentication primitives: credentials, registrations and token claims.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{DisplayName, EmailAddress, User, UserId, UserValidationError};

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email failed address validation.
    Email(UserValidationError),
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(inner) => inner.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

impl From<UserValidationError> for CredentialValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::Email(value)
    }
}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` satisfies [`EmailAddress`] validation.
/// - `password` is non-empty but otherwise unaltered, so stored hashes
///   compare against exactly what the caller typed. The buffer is zeroed
///   on drop.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address used for the account lookup.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password exactly as supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// A validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Login credentials for the new account.
    pub credentials: Credentials,
    /// Optional display name.
    pub display_name: Option<DisplayName>,
    /// Optional avatar reference.
    pub avatar: Option<String>,
}

/// Claims carried by an issued access token.
///
/// The token binds the user id and email; everything else about the user is
/// looked up per request so profile changes take effect immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// The authenticated user's id.
    pub user_id: UserId,
    /// The email the token was issued for.
    pub email: EmailAddress,
}

/// An encoded, signed access token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap an encoded token string.
    #[must_use]
    pub const fn new(encoded: String) -> Self {
        Self(encoded)
    }

    /// The encoded token for transport to the client.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

impl From<AccessToken> for String {
    fn from(value: AccessToken) -> Self {
        value.0
    }
}

/// A user record paired with a freshly issued token.
///
/// Returned by registration and login.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    /// The account's public record, hash stripped.
    pub user: User,
    /// Signed, time-limited bearer token.
    pub token: AccessToken,
}

/// Partial profile update as accepted from the owner of an account.
///
/// `None` fields are left untouched. A supplied password is re-hashed by
/// the service before it reaches a repository.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    /// Replacement email, re-checked for uniqueness.
    pub email: Option<EmailAddress>,
    /// Replacement raw password.
    pub password: Option<Zeroizing<String>>,
    /// Replacement display name.
    pub display_name: Option<DisplayName>,
    /// Replacement avatar reference.
    pub avatar: Option<String>,
}

impl ProfileChanges {
    /// Whether the update carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.display_name.is_none()
            && self.avatar.is_none()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw")]
    #[case("not-an-email", "pw")]
    fn credentials_reject_invalid_email(#[case] email: &str, #[case] password: &str) {
        let err =
            Credentials::try_from_parts(email, password).expect_err("invalid email must fail");
        assert!(matches!(err, CredentialValidationError::Email(_)));
    }

    #[rstest]
    fn credentials_reject_empty_password() {
        let err = Credentials::try_from_parts("a@x.com", "").expect_err("empty password");
        assert_eq!(err, CredentialValidationError::EmptyPassword);
    }

    #[rstest]
    fn credentials_preserve_password_whitespace() {
        let creds = Credentials::try_from_parts("a@x.com", "  spaced  ").expect("valid");
        assert_eq!(creds.password(), "  spaced  ");
        assert_eq!(creds.email().as_ref(), "a@x.com");
    }

    #[rstest]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("header.payload.signature".to_owned());
        assert_eq!(format!("{token:?}"), "AccessToken(..)");
    }
}
