//! Bcrypt implementation of the `PasswordHasher` port.
//!
//! Bcrypt is CPU-bound by design, so both hashing and verification run on
//! the blocking thread pool; handlers await the result without stalling
//! the runtime.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Cost-factor password hasher backed by the `bcrypt` crate.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl BcryptPasswordHasher {
    /// Create a hasher with the default cost factor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher with an explicit cost factor.
    ///
    /// Lower costs are useful in tests; production uses the default.
    #[must_use]
    pub const fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let cost = self.cost;
        let password = Zeroizing::new(password.to_owned());
        let encoded = tokio::task::spawn_blocking(move || bcrypt::hash(&*password, cost))
            .await
            .map_err(|err| PasswordHashError::hash(format!("hashing task failed: {err}")))?
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let encoded = hash.as_str().to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(&*password, &encoded))
            .await
            .map_err(|err| {
                PasswordHashError::verify(format!("verification task failed: {err}"))
            })?
            .map_err(|err| PasswordHashError::verify(err.to_string()))
    }
}
