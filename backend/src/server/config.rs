//! HTTP server configuration loaded from the environment.
//!
//! Configuration is read once at startup into a typed object; handlers
//! never touch the environment.

use std::net::SocketAddr;

use zeroize::Zeroizing;

/// Environment variable naming the listen address.
const BIND_ADDR_VAR: &str = "BIND_ADDR";
/// Environment variable naming the PostgreSQL connection string.
const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable naming the token signing secret.
const JWT_SECRET_VAR: &str = "JWT_SECRET";
/// Environment variable overriding the token lifetime in hours.
const JWT_TTL_HOURS_VAR: &str = "JWT_TTL_HOURS";
/// Environment variable overriding the connection pool size.
const DB_POOL_MAX_SIZE_VAR: &str = "DB_POOL_MAX_SIZE";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Failures while assembling the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("missing required environment variable {name}")]
    Missing {
        /// The variable's name.
        name: &'static str,
    },
    /// A variable is present but unparseable.
    #[error("invalid value for {name}: {message}")]
    Invalid {
        /// The variable's name.
        name: &'static str,
        /// Why parsing failed.
        message: String,
    },
}

/// Typed server configuration.
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Shared secret signing the bearer tokens.
    pub jwt_secret: Zeroizing<String>,
    /// Token lifetime in hours.
    pub jwt_ttl_hours: i64,
    /// Maximum connections held by the pool.
    pub pool_max_size: u32,
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.parse().map_err(|err| ConfigError::Invalid {
        name: BIND_ADDR_VAR,
        message: format!("{err}"),
    })
}

fn parse_ttl_hours(raw: &str) -> Result<i64, ConfigError> {
    let hours: i64 = raw.parse().map_err(|err| ConfigError::Invalid {
        name: JWT_TTL_HOURS_VAR,
        message: format!("{err}"),
    })?;
    if hours <= 0 {
        return Err(ConfigError::Invalid {
            name: JWT_TTL_HOURS_VAR,
            message: "token lifetime must be positive".to_owned(),
        });
    }
    Ok(hours)
}

fn parse_pool_size(raw: &str) -> Result<u32, ConfigError> {
    let size: u32 = raw.parse().map_err(|err| ConfigError::Invalid {
        name: DB_POOL_MAX_SIZE_VAR,
        message: format!("{err}"),
    })?;
    if size == 0 {
        return Err(ConfigError::Invalid {
            name: DB_POOL_MAX_SIZE_VAR,
            message: "pool size must be positive".to_owned(),
        });
    }
    Ok(size)
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing { name })
}

impl ServerConfig {
    /// Assemble the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` or `JWT_SECRET` are absent or when any
    /// override fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = match std::env::var(BIND_ADDR_VAR) {
            Ok(raw) => parse_bind_addr(&raw)?,
            Err(_) => parse_bind_addr(DEFAULT_BIND_ADDR)?,
        };
        let database_url = required(DATABASE_URL_VAR)?;
        let jwt_secret = Zeroizing::new(required(JWT_SECRET_VAR)?);
        if jwt_secret.is_empty() {
            return Err(ConfigError::Invalid {
                name: JWT_SECRET_VAR,
                message: "secret must not be empty".to_owned(),
            });
        }
        let jwt_ttl_hours = match std::env::var(JWT_TTL_HOURS_VAR) {
            Ok(raw) => parse_ttl_hours(&raw)?,
            Err(_) => backend::outbound::auth::DEFAULT_TTL_HOURS,
        };
        let pool_max_size = match std::env::var(DB_POOL_MAX_SIZE_VAR) {
            Ok(raw) => parse_pool_size(&raw)?,
            Err(_) => DEFAULT_POOL_MAX_SIZE,
        };

        Ok(Self {
            bind_addr,
            database_url,
            jwt_secret,
            jwt_ttl_hours,
            pool_max_size,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn bind_addr_parses_the_default() {
        let addr = parse_bind_addr(DEFAULT_BIND_ADDR).expect("default parses");
        assert_eq!(addr.port(), 8080);
    }

    #[rstest]
    #[case("not-an-address")]
    #[case("8080")]
    fn bind_addr_rejects_garbage(#[case] raw: &str) {
        let err = parse_bind_addr(raw).expect_err("garbage must fail");
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[rstest]
    #[case("24", 24)]
    #[case("1", 1)]
    fn ttl_accepts_positive_hours(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(parse_ttl_hours(raw).expect("valid"), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("soon")]
    fn ttl_rejects_non_positive_or_garbage(#[case] raw: &str) {
        assert!(parse_ttl_hours(raw).is_err());
    }

    #[rstest]
    fn pool_size_rejects_zero() {
        assert!(parse_pool_size("0").is_err());
        assert_eq!(parse_pool_size("25").expect("valid"), 25);
    }
}
