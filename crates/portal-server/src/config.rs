use std::path::PathBuf;

use portal_db::StorePaths;
use portal_types::{Error, Result};

/// Server configuration, read from the environment once at startup.
/// Every value has a development default; production deployments are
/// expected to set at least `PORTAL_JWT_SECRET`.
pub struct Config {
    pub store_paths: StorePaths,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            store_paths: StorePaths {
                account: path_var("PORTAL_ACCOUNT_DB", "account.db"),
                player: path_var("PORTAL_PLAYER_DB", "player.db"),
                app: path_var("PORTAL_APP_DB", "app.db"),
                admin: path_var("PORTAL_ADMIN_DB", "admin.db"),
            },
            jwt_secret: std::env::var("PORTAL_JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-me".into()),
            token_ttl_minutes: parse_var("PORTAL_TOKEN_TTL_MINUTES", 30)?,
            host: std::env::var("PORTAL_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("PORTAL_PORT", 8000)?,
        })
    }
}

fn path_var(name: &str, default: &str) -> PathBuf {
    PathBuf::from(std::env::var(name).unwrap_or_else(|_| default.into()))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Configuration(format!("{name} has invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_port_is_a_configuration_error() {
        assert!(parse_var::<u16>("PORTAL_TEST_UNSET", 8000).is_ok());

        // SAFETY: test-local variable, no other thread reads it.
        unsafe { std::env::set_var("PORTAL_TEST_BAD_PORT", "not-a-port") };
        let err = parse_var::<u16>("PORTAL_TEST_BAD_PORT", 8000).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        unsafe { std::env::remove_var("PORTAL_TEST_BAD_PORT") };
    }
}
