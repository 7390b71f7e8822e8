use std::env;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "storefront.sqlite";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_JWT_TTL_HOURS: i64 = 168;
pub const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Credentials of an admin account created at startup when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let jwt_ttl_hours = parsed(&lookup, "JWT_TTL_HOURS", DEFAULT_JWT_TTL_HOURS)?;
        if jwt_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_HOURS",
                value: jwt_ttl_hours.to_string(),
            });
        }

        let bcrypt_cost = parsed(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            _ => None,
        };

        Ok(Config {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parsed(&lookup, "PORT", DEFAULT_PORT)?,
            jwt_secret,
            jwt_ttl_hours,
            bcrypt_cost,
            admin,
        })
    }
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 4000);
        assert_eq!(config.jwt_ttl_hours, 168);
        assert_eq!(config.bcrypt_cost, 10);
        assert!(config.admin.is_none());
    }

    #[test]
    fn secret_is_required() {
        assert_eq!(config(&[]), Err(ConfigError::Missing("JWT_SECRET")));
        assert_eq!(
            config(&[("JWT_SECRET", "")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        );
    }

    #[test]
    fn bad_port_is_reported() {
        let err = config(&[("JWT_SECRET", "s"), ("PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "PORT has an invalid value 'eighty'"
        );
    }

    #[test]
    fn bcrypt_cost_out_of_range_is_rejected() {
        assert!(config(&[("JWT_SECRET", "s"), ("BCRYPT_COST", "2")]).is_err());
    }

    #[test]
    fn admin_needs_both_email_and_password() {
        let only_email = config(&[("JWT_SECRET", "s"), ("ADMIN_EMAIL", "root@shop.test")]).unwrap();
        assert!(only_email.admin.is_none());

        let both = config(&[
            ("JWT_SECRET", "s"),
            ("ADMIN_EMAIL", "root@shop.test"),
            ("ADMIN_PASSWORD", "changeme"),
        ])
        .unwrap();
        assert_eq!(
            both.admin,
            Some(AdminBootstrap {
                email: "root@shop.test".into(),
                password: "changeme".into(),
            })
        );
    }
}
