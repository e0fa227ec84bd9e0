use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{GameFitError, Result};
use crate::matching::{MatchOptions, SelectionPolicy};

/// Runtime configuration, read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database path (`DB_PATH`)
    pub db_path: String,
    /// HTTP port (`PORT`)
    pub port: u16,
    /// Optional seed document applied at startup (`SEED_PATH`)
    pub seed_path: Option<String>,
    /// Requirement-set selection policy (`MATCH_POLICY`: `best` or `first`)
    pub policy: SelectionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "gamefit.db".to_string(),
            port: 8090,
            seed_path: None,
            policy: SelectionPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            db_path: lookup("DB_PATH").unwrap_or(defaults.db_path),
            port: parse_or("PORT", lookup("PORT"), defaults.port)?,
            seed_path: lookup("SEED_PATH").filter(|p| !p.trim().is_empty()),
            policy: parse_or("MATCH_POLICY", lookup("MATCH_POLICY"), defaults.policy)?,
        })
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions { policy: self.policy }
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match value {
        None => {
            tracing::debug!("{} not set, using default: {}", key, default);
            Ok(default)
        }
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| GameFitError::Config(format!("Invalid {} value '{}': {}", key, raw, e))),
    }
}
