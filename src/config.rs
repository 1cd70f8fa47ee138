//! Catalog configuration.
//!
//! Precedence: explicit overrides (CLI) > environment > config file > defaults.

use crate::errors::CatalogError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 10_000;
pub const DEFAULT_SLOW_QUERY_MS: u64 = 500;

/// How malformed request parameters are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamPolicy {
    /// Substitute the default (or bound) and keep going.
    #[default]
    Clamp,
    /// Fail with `MalformedParameter`.
    Reject,
}

impl std::str::FromStr for ParamPolicy {
    type Err = CatalogError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "reject" => Ok(Self::Reject),
            other => Err(CatalogError::malformed("param_policy", format!("unknown policy {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    pub param_policy: ParamPolicy,
    pub slow_query_ms: u64,
    pub db_path: Option<PathBuf>,
    pub log_config: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            param_policy: ParamPolicy::Clamp,
            slow_query_ms: DEFAULT_SLOW_QUERY_MS,
            db_path: None,
            log_config: None,
        }
    }
}

impl CatalogConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    /// `MalformedParameter` when the TOML is invalid.
    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        toml::from_str(s).map_err(|e| CatalogError::malformed("config", e.to_string()))
    }

    /// # Errors
    /// `Io` when the file cannot be read, `MalformedParameter` when it does not parse.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Loads the first config file found, then layers environment variables on top.
    ///
    /// Files are tried in order: `explicit`, `$TOURLITE_CONFIG`, `./tourlite.toml`.
    ///
    /// # Errors
    /// Propagates read/parse failures of an existing file and bad env values.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CatalogError> {
        let mut paths: Vec<PathBuf> = Vec::new();
        if let Some(p) = explicit {
            paths.push(p.to_path_buf());
        }
        if let Ok(p) = std::env::var("TOURLITE_CONFIG") {
            paths.push(PathBuf::from(p));
        }
        if let Ok(cur) = std::env::current_dir() {
            paths.push(cur.join("tourlite.toml"));
        }
        let mut cfg = match paths.iter().find(|p| p.exists()) {
            Some(p) => {
                log::debug!("loading config from {}", p.display());
                Self::from_file(p)?
            }
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    /// Overrides fields from environment-style lookups.
    ///
    /// # Errors
    /// `MalformedParameter` for values that do not parse.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), CatalogError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(s) = lookup("TOURLITE_DB") {
            self.db_path = Some(PathBuf::from(s));
        }
        if let Some(s) = lookup("TOURLITE_LOG_CONFIG") {
            self.log_config = Some(PathBuf::from(s));
        }
        if let Some(s) = lookup("TOURLITE_SLOW_QUERY_MS") {
            self.slow_query_ms = s
                .trim()
                .parse()
                .map_err(|_| CatalogError::malformed("TOURLITE_SLOW_QUERY_MS", s.clone()))?;
        }
        if let Some(s) = lookup("TOURLITE_PARAM_POLICY") {
            self.param_policy = s.parse()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = CatalogConfig::from_toml_str("param_policy = \"reject\"\nmax_limit = 50\n").unwrap();
        assert_eq!(cfg.param_policy, ParamPolicy::Reject);
        assert_eq!(cfg.max_limit, 50);
        assert_eq!(cfg.default_limit, DEFAULT_LIMIT);
        assert_eq!(cfg.slow_query_ms, DEFAULT_SLOW_QUERY_MS);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = CatalogConfig::from_toml_str("slow_query_ms = 10").unwrap();
        let env: HashMap<&str, &str> =
            [("TOURLITE_SLOW_QUERY_MS", "42"), ("TOURLITE_PARAM_POLICY", "Reject")].into();
        cfg.apply_env(|k| env.get(k).map(|v| (*v).to_string())).unwrap();
        assert_eq!(cfg.slow_query_ms, 42);
        assert_eq!(cfg.param_policy, ParamPolicy::Reject);
    }

    #[test]
    fn bad_env_value_is_malformed() {
        let mut cfg = CatalogConfig::default();
        let err = cfg.apply_env(|k| (k == "TOURLITE_PARAM_POLICY").then(|| "lenient".into())).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::MalformedParameter);
    }
}
