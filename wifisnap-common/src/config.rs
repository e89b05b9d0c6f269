//! Configuration loading
//!
//! All runtime settings come from one TOML file passed to each binary; nothing
//! is read from ambient process state. The poller and the façade share the
//! file so they agree on the database path.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn default_database_path() -> PathBuf {
    PathBuf::from("wifisnap.db")
}

fn default_command() -> String {
    "show user-table verbose".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_bind_addr() -> String {
    "127.0.0.1:5730".to_string()
}

/// Top-level configuration shared by wifisnap-sync and wifisnap-api
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the shared SQLite database
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    pub fetch: FetchConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

/// Settings for the controller polling pass
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Controller base endpoints, polled in this order
    pub controllers: Vec<String>,

    /// Credentials presented identically to every controller
    pub username: String,
    pub password: String,

    /// Query command sent to every controller
    #[serde(default = "default_command")]
    pub command: String,

    /// Skip remote certificate validation. Controllers on internal networks
    /// commonly present self-signed certificates; operators must opt in to
    /// this relaxed-trust mode explicitly.
    #[serde(default)]
    pub danger_accept_invalid_certs: bool,

    /// Per-request timeout applied to login and query calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Settings for the HTTP façade
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Maps a profile name clients select to the backend profile names it
    /// covers. Profiles without an entry match themselves literally.
    #[serde(default)]
    pub profile_aliases: HashMap<String, Vec<String>>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            profile_aliases: HashMap::new(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.fetch.controllers.is_empty() {
            return Err(Error::Config(
                "fetch.controllers must list at least one endpoint".to_string(),
            ));
        }
        if self.fetch.username.is_empty() {
            return Err(Error::Config("fetch.username must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse(
            r#"
            [fetch]
            controllers = ["https://172.20.254.200:4343"]
            username = "admin"
            password = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("wifisnap.db"));
        assert_eq!(config.fetch.command, "show user-table verbose");
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(!config.fetch.danger_accept_invalid_certs);
        assert_eq!(config.api.bind_addr, "127.0.0.1:5730");
        assert!(config.api.profile_aliases.is_empty());
    }

    #[test]
    fn relaxed_trust_requires_explicit_opt_in() {
        let config = parse(
            r#"
            [fetch]
            controllers = ["https://c1:4343"]
            username = "admin"
            password = "secret"
            danger_accept_invalid_certs = true
            "#,
        )
        .unwrap();

        assert!(config.fetch.danger_accept_invalid_certs);
    }

    #[test]
    fn empty_controller_list_rejected() {
        let err = parse(
            r#"
            [fetch]
            controllers = []
            username = "admin"
            password = "secret"
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn profile_aliases_parse() {
        let config = parse(
            r#"
            [fetch]
            controllers = ["https://c1:4343"]
            username = "admin"
            password = "secret"

            [api.profile_aliases]
            staff = ["staff_aaa_prof", "it-staff_aaa_prof"]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.api.profile_aliases["staff"],
            vec!["staff_aaa_prof", "it-staff_aaa_prof"]
        );
    }
}
