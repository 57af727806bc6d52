//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

/// Settings for one server run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// YAML graph to load instead of the built-in one.
    pub narrative_path: Option<PathBuf>,
    /// Cap on the number of branches, unbounded when `None`.
    pub max_branches: Option<usize>,
    /// Seed for branch identifiers; OS entropy when `None`.
    pub branch_seed: Option<u64>,
}

impl AppConfig {
    /// Reads `HOST`, `PORT`, `NARRATIVE_PATH`, `MAX_BRANCHES` and `BRANCH_SEED`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };

        let narrative_path = lookup("NARRATIVE_PATH")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        let max_branches = match lookup("MAX_BRANCHES") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => {
                    return Err(AppError::Config(
                        "MAX_BRANCHES must be at least 1".to_string(),
                    ));
                }
                Ok(cap) => Some(cap),
                Err(e) => {
                    return Err(AppError::Config(format!(
                        "MAX_BRANCHES must be a positive integer: {e}"
                    )));
                }
            },
            None => None,
        };

        let branch_seed = lookup("BRANCH_SEED")
            .map(|raw| {
                raw.parse::<u64>()
                    .map_err(|e| AppError::Config(format!("BRANCH_SEED must be a valid u64: {e}")))
            })
            .transpose()?;

        Ok(Self {
            host,
            port,
            narrative_path,
            max_branches,
            branch_seed,
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
