/*!
common/src/lib.rs

Shared configuration types for the article reader.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file
- Default/override merging so a shipped `config.default.toml` can be partially overridden
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Input and output locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Newline-delimited list of URLs to process (e.g. "urls.txt")
    pub input_path: String,
    /// CSV file receiving one row per URL (e.g. "results.csv"), overwritten on success
    pub output_path: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_path: "urls.txt".to_string(),
            output_path: "results.csv".to_string(),
        }
    }
}

/// HTTP fetching configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchConfig {
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout_seconds: Option<u64>,
    /// Optional User-Agent header; the HTTP client default is used when absent.
    pub user_agent: Option<String>,
}

/// What the pipeline does when a single URL fails
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// First failure ends the run and nothing is written
    #[default]
    Abort,
    /// Failures become rows with an error column; the run continues
    Record,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "record" => Ok(FailurePolicy::Record),
            other => Err(anyhow::anyhow!(
                "unknown failure policy '{}' (expected 'abort' or 'record')",
                other
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => f.write_str("abort"),
            FailurePolicy::Record => f.write_str("record"),
        }
    }
}

/// Pipeline behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    pub on_error: FailurePolicy,
    /// Drop empty lines from the URL list instead of fetching them
    pub skip_blank_lines: bool,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub fetch: FetchConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    /// Missing files are skipped; with neither present the built-in defaults are returned.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    /// Fetch timeout as a `Duration`, if one is configured.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch.timeout_seconds.map(Duration::from_secs)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}
