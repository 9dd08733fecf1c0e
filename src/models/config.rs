use crate::error::ConfigError;
use dominant_tiles::Remainder;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// What happens to pixels past the last whole section.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RemainderPolicy {
    /// Trailing remainder is discarded
    #[default]
    Discard,
    /// Remainder is covered by repeating the last row and column
    PadEdge,
}

impl From<RemainderPolicy> for Remainder {
    fn from(policy: RemainderPolicy) -> Self {
        match policy {
            RemainderPolicy::Discard => Remainder::Discard,
            RemainderPolicy::PadEdge => Remainder::PadEdge,
        }
    }
}

/// What a failed section does to the rest of the run.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop handing out sections and fail the run
    #[default]
    Abort,
    /// Finish the other sections and leave failed ones black
    Continue,
}

/// Run configuration loaded from an optional YAML file
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Hardware concurrency fed to the section planner (default: CPU count)
    #[serde(default)]
    pub threads: Option<usize>,

    #[serde(default)]
    pub remainder: RemainderPolicy,

    #[serde(default)]
    pub on_failure: FailurePolicy,

    /// Minimum seconds between two progress lines
    #[serde(default = "default_progress_interval")]
    pub progress_interval_secs: u64,

    /// Re-compress the output PNG with oxipng
    #[serde(default)]
    pub optimize: bool,
}

fn default_progress_interval() -> u64 {
    5
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            threads = ?config.threads,
            remainder = ?config.remainder,
            on_failure = ?config.on_failure,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Hardware concurrency for planning: the configured thread count, or
    /// the number of logical CPUs.
    pub fn hardware_concurrency(&self) -> Result<usize, ConfigError> {
        match self.threads {
            Some(0) => Err(ConfigError::ZeroThreads),
            Some(n) => Ok(n),
            None => Ok(num_cpus::get()),
        }
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }
}

/// Parse a scale factor argument. Only whole numbers of at least 1 pass.
pub fn parse_factor(arg: &str) -> Result<u32, ConfigError> {
    match arg.trim().parse::<u32>() {
        Ok(factor) if factor >= 1 => Ok(factor),
        _ => Err(ConfigError::InvalidFactor(arg.to_string())),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            threads: None,
            remainder: RemainderPolicy::default(),
            on_failure: FailurePolicy::default(),
            progress_interval_secs: default_progress_interval(),
            optimize: false,
        }
    }
}
