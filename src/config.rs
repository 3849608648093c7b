// Configuration for syscall discovery and profile synthesis
//
// Everything that used to be a process-wide default (syslog location, target
// architectures, probe parallelism, runner timeout) is an explicit value here
// and gets passed into constructors.

use crate::profile::is_known_architecture;
use crate::runner::DEFAULT_TIMEOUT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration, usually read from a TOML file
///
/// # Example
/// ```
/// use seccomp_forge::config::Config;
///
/// let config = Config::from_toml_str(r#"
///     [synthesis]
///     architectures = ["amd64", "arm64"]
///
///     [brute_force]
///     max_parallel_probes = 4
/// "#)?;
/// assert_eq!(config.brute_force.max_parallel_probes, Some(4));
/// assert_eq!(config.log.path.to_str(), Some("/var/log/syslog"));
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub synthesis: SynthesisConfig,
    pub brute_force: BruteForceConfig,
    pub runner: RunnerConfig,
}

/// Where audit records are read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/log/syslog"),
        }
    }
}

/// How discovered syscalls are turned into a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Logical architecture names, e.g. `amd64`, `arm64`
    pub architectures: Vec<String>,

    /// Produce no profile at all when discovery found nothing
    ///
    /// When false, an empty discovery yields a profile with zero rules,
    /// which denies every syscall.
    pub nil_profile_for_no_calls: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            architectures: vec!["amd64".to_string()],
            nil_profile_for_no_calls: false,
        }
    }
}

/// Brute-force discovery settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BruteForceConfig {
    /// Simultaneous sandbox runs; defaults to the available parallelism
    pub max_parallel_probes: Option<usize>,

    /// Replaces the built-in candidate universe
    pub candidates: Option<Vec<String>>,
}

/// Settings for [`crate::runner::CommandRunner`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub timeout_secs: u64,
    pub unconstrained_value: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            unconstrained_value: "unconfined".to_string(),
        }
    }
}

impl RunnerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and keys fall back to their defaults.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        // Unknown names are skipped at synthesis time
        for arch in &self.synthesis.architectures {
            if !is_known_architecture(arch) {
                tracing::warn!(architecture = %arch, "unknown architecture ignored");
            }
        }

        if self.brute_force.max_parallel_probes == Some(0) {
            return Err("max_parallel_probes must be >= 1".to_string());
        }

        if let Some(candidates) = &self.brute_force.candidates {
            if candidates.is_empty() {
                return Err("candidates must not be empty when set".to_string());
            }
        }

        if self.runner.timeout_secs == 0 {
            return Err("timeout_secs must be >= 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log.path, PathBuf::from("/var/log/syslog"));
        assert_eq!(config.synthesis.architectures, vec!["amd64"]);
        assert!(!config.synthesis.nil_profile_for_no_calls);
        assert_eq!(config.brute_force.max_parallel_probes, None);
        assert_eq!(config.runner.timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            [log]
            path = "/var/log/kern.log"

            [synthesis]
            nil_profile_for_no_calls = true

            [runner]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.log.path, PathBuf::from("/var/log/kern.log"));
        assert!(config.synthesis.nil_profile_for_no_calls);
        assert_eq!(config.synthesis.architectures, vec!["amd64"]);
        assert_eq!(config.runner.timeout(), Duration::from_secs(5));
        assert_eq!(config.runner.unconstrained_value, "unconfined");
    }

    #[test]
    fn test_rejects_zero_parallelism() {
        let err = Config::from_toml_str("[brute_force]\nmax_parallel_probes = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_parallel_probes"));
    }

    #[test]
    fn test_rejects_empty_candidates() {
        let err = Config::from_toml_str("[brute_force]\ncandidates = []\n").unwrap_err();
        assert!(err.to_string().contains("candidates"));
    }

    #[test]
    fn test_unknown_architectures_accepted() {
        let config = Config::from_toml_str("[synthesis]\narchitectures = [\"sparc\"]\n").unwrap();
        assert_eq!(config.synthesis.architectures, vec!["sparc"]);

        let config = Config::from_toml_str("[synthesis]\narchitectures = []\n").unwrap();
        assert!(config.synthesis.architectures.is_empty());

        assert!(Config::from_toml_str("[synthesis]\narchitectures = [\"sparc\", \"arm64\"]\n").is_ok());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = Config::default();
        config.runner.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[brute_force]\ncandidates = [\"read\", \"write\"]").unwrap();
        let config = Config::from_toml(file.path()).unwrap();
        assert_eq!(
            config.brute_force.candidates,
            Some(vec!["read".to_string(), "write".to_string()])
        );
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_toml("/nonexistent/forge.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
