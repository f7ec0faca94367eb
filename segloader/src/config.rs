//! Downloader settings and the optional `config.ini` file.
//!
//! Settings resolve in three layers: built-in defaults, then the config file,
//! then command-line overrides applied by the caller.
//!
//! ```ini
//! [download]
//! max_retries = 3
//! retry_backoff_ms = 3000
//! timeout_secs = 30
//! user_agent = segloader/0.1
//!
//! [output]
//! directory = /srv/media
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

/// Consecutive failures tolerated on one chunk before the job gives up.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pause between attempts on the same chunk, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 3000;

/// Per-request HTTP timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Folder downloads land in when nothing else is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = concat!("segloader/", env!("CARGO_PKG_VERSION"));

/// Errors reading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or parsed as INI.
    #[error("failed to read config {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// A key holds a value of the wrong shape.
    #[error("invalid value {value:?} for [{section}] {key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

/// Settings for the transfer loop and its HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderConfig {
    /// Consecutive failures on one chunk that end the job.
    pub max_retries: u32,

    /// Wait between attempts on the same chunk.
    pub retry_backoff: Duration,

    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DownloaderConfig {
    /// Set the retry bound. A bound of zero is treated as one.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the backoff between attempts.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set the HTTP request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Contents of `config.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// Download settings.
    pub download: DownloaderConfig,

    /// Output directory from `[output] directory`, if set.
    pub output_dir: Option<PathBuf>,
}

impl ConfigFile {
    /// Default location: `<config dir>/segloader/config.ini`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("segloader").join("config.ini"))
    }

    /// Load the config from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load the config from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse config from INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("download")) {
            if let Some(v) = section.get("max_retries") {
                config.download = config
                    .download
                    .with_max_retries(parse_value("download", "max_retries", v)?);
            }
            if let Some(v) = section.get("retry_backoff_ms") {
                let ms: u64 = parse_value("download", "retry_backoff_ms", v)?;
                config.download.retry_backoff = Duration::from_millis(ms);
            }
            if let Some(v) = section.get("timeout_secs") {
                let secs: u64 = parse_value("download", "timeout_secs", v)?;
                config.download.request_timeout = Duration::from_secs(secs);
            }
            if let Some(v) = section.get("user_agent") {
                config.download.user_agent = v.trim().to_string();
            }
        }

        if let Some(section) = ini.section(Some("output")) {
            config.output_dir = section
                .get("directory")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from);
        }

        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DownloaderConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_backoff, Duration::from_millis(3000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("segloader/"));
    }

    #[test]
    fn test_builder() {
        let config = DownloaderConfig::default()
            .with_max_retries(5)
            .with_retry_backoff(Duration::from_millis(10))
            .with_request_timeout(Duration::from_secs(2))
            .with_user_agent("test-agent");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_backoff, Duration::from_millis(10));
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn test_zero_retries_clamped() {
        let config = DownloaderConfig::default().with_max_retries(0);
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_parse_full_file() {
        let config = ConfigFile::parse(
            "[download]\n\
             max_retries = 5\n\
             retry_backoff_ms = 250\n\
             timeout_secs = 12\n\
             user_agent = custom/1.0\n\
             [output]\n\
             directory = /tmp/media\n",
        )
        .unwrap();

        assert_eq!(config.download.max_retries, 5);
        assert_eq!(config.download.retry_backoff, Duration::from_millis(250));
        assert_eq!(config.download.request_timeout, Duration::from_secs(12));
        assert_eq!(config.download.user_agent, "custom/1.0");
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/media")));
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = ConfigFile::parse("[download]\nmax_retries = 2\n").unwrap();
        assert_eq!(config.download.max_retries, 2);
        assert_eq!(
            config.download.retry_backoff,
            Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS)
        );
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn test_parse_invalid_value() {
        let err = ConfigFile::parse("[download]\nmax_retries = lots\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "max_retries"));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[download]\ntimeout_secs = 9\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.download.request_timeout, Duration::from_secs(9));
    }

    #[test]
    fn test_load_from_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = ConfigFile::load_from(&temp.path().join("nope.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
