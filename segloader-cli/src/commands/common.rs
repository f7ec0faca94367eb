//! Settings shared by every command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use segloader::config::DEFAULT_OUTPUT_DIR;
use segloader::{ChunkDownloader, ConfigFile, DownloaderConfig};

use crate::error::CliError;

/// Flags that override `config.ini`.
#[derive(Debug, Clone, Args)]
pub struct SettingsArgs {
    /// Read settings from this INI file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Consecutive failures on one chunk before giving up
    #[arg(long, global = true, value_name = "N")]
    pub retries: Option<u32>,

    /// Wait between attempts on the same chunk, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub backoff_ms: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

/// Settings after merging defaults, config file and flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub downloader: DownloaderConfig,
    pub output_dir: PathBuf,
}

impl SettingsArgs {
    /// Load the config file and apply flag overrides.
    pub fn resolve(&self) -> Result<Settings, CliError> {
        let file = match self.config {
            Some(ref path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };
        Ok(self.apply(file))
    }

    fn apply(&self, file: ConfigFile) -> Settings {
        let mut downloader = file.download;
        if let Some(retries) = self.retries {
            downloader = downloader.with_max_retries(retries);
        }
        if let Some(ms) = self.backoff_ms {
            downloader = downloader.with_retry_backoff(Duration::from_millis(ms));
        }
        if let Some(secs) = self.timeout_secs {
            downloader = downloader.with_request_timeout(Duration::from_secs(secs));
        }

        Settings {
            downloader,
            output_dir: file
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }
}

impl Settings {
    /// Output folder: the command's `--output`, else the configured one.
    pub fn output_dir<'a>(&'a self, cli_output: Option<&'a Path>) -> &'a Path {
        cli_output.unwrap_or(&self.output_dir)
    }

    /// Build a downloader over the HTTP transport.
    pub fn downloader(&self) -> Result<ChunkDownloader, CliError> {
        Ok(ChunkDownloader::new(self.downloader.clone())?)
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
