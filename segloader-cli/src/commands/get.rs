//! `segloader get`: download a single resource.

use std::path::PathBuf;

use clap::Args;
use segloader::job::{DEFAULT_EXTENSION, DEFAULT_SEPARATOR};
use segloader::DownloadJob;

use super::common::{format_size, Settings};
use crate::error::CliError;
use crate::progress::{self, ProgressDisplay};

#[derive(Debug, Clone, Args)]
pub struct GetArgs {
    /// Resource name, used as the output file name
    pub name: String,

    /// URI of the first chunk, e.g. https://host/path/video_001.ts
    pub uri: String,

    /// Index of the last chunk; without it, download until a chunk is missing
    #[arg(long, value_name = "N")]
    pub last: Option<u64>,

    /// Character separating the name prefix from the chunk number
    #[arg(long, default_value_t = DEFAULT_SEPARATOR)]
    pub separator: char,

    /// Extension of the assembled file
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Do not zero-pad chunk numbers
    #[arg(long)]
    pub no_padding: bool,

    /// Output folder
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl GetArgs {
    fn to_job(&self) -> Result<DownloadJob, CliError> {
        let job = DownloadJob::new(self.name.clone(), &self.uri)?
            .with_separator(self.separator)
            .with_extension(self.extension.clone())
            .with_zero_pad(!self.no_padding);

        Ok(match self.last {
            Some(last) => job.with_last_chunk(last),
            None => job,
        })
    }
}

/// Run the get command.
pub async fn run(args: GetArgs, settings: &Settings) -> Result<(), CliError> {
    let job = args.to_job()?;
    let folder = settings.output_dir(args.output.as_deref()).to_path_buf();

    let display = ProgressDisplay::new();
    let (bar, downloader) = display.attach(job.name(), settings.downloader()?);

    match downloader.download(&job, &folder).await {
        Ok(summary) => {
            progress::finish(&bar, Ok(&summary));
            println!(
                "Saved {} ({}) to {}",
                summary.resource,
                format_size(summary.bytes),
                summary.path.display()
            );
            Ok(())
        }
        Err(e) => {
            progress::finish(&bar, Err(e.to_string()));
            Err(CliError::Download {
                name: job.name().to_string(),
                source: e,
            })
        }
    }
}
