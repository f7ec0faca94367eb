//! `segloader batch`: download every resource in a JSON batch file.

use std::path::{Path, PathBuf};

use clap::Args;
use futures::{stream, StreamExt};
use segloader::batch::{check_unique_outputs, load_batch, JobSpec};
use segloader::{ChunkDownloader, DownloadJob};

use super::common::Settings;
use crate::error::CliError;
use crate::progress::{self, ProgressDisplay};

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// JSON file listing the jobs
    pub file: PathBuf,

    /// Output folder
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Number of resources downloaded at the same time
    #[arg(short, long, default_value_t = 1, value_name = "N")]
    pub jobs: usize,

    /// Keep starting new jobs after one fails
    #[arg(long)]
    pub keep_going: bool,
}

/// Tally of a finished batch.
#[derive(Debug, Default, PartialEq, Eq)]
struct BatchReport {
    total: usize,
    completed: usize,
    failed: usize,
}

impl BatchReport {
    fn skipped(&self) -> usize {
        self.total - self.completed - self.failed
    }

    fn into_result(self) -> Result<(), CliError> {
        if self.completed == self.total {
            Ok(())
        } else {
            Err(CliError::BatchFailed {
                failed: self.failed,
                skipped: self.skipped(),
                total: self.total,
            })
        }
    }
}

/// Run the batch command.
///
/// Every entry is validated before anything is downloaded, including that no
/// two jobs share an output file.
pub async fn run(args: BatchArgs, settings: &Settings) -> Result<(), CliError> {
    let jobs = load_batch(&args.file)?
        .into_iter()
        .map(JobSpec::into_job)
        .collect::<Result<Vec<DownloadJob>, _>>()?;

    let folder = settings.output_dir(args.output.as_deref()).to_path_buf();
    check_unique_outputs(&jobs, &folder)?;

    tracing::info!(
        jobs = jobs.len(),
        concurrency = args.jobs.max(1),
        file = %args.file.display(),
        "Starting batch"
    );

    let report = run_jobs(jobs, &folder, settings.downloader()?, &args).await;
    println!(
        "{} of {} downloads completed ({} failed, {} skipped)",
        report.completed,
        report.total,
        report.failed,
        report.skipped()
    );
    report.into_result()
}

/// Download `jobs` into `folder` with up to `--jobs` running at once.
///
/// Without `--keep-going` the first failure stops the batch: no further job
/// is started and jobs still in flight are dropped.
async fn run_jobs(
    jobs: Vec<DownloadJob>,
    folder: &Path,
    base: ChunkDownloader,
    args: &BatchArgs,
) -> BatchReport {
    let display = ProgressDisplay::new();
    let mut report = BatchReport {
        total: jobs.len(),
        ..Default::default()
    };

    let mut outcomes = stream::iter(jobs.into_iter().map(|job| {
        let (bar, downloader) = display.attach(job.name(), base.clone());
        async move {
            let result = downloader.download(&job, folder).await;
            progress::finish(&bar, result.as_ref().map_err(|e| e.to_string()));
            (job, result)
        }
    }))
    .buffer_unordered(args.jobs.max(1));

    while let Some((job, result)) = outcomes.next().await {
        match result {
            Ok(_) => report.completed += 1,
            Err(e) => {
                report.failed += 1;
                tracing::error!(resource = job.name(), error = %e, "Download failed");
                if !args.keep_going {
                    tracing::warn!("Stopping batch after first failure");
                    break;
                }
            }
        }
    }

    report
}
