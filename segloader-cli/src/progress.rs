//! Terminal progress display for downloads.

use std::time::Duration;

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use segloader::{ChunkDownloader, ChunkProgress, DownloadSummary};

use crate::commands::common::format_size;

/// Spinners for one or more concurrent jobs.
#[derive(Clone, Default)]
pub struct ProgressDisplay {
    bars: MultiProgress,
}

impl ProgressDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spinner for `name` and wire it to the downloader's progress
    /// callback.
    pub fn attach(&self, name: &str, downloader: ChunkDownloader) -> (ProgressBar, ChunkDownloader) {
        let bar = self.bars.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(name.to_string());
        bar.set_message("connecting");
        bar.enable_steady_tick(Duration::from_millis(120));

        let handle = bar.clone();
        let downloader = downloader.with_progress(move |p: &ChunkProgress| {
            handle.set_message(format!(
                "chunk {} ({} chunks, {})",
                p.chunk_index,
                p.chunks_completed,
                format_size(p.bytes_written)
            ));
        });

        (bar, downloader)
    }
}

/// Close a spinner with the job's outcome.
pub fn finish(bar: &ProgressBar, outcome: Result<&DownloadSummary, String>) {
    match outcome {
        Ok(summary) => bar.finish_with_message(format!(
            "{} {} chunks, {} in {:.1}s",
            style("done").green(),
            summary.chunks,
            format_size(summary.bytes),
            summary.elapsed.as_secs_f64()
        )),
        Err(reason) => bar.abandon_with_message(format!("{} {}", style("failed").red(), reason)),
    }
}
