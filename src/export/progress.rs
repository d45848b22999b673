//! Progress tracking for export runs
//!
//! One bar step per language. The bar message shows the current phase and
//! the last language that finished.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::coordinator::ExportPhase;

/// Progress tracker for export runs
///
/// Safe to share across the concurrent per-language fetches.
pub struct ProgressTracker {
    /// Languages finished so far
    processed: AtomicU64,
    start_time: Instant,
    /// Progress bar (optional, can be disabled)
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `languages` - Number of languages in the run
    /// * `enable_bar` - Whether to display a progress bar
    ///
    /// # Returns
    /// * `Self` - New progress tracker instance
    pub fn new(languages: u64, enable_bar: bool) -> Self {
        let bar = enable_bar.then(|| {
            let bar = ProgressBar::new(languages);
            match ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} languages {msg}")
            {
                Ok(style) => bar.set_style(style.progress_chars("#>-")),
                Err(e) => debug!("Falling back to the default progress style: {}", e),
            }
            bar
        });

        Self {
            processed: AtomicU64::new(0),
            start_time: Instant::now(),
            bar,
        }
    }

    /// A tracker that never draws
    pub fn hidden() -> Self {
        Self::new(0, false)
    }

    pub fn set_phase(&self, phase: ExportPhase) {
        if let Some(ref bar) = self.bar {
            bar.set_message(phase.to_string());
        }
    }

    /// Mark one language as fetched and assembled
    pub fn language_done(&self, language: &str) {
        let done = self.processed.fetch_add(1, Ordering::Relaxed) + 1;

        if let Some(ref bar) = self.bar {
            bar.set_position(done);
            bar.set_message(format!("({language} done)"));
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        debug!(
            "Export progress finished: {} language(s) in {} ms",
            self.processed(),
            self.start_time.elapsed().as_millis()
        );
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
