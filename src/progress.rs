//! Per-page progress reporting.
//!
//! The pipeline reports progress through an injected [`ProgressReporter`] so that callers decide
//! where it goes. [`LogReporter`] forwards every event to the `log` facade.

use log::info;

/// Receives progress events while pages are extracted.
pub trait ProgressReporter {
    /// Called once before the first page is extracted.
    fn on_start(&mut self, total_pages: usize, source: &str) {
        let _ = (total_pages, source);
    }

    /// Called before page `index` (zero based) of `total_pages` is extracted.
    fn on_page(&mut self, index: usize, total_pages: usize, source: &str);

    /// Called once after the last page was extracted.
    fn on_finish(&mut self) {}
}

/// Reports progress as `info` log lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn on_start(&mut self, total_pages: usize, source: &str) {
        info!("Bionicly transcribing {} pages from {}", total_pages, source);
    }

    fn on_page(&mut self, index: usize, total_pages: usize, source: &str) {
        info!(
            "Processing Page {} of {} | {}...",
            index,
            total_pages.saturating_sub(1),
            source
        );
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn on_page(&mut self, _index: usize, _total_pages: usize, _source: &str) {}
}
