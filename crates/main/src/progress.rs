//! Terminal progress bar for page extraction.

use bionic_reader::progress::{LogReporter, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

const BAR_MESSAGE: &str = "Bionicly Transcribing";
const BAR_TEMPLATE: &str =
    "{msg}: {percent:>3}%|{wide_bar}| {pos}/{len} pages [{elapsed_precise}<{eta_precise}]";

/// Draws a page progress bar on standard error and forwards every event to the log.
pub struct BarReporter {
    bar: ProgressBar,
    log: LogReporter,
}

impl BarReporter {
    /// Creates a reporter drawing to standard error.
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Creates a reporter around an existing bar.
    pub fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(bar_style());
        bar.set_message(BAR_MESSAGE);
        Self {
            bar,
            log: LogReporter,
        }
    }
}

impl Default for BarReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

impl ProgressReporter for BarReporter {
    fn on_start(&mut self, total_pages: usize, source: &str) {
        self.bar.set_length(total_pages as u64);
        self.bar.set_position(0);
        let log = &mut self.log;
        self.bar.suspend(|| log.on_start(total_pages, source));
    }

    fn on_page(&mut self, index: usize, total_pages: usize, source: &str) {
        let log = &mut self.log;
        self.bar.suspend(|| log.on_page(index, total_pages, source));
        self.bar.set_position(index as u64);
    }

    fn on_finish(&mut self) {
        if let Some(length) = self.bar.length() {
            self.bar.set_position(length);
        }
        self.bar.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_tracks_extracted_pages() {
        let bar = ProgressBar::hidden();
        let mut reporter = BarReporter::with_bar(bar.clone());

        reporter.on_start(3, "study.pdf");
        assert_eq!(bar.length(), Some(3));
        for index in 0..3 {
            reporter.on_page(index, 3, "study.pdf");
            assert_eq!(bar.position(), index as u64);
        }
        reporter.on_finish();

        assert_eq!(bar.position(), 3);
        assert!(bar.is_finished());
        assert_eq!(bar.message(), BAR_MESSAGE);
    }

    #[test]
    fn template_is_valid() {
        assert!(ProgressStyle::with_template(BAR_TEMPLATE).is_ok());
    }
}
