use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use ripkit_core::progress::{CancelFlag, ProgressReporter};

const BAR_LEN: u64 = 1000;

/// Terminal progress for the current task.
///
/// Shows a bar while the fraction is known and a spinner otherwise. Cancellation comes from
/// the shared [`CancelFlag`], typically set by a Ctrl-C handler.
pub struct ConsoleReporter {
    cancel: CancelFlag,
    enabled: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(cancel: CancelFlag, enabled: bool) -> Self {
        Self {
            cancel,
            enabled,
            bar: Mutex::new(None),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn spinner(title: &str) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {prefix} {msg}")
        {
            bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        bar.set_prefix(title.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    fn to_bar(bar: &ProgressBar) {
        bar.disable_steady_tick();
        bar.set_length(BAR_LEN);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {prefix} {bar:40.cyan/blue} {percent:>3}% {wide_msg}")
        {
            bar.set_style(style.progress_chars("█▓▒░  "));
        }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn begin_task(&self, title: &str) {
        tracing::info!(task = title, "task started");
        if !self.enabled {
            return;
        }
        let mut slot = self.slot();
        if let Some(old) = slot.take() {
            old.finish_and_clear();
        }
        *slot = Some(Self::spinner(title));
    }

    fn update_task(&self, label: &str, fraction: Option<f64>) -> bool {
        if self.enabled {
            if let Some(bar) = self.slot().as_ref() {
                if let Some(f) = fraction {
                    if bar.length().is_none() {
                        Self::to_bar(bar);
                    }
                    bar.set_position((f.clamp(0.0, 1.0) * BAR_LEN as f64) as u64);
                }
                bar.set_message(label.to_string());
            }
        }
        self.cancel.is_cancelled()
    }

    fn clear_task(&self) {
        if let Some(bar) = self.slot().take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_reporter_only_answers_cancellation() {
        let cancel = CancelFlag::new();
        let reporter = ConsoleReporter::new(cancel.clone(), false);

        reporter.begin_task("Downloading ripper");
        assert!(!reporter.update_task("chunk", Some(0.5)));
        cancel.cancel();
        assert!(reporter.update_task("chunk", None));
        reporter.clear_task();
    }

    #[test]
    fn switches_from_spinner_to_bar_and_clears() {
        let reporter = ConsoleReporter::new(CancelFlag::new(), true);

        reporter.begin_task("Running ripper");
        reporter.update_task("Loading", None);
        reporter.update_task("Exporting 1", Some(0.25));
        {
            let slot = reporter.slot();
            let bar = slot.as_ref().unwrap();
            assert_eq!(bar.length(), Some(BAR_LEN));
            assert_eq!(bar.position(), 250);
        }
        reporter.clear_task();
        assert!(reporter.slot().is_none());
        // Clearing twice is harmless.
        reporter.clear_task();
    }
}
