use std::sync::{Mutex, MutexGuard};

use super::{CancelFlag, ProgressEvent, ProgressReporter};

/// Headless reporter: progress goes to `tracing`, cancellation comes from a [`CancelFlag`].
#[derive(Debug, Default)]
pub struct LogReporter {
    cancel: CancelFlag,
    title: Mutex<Option<String>>,
}

impl LogReporter {
    pub fn new(cancel: CancelFlag) -> Self {
        Self {
            cancel,
            title: Mutex::new(None),
        }
    }
}

impl ProgressReporter for LogReporter {
    fn begin_task(&self, title: &str) {
        tracing::info!(target: "ripkit.progress", task = %title, "task started");
        *self.title.lock().unwrap_or_else(|p| p.into_inner()) = Some(title.to_string());
    }

    fn update_task(&self, label: &str, fraction: Option<f64>) -> bool {
        let title = self.title.lock().unwrap_or_else(|p| p.into_inner()).clone();
        tracing::debug!(
            target: "ripkit.progress",
            task = title.as_deref().unwrap_or(""),
            fraction = fraction.unwrap_or(-1.0),
            "{label}"
        );
        self.cancel.is_cancelled()
    }

    fn clear_task(&self) {
        self.title.lock().unwrap_or_else(|p| p.into_inner()).take();
    }
}

#[derive(Debug, Default)]
struct Recorded {
    titles: Vec<String>,
    events: Vec<ProgressEvent>,
    clears: usize,
    active: bool,
}

/// Keeps every call it receives. Embedding hosts use it to replay progress; tests use it to
/// assert ordering and cancellation behaviour.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    cancel_after: Option<usize>,
    inner: Mutex<Recorded>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation from the `n`th update onwards (1-based).
    pub fn cancel_after(n: usize) -> Self {
        Self {
            cancel_after: Some(n),
            inner: Mutex::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn titles(&self) -> Vec<String> {
        self.lock().titles.clone()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.lock().events.clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.lock().events.iter().map(|e| e.label.clone()).collect()
    }

    pub fn clear_count(&self) -> usize {
        self.lock().clears
    }

    /// True while a task has been begun and not yet cleared.
    pub fn is_active(&self) -> bool {
        self.lock().active
    }
}

impl ProgressReporter for RecordingReporter {
    fn begin_task(&self, title: &str) {
        let mut g = self.lock();
        g.titles.push(title.to_string());
        g.active = true;
    }

    fn update_task(&self, label: &str, fraction: Option<f64>) -> bool {
        let mut g = self.lock();
        let cancel_requested = self
            .cancel_after
            .map(|n| g.events.len() + 1 >= n)
            .unwrap_or(false);
        g.events.push(ProgressEvent {
            label: label.to_string(),
            fraction,
            cancel_requested,
        });
        cancel_requested
    }

    fn clear_task(&self) {
        let mut g = self.lock();
        g.clears += 1;
        g.active = false;
    }
}
