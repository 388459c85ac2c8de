/// Narrow UI capability: one task at a time, labelled updates, cooperative cancellation.
pub trait ProgressReporter: Send + Sync {
    fn begin_task(&self, title: &str);

    /// Reports progress for the current task. `fraction` is `None` when the amount of work
    /// is unknown. Returns `true` when the operator asked to cancel.
    fn update_task(&self, label: &str, fraction: Option<f64>) -> bool;

    fn clear_task(&self);
}

/// One update as seen by a reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub label: String,
    pub fraction: Option<f64>,
    pub cancel_requested: bool,
}

/// Begins a task on construction and clears it when dropped, so every exit path
/// (success, error, cancellation, panic unwinding) leaves the host indicator clean.
pub struct TaskGuard<'a> {
    reporter: &'a dyn ProgressReporter,
}

impl<'a> TaskGuard<'a> {
    pub fn begin(reporter: &'a dyn ProgressReporter, title: &str) -> Self {
        reporter.begin_task(title);
        Self { reporter }
    }

    pub fn update(&self, label: &str, fraction: Option<f64>) -> bool {
        self.reporter.update_task(label, fraction)
    }
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        self.reporter.clear_task();
    }
}
