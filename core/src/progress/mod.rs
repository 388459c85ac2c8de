//! Progress reporting capability consumed by the fetcher and the supervisor.
//!
//! Hosts inject a [`ProgressReporter`]; the core never draws anything itself. The reporter's
//! answer to [`ProgressReporter::update_task`] is also the cancellation query.

mod cancel;
mod reporters;
mod traits;

pub use cancel::CancelFlag;
pub use reporters::{LogReporter, RecordingReporter};
pub use traits::{ProgressEvent, ProgressReporter, TaskGuard};
