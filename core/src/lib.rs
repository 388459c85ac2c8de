//! Acquire an external extraction tool and supervise it as a pipeline step.
//!
//! Concrete process, HTTP, and terminal integrations live in `ripkit-plugins`; this crate only
//! defines the seams ([`runner::RunnerPlugin`], [`fetch::ArchiveSource`],
//! [`progress::ProgressReporter`]) and the logic between them.

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod install;
pub mod pipeline;
pub mod progress;
pub mod runner;
pub mod step;
pub mod util;
