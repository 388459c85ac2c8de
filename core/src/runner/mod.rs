mod estimate;
mod io_pump;
mod supervise;
mod traits;
pub mod types;

pub use estimate::ProgressEstimator;
pub use supervise::{supervise, SuperviseArgs};
pub use traits::{RunnerPlugin, RunnerSession};
pub use types::{ProcessExitSummary, RunnerStartArgs, SessionExit};
