pub mod error;
pub mod fetch;
pub mod step;

pub use error::{CliError, RunError};
pub use fetch::FetchError;
pub use step::StepError;
