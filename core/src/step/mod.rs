mod extraction;
mod types;

pub use extraction::{AssetExtractionStep, ExtractionSettings, ExtractionState};
pub use types::{Step, StepOutcome};
