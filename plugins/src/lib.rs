pub mod factory;
pub mod fetch;
pub mod progress;
pub mod runner;
