//! ripkit-cli library: command wiring exposed for tests.

pub mod app;
pub mod commands;
