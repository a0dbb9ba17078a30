//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;
pub mod report;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, Commands};
pub use config::{AnalyticsBackend, AppConfig, InvalidRecordPolicy, OutputFormat};
