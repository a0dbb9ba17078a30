//! reqlens: access-log request normalization and aggregation
//!
//! - `core` - CLI, configuration, constants and the application runner
//! - `data` - analytics engines and shared row types
//! - `domain` - normalization, ingestion, schema inference and the pipeline session
//! - `utils` - small helpers shared across layers

mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
