//! Domain logic for access-log analysis
//!
//! - `normalize` - Request path normalization into grouping templates
//! - `ingest` - Input parsing and record validation
//! - `schema` - Field type inference over raw input
//! - `buckets` - Status-code range bucketing and chart ranking
//! - `assemble` - Output row-set ordering and truncation
//! - `pipeline` - Session and run state machine
//! - `demo` - Bundled demo dataset

pub mod assemble;
pub mod buckets;
pub mod demo;
pub mod error;
pub mod ingest;
pub mod normalize;
pub mod pipeline;
pub mod schema;

pub use assemble::ResultAssembler;
pub use error::PipelineError;
pub use normalize::normalize;
pub use pipeline::{AnalysisOptions, PipelineState, Session};
