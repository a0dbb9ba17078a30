//! DuckDB repositories

pub mod analysis;
