//! Benchmark categories

pub mod landscape;
pub mod techniques;
