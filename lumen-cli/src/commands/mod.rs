//! Subcommand implementations.

pub mod analyze;
pub mod browse;
pub mod counts;
pub mod filter;
pub mod sort;
