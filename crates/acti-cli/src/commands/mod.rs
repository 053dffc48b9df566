//! CLI subcommand implementations.

pub mod point;
pub mod resolve;
pub mod review;
pub mod runs;
pub mod segment;
pub mod window;

#[cfg(test)]
mod fixtures;
