//! Actigraphy review CLI library.
//!
//! This crate provides the CLI interface for the review engine.

mod cli;
pub mod commands;
mod config;
pub mod samples;

pub use cli::{Cli, Commands};
pub use config::Config;
