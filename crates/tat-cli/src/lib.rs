//! Task time tracker CLI library.
//!
//! This crate provides the CLI interface for the task time tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{ActionArg, Cli, Commands};
pub use config::Config;
