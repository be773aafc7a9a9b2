//! CLI interface for ethscan
//!
//! This crate provides argument parsing and the `scan` and `gen`
//! subcommands of the `ethscan` binary.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, GenArgs, ScanArgs};
