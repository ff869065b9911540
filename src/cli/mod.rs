//! Command-line interface
//!
//! Argument parsing for the offline `nano-wallet` tool.

pub mod commands;

pub use commands::{Command, Opt};
