//! Command line driver for `rematch` expressions.
//!
//! The `rematch` binary compiles expressions to RPN, evaluates them against
//! text from an argument, a file, or stdin, and runs a bundled demo.
//!
//! # Configuration
//!
//! - `REMATCH_LOG_LEVEL`: Log verbosity (trace, debug, info, warn, error)
//! - `REMATCH_FORMAT`: Output format (text, json)
//!
//! Command-line flags take precedence over the environment.

pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod logging;
mod output;
