//! # CLI Module
//!
//! Command-line entry point for the `grove` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Start the demo application:
//!
//! ```bash
//! grove serve --addr 127.0.0.1:9999 --static-dir ./static --templates 'templates/*.tmpl'
//! ```
//!
//! Options:
//! - `--config <FILE>` - YAML server configuration (see [`crate::config`])
//! - `--addr <ADDR>` - listen address, overriding the config file
//! - `--static-dir <DIR>` - directory served under the static prefix
//! - `--templates <GLOB>` - HTML templates to load
//!
//! The server runs until SIGINT or SIGTERM.
//!
//! ### `routes`
//!
//! Print the demo application's route table and exit.

mod commands;


pub use commands::{build_engine, run_cli, Cli, Commands};
