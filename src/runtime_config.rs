//! # Runtime Configuration
//!
//! Coroutine runtime settings read from the environment and applied to
//! `may` before the server starts.
//!
//! ### `GROVE_STACK_SIZE`
//!
//! Stack size for each connection coroutine, in decimal (`16384`) or hex
//! (`0x4000`). Default `0x4000` (16 KB). Handlers with deep call chains or
//! large locals need more; total virtual memory is roughly
//! `stack_size × concurrent connections`.
//!
//! ### `GROVE_WORKERS`
//!
//! Number of `may` worker threads. Defaults to the runtime's own choice
//! (the number of CPUs).
//!
//! ### `GROVE_HEADER_LINES`
//!
//! How many distinct response header lines (`name: value`) the server keeps
//! for the wire encoder. Default 4096. Headers beyond the limit are dropped
//! and logged at `error`.
//!
//! ```rust
//! use grove::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;
use tracing::info;

use crate::server::{set_header_line_limit, DEFAULT_HEADER_LINE_LIMIT};

pub const DEFAULT_STACK_SIZE: usize = 0x4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Coroutine stack size in bytes
    pub stack_size: usize,
    /// Worker thread count, `None` for the runtime default
    pub workers: Option<usize>,
    /// Distinct response header lines kept for the wire encoder
    pub header_lines: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            workers: None,
            header_lines: DEFAULT_HEADER_LINE_LIMIT,
        }
    }
}

impl RuntimeConfig {
    /// Load from `GROVE_STACK_SIZE`, `GROVE_WORKERS` and `GROVE_HEADER_LINES`;
    /// malformed values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            env::var("GROVE_STACK_SIZE").ok().as_deref(),
            env::var("GROVE_WORKERS").ok().as_deref(),
            env::var("GROVE_HEADER_LINES").ok().as_deref(),
        )
    }

    fn from_values(
        stack_size: Option<&str>,
        workers: Option<&str>,
        header_lines: Option<&str>,
    ) -> Self {
        let stack_size = stack_size
            .and_then(parse_size)
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_STACK_SIZE);
        let workers = workers
            .and_then(|w| w.trim().parse::<usize>().ok())
            .filter(|&w| w > 0);
        let header_lines = header_lines
            .and_then(|n| n.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_HEADER_LINE_LIMIT);
        Self {
            stack_size,
            workers,
            header_lines,
        }
    }

    /// Apply to the global `may` configuration. Call once, before starting
    /// any server.
    pub fn apply(&self) {
        let config = may::config();
        config.set_stack_size(self.stack_size);
        if let Some(workers) = self.workers {
            config.set_workers(workers);
        }
        set_header_line_limit(self.header_lines);
        info!(
            stack_size = self.stack_size,
            workers = ?self.workers,
            header_lines = self.header_lines,
            "Coroutine runtime configured"
        );
    }
}

fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}
