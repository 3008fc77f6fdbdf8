//! Continuation driver for a request's handler chain.
//!
//! The chain is the matched group middleware followed by the route handler
//! (or the not-found handler). [`Context::try_next`] runs the next handler
//! and returns once everything downstream of it has unwound, which lets a
//! middleware do work both before and after the rest of the chain:
//!
//! ```text
//! engine ── try_next ──▶ A ── try_next ──▶ B ── try_next ──▶ route
//!                        A ◀───────────── B ◀──────────────  route
//! ```
//!
//! A handler that returns without continuing ends the chain there. Each
//! handler, and the engine's initial drive, may continue at most once; a
//! second attempt is rejected with [`ChainError::AlreadyContinued`] and runs
//! nothing.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::Context;

/// Rejected continuation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The caller already continued the chain once
    AlreadyContinued {
        /// Chain position of the caller; `None` for the engine's own drive
        position: Option<usize>,
    },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::AlreadyContinued { position: Some(p) } => {
                write!(f, "handler at chain position {p} already continued the chain")
            }
            ChainError::AlreadyContinued { position: None } => {
                write!(f, "chain was already started")
            }
        }
    }
}

impl std::error::Error for ChainError {}

impl Context {
    /// Run the rest of the chain, logging and ignoring a rejected second call.
    pub fn next(&mut self) {
        if let Err(err) = self.try_next() {
            warn!(
                request_id = %self.request_id,
                path = %self.request.path,
                error = %err,
                "Continuation rejected"
            );
        }
    }

    /// Run the rest of the chain.
    ///
    /// Continuing past the end of the chain is a no-op.
    ///
    /// # Errors
    ///
    /// [`ChainError::AlreadyContinued`] if the calling handler already continued.
    pub fn try_next(&mut self) -> Result<(), ChainError> {
        // Slot 0 is the engine's drive; handler i uses slot i + 1.
        let frame = self.running.map_or(0, |i| i + 1);
        if self.continued.get(frame).copied().unwrap_or(false) {
            return Err(ChainError::AlreadyContinued {
                position: self.running,
            });
        }
        if let Some(slot) = self.continued.get_mut(frame) {
            *slot = true;
        }

        let position = self.cursor;
        let Some(handler) = self.handlers.get(position).map(Arc::clone) else {
            return Ok(());
        };
        self.cursor += 1;

        let caller = self.running.replace(position);
        handler(self);
        self.running = caller;
        Ok(())
    }

    /// Number of handlers in the chain that have started.
    #[must_use]
    pub fn handlers_started(&self) -> usize {
        self.cursor
    }
}
