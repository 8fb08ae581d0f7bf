//! Application state for the Payroll Generation Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use crate::engine::PayrollEngine;
use crate::store::PayrollStore;

/// Shared application state.
///
/// Wraps the engine, which itself shares its store and configuration, so
/// cloning the state per request is cheap.
pub struct AppState<S> {
    engine: PayrollEngine<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<S> AppState<S>
where
    S: PayrollStore + 'static,
{
    /// Creates a new application state around an engine.
    pub fn new(engine: PayrollEngine<S>) -> Self {
        Self { engine }
    }

    /// Returns a reference to the engine.
    pub fn engine(&self) -> &PayrollEngine<S> {
        &self.engine
    }
}
