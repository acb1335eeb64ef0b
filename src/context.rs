//! Explicit runtime context.
//!
//! Everything that would otherwise live in a process-wide registry hangs
//! off a [`RuntimeContext`] built once at startup and passed by reference.
//! There is no ambient global state anywhere in this crate.

use std::path::Path;

use crate::batch::BatchOptions;
use crate::error::Result;
use crate::settings::Settings;
use crate::transport::{TransportClient, TransportConfig};

/// Shared runtime wiring for one process.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    settings: Settings,
}

impl RuntimeContext {
    /// Wrap already-loaded settings.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Load settings from `path` and the environment, then wrap them.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Ok(Self::new(Settings::load(path)?))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Batch options derived from the batch section.
    pub fn batch_options(&self) -> BatchOptions {
        self.settings.batch.to_options()
    }

    /// Transport configuration derived from the transport section.
    pub fn transport_config(&self) -> TransportConfig {
        self.settings.transport.to_config()
    }

    /// Build a transport client from the transport section.
    pub fn transport_client(&self) -> Result<TransportClient> {
        TransportClient::new(self.transport_config())
    }

    /// Serialized-character budget for tool responses.
    pub fn response_budget_chars(&self) -> usize {
        self.settings.budget.response_budget_chars
    }
}
