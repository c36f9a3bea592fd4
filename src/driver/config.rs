//! Driver configuration

use std::time::Duration;

use crate::context::Context;

/// Name the default driver registers under
pub const DEFAULT_DRIVER_NAME: &str = "test";

/// Driver configuration
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Name used in the driver registry
    pub name: String,
    /// Timeout applied to operations whose context carries no deadline
    pub default_timeout: Option<Duration>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DRIVER_NAME.to_string(),
            default_timeout: None,
        }
    }
}

impl DriverConfig {
    /// Create a new driver config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registry name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the default operation timeout
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Context an operation actually runs under
    pub fn scope(&self, ctx: &Context) -> Context {
        match (ctx.deadline(), self.default_timeout) {
            (None, Some(timeout)) => ctx.with_timeout(timeout),
            _ => ctx.clone(),
        }
    }
}
