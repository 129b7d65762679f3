use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::provider::{ProviderAdapter, ProviderKind};
use crate::registry::ProviderRegistry;
use crate::routing::PrioritySelector;
use crate::Result;

use super::builder::GatewayBuilder;

/// Provider-agnostic text generation front door.
///
/// Holds only immutable state; clones share the same registry and are safe
/// to use from concurrent tasks.
#[derive(Debug, Clone)]
pub struct Gateway {
    pub(crate) registry: Arc<ProviderRegistry>,
    pub(crate) selector: Arc<PrioritySelector>,
}

impl Gateway {
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Build with default precedence and HTTP settings taken from `config`.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        GatewayBuilder::new().config(config.clone()).build()
    }

    pub(crate) fn from_parts(registry: ProviderRegistry, selector: PrioritySelector) -> Self {
        Self {
            registry: Arc::new(registry),
            selector: Arc::new(selector),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn selector(&self) -> &PrioritySelector {
        &self.selector
    }

    /// Adapters a dispatch would try right now, in order.
    pub fn candidates(&self) -> Vec<Arc<dyn ProviderAdapter>> {
        self.selector.select(&self.registry)
    }

    pub fn available_providers(&self) -> Vec<ProviderKind> {
        self.candidates().iter().map(|a| a.identity()).collect()
    }
}
