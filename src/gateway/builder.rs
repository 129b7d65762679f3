use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::provider::{ProviderAdapter, ProviderKind};
use crate::registry::ProviderRegistry;
use crate::routing::PrioritySelector;
use crate::transport::HttpTransport;
use crate::{Error, ErrorContext, Result};

use super::core::Gateway;

/// Builder for a [`Gateway`].
///
/// Keep this surface area small: a configuration snapshot, an optional
/// precedence override, and injection points for tests.
#[derive(Debug, Default)]
pub struct GatewayBuilder {
    config: GatewayConfig,
    precedence: Option<Vec<ProviderKind>>,
    transport: Option<HttpTransport>,
    adapters: Option<Vec<Arc<dyn ProviderAdapter>>>,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default precedence list.
    pub fn precedence(mut self, precedence: impl IntoIterator<Item = ProviderKind>) -> Self {
        self.precedence = Some(precedence.into_iter().collect());
        self
    }

    /// Share an existing HTTP transport instead of building one from settings.
    pub fn transport(mut self, transport: HttpTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use pre-built adapters instead of building them from the configuration.
    pub fn adapters(mut self, adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        self.adapters = Some(adapters);
        self
    }

    pub fn build(self) -> Result<Gateway> {
        let registry = match self.adapters {
            Some(adapters) => ProviderRegistry::from_adapters(adapters),
            None => {
                let transport = match self.transport {
                    Some(t) => t,
                    None => HttpTransport::new(&self.config.http).map_err(|e| {
                        Error::configuration_with_context(
                            format!("failed to build HTTP transport: {}", e),
                            ErrorContext::new()
                                .with_field_path("http")
                                .with_source("gateway_builder"),
                        )
                    })?,
                };
                ProviderRegistry::build(&self.config, transport)
            }
        };

        let selector = match self.precedence {
            Some(p) if p.is_empty() => {
                return Err(Error::configuration_with_context(
                    "precedence list must not be empty",
                    ErrorContext::new()
                        .with_field_path("precedence")
                        .with_source("gateway_builder"),
                ))
            }
            Some(p) => PrioritySelector::new(p),
            None => PrioritySelector::default(),
        };

        Ok(Gateway::from_parts(registry, selector))
    }
}
