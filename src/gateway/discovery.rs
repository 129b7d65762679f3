//! Service discovery and health reporting over the current selection.

use serde::Serialize;

use crate::provider::ProviderKind;

use super::core::Gateway;

/// One selectable provider as advertised to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub service: ProviderKind,
    pub available: bool,
    pub models: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub available_services: usize,
    pub services: Vec<ServiceInfo>,
}

impl ServiceInfo {
    fn for_kind(kind: ProviderKind) -> Self {
        Self {
            service: kind,
            available: true,
            models: kind.catalog_models().iter().map(|m| m.to_string()).collect(),
            description: kind.description().to_string(),
        }
    }
}

impl Gateway {
    /// Selectable providers in precedence order.
    pub fn available_services(&self) -> Vec<ServiceInfo> {
        self.available_providers()
            .into_iter()
            .map(ServiceInfo::for_kind)
            .collect()
    }

    /// Unhealthy when no provider is selectable. Performs no network I/O.
    pub fn health(&self) -> HealthReport {
        let services = self.available_services();
        let status = if services.is_empty() {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        };
        HealthReport {
            status,
            available_services: services.len(),
            services,
        }
    }
}
