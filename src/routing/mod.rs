//! 优先级选择器 — 按固定优先级过滤并排序可用的 Provider
//!
//! Priority selection over the registry.
//!
//! This module is **pure logic**: it performs no network calls and keeps no
//! state between calls. Availability is re-evaluated on every `select`.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use crate::provider::{ProviderAdapter, ProviderKind};
use crate::registry::ProviderRegistry;

/// Default precedence, highest first.
pub const DEFAULT_PRECEDENCE: [ProviderKind; 11] = ProviderKind::ALL;

/// Orders registered, currently-available adapters by a fixed precedence list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrioritySelector {
    precedence: Vec<ProviderKind>,
}

impl PrioritySelector {
    /// Build from an explicit precedence list. Repeated kinds keep their first position.
    pub fn new(precedence: impl IntoIterator<Item = ProviderKind>) -> Self {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for kind in precedence {
            if seen.insert(kind) {
                ordered.push(kind);
            } else {
                warn!(provider = %kind, "duplicate provider in precedence list ignored");
            }
        }
        Self {
            precedence: ordered,
        }
    }

    pub fn precedence(&self) -> &[ProviderKind] {
        &self.precedence
    }

    /// Adapters present in `registry` and available right now, in precedence order.
    /// An empty result is not an error.
    pub fn select(&self, registry: &ProviderRegistry) -> Vec<Arc<dyn ProviderAdapter>> {
        self.precedence
            .iter()
            .filter_map(|kind| registry.get(*kind))
            .filter(|adapter| adapter.is_available())
            .cloned()
            .collect()
    }
}

impl Default for PrioritySelector {
    fn default() -> Self {
        Self::new(DEFAULT_PRECEDENCE)
    }
}
