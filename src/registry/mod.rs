//! Provider 注册表 — 启动时根据配置快照构建适配器集合
//!
//! Provider registry built once from the configuration snapshot.
//! A provider whose required credentials are missing is excluded entirely
//! rather than registered as unavailable. Read-only after construction.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::provider::{
    AdapterFamily, BearerAdapter, HunyuanAdapter, ProviderAdapter, ProviderDescriptor,
    ProviderKind,
};
use crate::transport::HttpTransport;

/// Immutable map of configured adapters.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Construct an adapter for every kind whose credentials are complete.
    /// Performs no network I/O.
    pub fn build(config: &GatewayConfig, transport: HttpTransport) -> Self {
        let mut adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>> = HashMap::new();

        for kind in ProviderKind::ALL {
            let descriptor = ProviderDescriptor::from_settings(kind, &config.provider(kind));
            if !descriptor.is_available() {
                let missing: Vec<&str> = descriptor
                    .missing_credentials()
                    .iter()
                    .map(|f| f.as_str())
                    .collect();
                debug!(provider = %kind, missing = ?missing, "provider excluded from registry");
                continue;
            }

            let adapter: Arc<dyn ProviderAdapter> = match kind.family() {
                AdapterFamily::Signed => Arc::new(HunyuanAdapter::new(descriptor, transport.clone())),
                AdapterFamily::Bearer => Arc::new(BearerAdapter::new(descriptor, transport.clone())),
            };
            adapters.insert(kind, adapter);
        }

        debug!(registered = adapters.len(), "provider registry built");
        Self { adapters }
    }

    /// Registry over pre-built adapters. A later adapter with the same identity replaces an earlier one.
    pub fn from_adapters<I>(adapters: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ProviderAdapter>>,
    {
        Self {
            adapters: adapters.into_iter().map(|a| (a.identity(), a)).collect(),
        }
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters.get(&kind)
    }

    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.adapters.contains_key(&kind)
    }

    /// Registered kinds, sorted by declaration order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.adapters.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HttpSettings, ProviderSettings};

    fn transport() -> HttpTransport {
        HttpTransport::new(&HttpSettings::default()).unwrap()
    }

    fn key(k: &str) -> ProviderSettings {
        ProviderSettings {
            api_key: Some(k.into()),
            ..ProviderSettings::default()
        }
    }

    #[test]
    fn test_empty_config_builds_empty_registry() {
        let registry = ProviderRegistry::build(&GatewayConfig::default(), transport());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_credentials_are_excluded() {
        let config = GatewayConfig::default()
            .with_provider(ProviderKind::DeepSeek, key("sk-1"))
            .with_provider(ProviderKind::Groq, key(""))
            .with_provider(
                ProviderKind::Tencent,
                ProviderSettings {
                    secret_id: Some("AKID".into()),
                    ..ProviderSettings::default()
                },
            )
            .with_provider(ProviderKind::Xunfei, key("only-key"));

        let registry = ProviderRegistry::build(&config, transport());
        assert_eq!(registry.kinds(), vec![ProviderKind::DeepSeek]);
        assert!(!registry.contains(ProviderKind::Groq));
        assert!(!registry.contains(ProviderKind::Tencent));
        assert!(!registry.contains(ProviderKind::Xunfei));
    }

    #[test]
    fn test_family_dispatch() {
        let config = GatewayConfig::default()
            .with_provider(
                ProviderKind::Tencent,
                ProviderSettings {
                    secret_id: Some("AKID".into()),
                    secret_key: Some("SECRET".into()),
                    ..ProviderSettings::default()
                },
            )
            .with_provider(
                ProviderKind::Baidu,
                ProviderSettings {
                    api_key: Some("bk".into()),
                    secret_key: Some("bs".into()),
                    ..ProviderSettings::default()
                },
            );

        let registry = ProviderRegistry::build(&config, transport());
        assert_eq!(registry.len(), 2);
        for kind in [ProviderKind::Tencent, ProviderKind::Baidu] {
            let adapter = registry.get(kind).unwrap();
            assert_eq!(adapter.identity(), kind);
            assert!(adapter.is_available());
        }
    }
}
