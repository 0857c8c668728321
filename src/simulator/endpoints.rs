//! Static routing table of the Reactive Stock gateway.
//!
//! Built once before any actor starts and read-only afterwards. A missing
//! (service, operation) pair is a configuration error, surfaced at startup.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use reqwest::Method;

pub const TRADER_SERVICE: &str = "TraderService";
pub const ASSET_SERVICE: &str = "AssetService";
pub const TRANSACTION_SERVICE: &str = "TransactionService";
pub const TABLE_SERVICE: &str = "TableService";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    /// Path relative to the gateway, may hold `:name` segments.
    pub path: &'static str,
}

impl Endpoint {
    pub fn new(method: Method, path: &'static str) -> Self {
        Self { method, path }
    }

    /// Substitute `:name` path segments from `params`.
    /// Segments without a matching parameter are left untouched.
    pub fn resolve(&self, params: &[(&str, &str)]) -> String {
        self.path
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => params
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .unwrap_or(segment),
                None => segment,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    services: HashMap<&'static str, HashMap<&'static str, Endpoint>>,
}

impl EndpointRegistry {
    /// The gateway's full routing table.
    pub fn reactive_stock() -> Self {
        let table: [(&'static str, &'static str, Method, &'static str); 10] = [
            (TRADER_SERVICE, "login", Method::POST, "/api/trader/login"),
            (TRADER_SERVICE, "register", Method::POST, "/api/trader/register"),
            (TRADER_SERVICE, "balance", Method::GET, "/api/trader/balance"),
            (TRADER_SERVICE, "asset", Method::GET, "/api/trader/asset/:asset"),
            (TRADER_SERVICE, "assets", Method::GET, "/api/trader/assets"),
            (TRADER_SERVICE, "putAsset", Method::PUT, "/api/trader/asset/:asset"),
            (ASSET_SERVICE, "asset", Method::GET, "/api/asset/:asset"),
            (ASSET_SERVICE, "assets", Method::GET, "/api/asset/assets"),
            (TRANSACTION_SERVICE, "order", Method::POST, "/api/transaction/order"),
            (
                TABLE_SERVICE,
                "resolvedTransactionsStream",
                Method::GET,
                "/resolvedTransactionsStream",
            ),
        ];

        let mut services: HashMap<&'static str, HashMap<&'static str, Endpoint>> = HashMap::new();
        for (service, operation, method, path) in table {
            services
                .entry(service)
                .or_default()
                .insert(operation, Endpoint::new(method, path));
        }
        Self { services }
    }

    pub fn get(&self, service: &str, operation: &str) -> Result<&Endpoint> {
        self.services
            .get(service)
            .ok_or_else(|| anyhow!("unknown gateway service: {}", service))?
            .get(operation)
            .ok_or_else(|| anyhow!("no endpoint {}.{} in routing table", service, operation))
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::reactive_stock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_endpoints() {
        let registry = EndpointRegistry::reactive_stock();

        let login = registry.get(TRADER_SERVICE, "login").unwrap();
        assert_eq!(login.method, Method::POST);
        assert_eq!(login.path, "/api/trader/login");

        let put_asset = registry.get(TRADER_SERVICE, "putAsset").unwrap();
        assert_eq!(put_asset.method, Method::PUT);

        let stream = registry.get(TABLE_SERVICE, "resolvedTransactionsStream").unwrap();
        assert_eq!(stream.path, "/resolvedTransactionsStream");
    }

    #[test]
    fn test_missing_keys_are_errors() {
        let registry = EndpointRegistry::reactive_stock();
        assert!(registry.get("LedgerService", "login").is_err());
        assert!(registry.get(TRANSACTION_SERVICE, "cancel").is_err());
    }

    #[test]
    fn test_resolve_substitutes_placeholders() {
        let registry = EndpointRegistry::reactive_stock();
        let asset = registry.get(ASSET_SERVICE, "asset").unwrap();
        assert_eq!(asset.resolve(&[("asset", "BTC")]), "/api/asset/BTC");
        // no matching param
        assert_eq!(asset.resolve(&[]), "/api/asset/:asset");

        let order = registry.get(TRANSACTION_SERVICE, "order").unwrap();
        assert_eq!(order.resolve(&[("asset", "BTC")]), order.path);
    }
}
