use thiserror::Error;

use super::Domain;

/// No registered backend claims a query's domain and symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no backend registered for '{domain}.{}'", symbol.as_deref().unwrap_or("*"))]
pub struct NoBackendFoundError {
    pub domain: Domain,
    pub symbol: Option<String>,
}

/// Invalid backend set, detected when the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("backends '{first}' and '{second}' both claim '{domain}.{symbol}'")]
    AmbiguousBackend {
        domain: Domain,
        symbol: String,
        first: String,
        second: String,
    },
}
