use std::collections::HashMap;
use std::fmt;

use crate::backend::{ScannerBackend, SymbolPattern};
use crate::{Domain, NoBackendFoundError, Query, RegistryError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RouteKey {
    Exact(Domain, String),
    Any(Domain),
}

impl RouteKey {
    /// Whether some query would be covered by both keys.
    fn overlaps(&self, other: &RouteKey) -> bool {
        match (self, other) {
            (RouteKey::Exact(a, s), RouteKey::Exact(b, t)) => a == b && s == t,
            (RouteKey::Any(a), RouteKey::Any(b))
            | (RouteKey::Any(a), RouteKey::Exact(b, _))
            | (RouteKey::Exact(a, _), RouteKey::Any(b)) => a == b,
        }
    }
}

struct Claim {
    key: RouteKey,
    symbol: String,
    backend: usize,
}

/// Static routing table from query shape to the one backend that answers it.
///
/// Built once from the full backend list. Any shape two backends could both
/// answer is rejected here, including a domain-wide claim next to another
/// backend's exact symbol, so lookups never have to choose.
pub struct ScannerRegistry {
    backends: Vec<Box<dyn ScannerBackend>>,
    routes: HashMap<RouteKey, usize>,
}

impl ScannerRegistry {
    /// # Errors
    ///
    /// Returns [`RegistryError::AmbiguousBackend`] if some query shape would
    /// be claimed by two backends. A whole-domain claim overlaps every exact
    /// symbol another backend claims in that domain.
    pub fn new(backends: Vec<Box<dyn ScannerBackend>>) -> Result<Self, RegistryError> {
        let mut claims: Vec<Claim> = Vec::new();

        for (index, backend) in backends.iter().enumerate() {
            for cap in backend.capabilities() {
                let claim = match cap.symbol {
                    SymbolPattern::Exact(s) => Claim {
                        key: RouteKey::Exact(cap.domain, s.to_ascii_lowercase()),
                        symbol: s,
                        backend: index,
                    },
                    SymbolPattern::Any => Claim {
                        key: RouteKey::Any(cap.domain),
                        symbol: "*".to_owned(),
                        backend: index,
                    },
                };
                if let Some(prior) = claims
                    .iter()
                    .find(|c| c.backend != index && c.key.overlaps(&claim.key))
                {
                    let symbol = match prior.key {
                        RouteKey::Exact(..) => prior.symbol.clone(),
                        RouteKey::Any(_) => claim.symbol,
                    };
                    return Err(RegistryError::AmbiguousBackend {
                        domain: cap.domain,
                        symbol,
                        first: backends[prior.backend].name().to_owned(),
                        second: backend.name().to_owned(),
                    });
                }
                if !claims.iter().any(|c| c.key == claim.key) {
                    tracing::debug!(
                        backend = backend.name(),
                        domain = %cap.domain,
                        symbol = %claim.symbol,
                        "registered route"
                    );
                    claims.push(claim);
                }
            }
        }

        let routes = claims.into_iter().map(|c| (c.key, c.backend)).collect();
        Ok(Self { backends, routes })
    }

    /// The backend claiming `query`. Overlaps are rejected at construction,
    /// so at most one backend covers it.
    ///
    /// # Errors
    ///
    /// Returns [`NoBackendFoundError`] if no backend claims the shape.
    pub fn find_backend(&self, query: &Query) -> Result<&dyn ScannerBackend, NoBackendFoundError> {
        let exact = query
            .symbol()
            .map(|s| RouteKey::Exact(query.domain(), s.to_ascii_lowercase()))
            .and_then(|key| self.routes.get(&key));
        exact
            .or_else(|| self.routes.get(&RouteKey::Any(query.domain())))
            .map(|&idx| self.backends[idx].as_ref())
            .ok_or_else(|| NoBackendFoundError {
                domain: query.domain(),
                symbol: query.symbol().map(str::to_owned),
            })
    }

    /// Registered backend names, in registration order.
    #[must_use]
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl fmt::Debug for ScannerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScannerRegistry")
            .field("backends", &self.backend_names())
            .field("routes", &self.routes.len())
            .finish()
    }
}
