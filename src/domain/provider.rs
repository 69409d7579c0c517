//! Provider domain model
//!
//! A provider is an organization that hosts encounters. Providers are shared
//! by every encounter that references them, so the exporter caches the
//! dimension keys it resolves for a provider directly on the provider value.

use super::ids::{ProviderId, SurrogateKey};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A healthcare organization referenced by encounters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    /// Natural identifier of the provider
    pub id: ProviderId,

    /// Display name of the organization
    pub name: String,

    /// Street address
    #[serde(default)]
    pub address: Option<String>,

    /// City
    #[serde(default)]
    pub city: Option<String>,

    /// State, either a two-letter abbreviation or the full name
    #[serde(default)]
    pub state: Option<String>,

    /// Postal code
    #[serde(default)]
    pub zip: Option<String>,

    /// Keys resolved for this provider by the run that first saw it
    #[serde(skip)]
    resolved: OnceLock<ResolvedProviderKeys>,
}

/// Dimension keys resolved for a provider during one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedProviderKeys {
    /// Run that resolved these keys
    pub run_id: u64,
    /// Key of the provider's `sta3n` row
    pub station: SurrogateKey,
    /// Key of the provider's `location` row
    pub location: SurrogateKey,
}

impl Provider {
    /// Creates a provider with the given id and name
    pub fn new(id: ProviderId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: None,
            city: None,
            state: None,
            zip: None,
            resolved: OnceLock::new(),
        }
    }

    /// Sets the state
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Returns the keys cached for `run_id`, resolving them with `resolve` if
    /// no run has cached keys on this provider yet.
    ///
    /// Returns `None` when a different run already owns the cache slot; the
    /// caller must then resolve through the dimension tables directly.
    pub fn keys_for_run(
        &self,
        run_id: u64,
        resolve: impl FnOnce() -> (SurrogateKey, SurrogateKey),
    ) -> Option<ResolvedProviderKeys> {
        let cached = self.resolved.get_or_init(|| {
            let (station, location) = resolve();
            ResolvedProviderKeys {
                run_id,
                station,
                location,
            }
        });
        (cached.run_id == run_id).then_some(*cached)
    }

    /// Returns the cached keys, if any run resolved them
    pub fn cached_keys(&self) -> Option<ResolvedProviderKeys> {
        self.resolved.get().copied()
    }
}
