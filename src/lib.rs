use std::sync::Arc;

use wasm_bindgen::prelude::wasm_bindgen;

pub mod actor;
pub mod adapter;
pub mod bucket;
pub mod config;
pub mod conformance;
pub mod error;
pub mod feature;
pub mod gate;
pub mod groups;
pub mod types;

pub use actor::Actor;
pub use adapter::instrumented::InstrumentedAdapter;
pub use adapter::memory::MemoryAdapter;
#[cfg(feature = "sled")]
pub use adapter::sled_store::SledAdapter;
pub use adapter::{Adapter, GateValues};
pub use config::GatekeeperConfig;
pub use error::{Error, Result};
pub use feature::{Feature, FeatureState};
pub use gate::Gate;
pub use groups::{Group, GroupRegistry};
pub use types::{Percentage, Target};

/// Entry point binding a storage adapter to a group registry.
///
/// # Examples
/// ```
/// use gatekeeper_lib::{Gatekeeper, MemoryAdapter, Percentage};
///
/// let gk = Gatekeeper::new(MemoryAdapter::new());
/// let search = gk.feature("search").unwrap();
/// search.enable_actor(&42u64).unwrap();
/// search.enable_percentage_of_actors(Percentage::new(10).unwrap()).unwrap();
///
/// assert!(gk.is_enabled("search", Some(&42u64)).unwrap());
/// assert!(!gk.is_enabled("search", None).unwrap());
/// ```
#[derive(Clone)]
pub struct Gatekeeper {
    adapter: Arc<dyn Adapter>,
    groups: Arc<GroupRegistry>,
}

impl Gatekeeper {
    /// Uses the process-wide group registry.
    pub fn new(adapter: impl Adapter + 'static) -> Self {
        Self::with_groups(Arc::new(adapter), groups::global())
    }

    pub fn with_groups(adapter: Arc<dyn Adapter>, groups: Arc<GroupRegistry>) -> Self {
        Self { adapter, groups }
    }

    /// Reads the adapter choice from `config`.
    pub fn from_config(config: &GatekeeperConfig) -> Result<Self> {
        Ok(Self::with_groups(config.open_adapter()?, groups::global()))
    }

    pub fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.adapter
    }

    pub fn groups(&self) -> &Arc<GroupRegistry> {
        &self.groups
    }

    pub fn feature(&self, name: &str) -> Result<Feature> {
        Feature::new(name, self.adapter.clone(), self.groups.clone())
    }

    pub fn is_enabled(&self, feature: &str, actor: Option<&dyn Actor>) -> Result<bool> {
        self.feature(feature)?.is_enabled(actor)
    }

    pub fn enable(&self, feature: &str, target: &Target) -> Result<bool> {
        self.feature(feature)?.enable(target)
    }

    pub fn disable(&self, feature: &str, target: &Target) -> Result<bool> {
        self.feature(feature)?.disable(target)
    }

    /// Every feature known to the adapter.
    pub fn features(&self) -> Result<Vec<Feature>> {
        self.adapter
            .features()?
            .into_iter()
            .map(|name| self.feature(&name))
            .collect()
    }

    pub fn register_group(
        &self,
        name: impl Into<String>,
        predicate: impl Fn(&dyn Actor) -> bool + Send + Sync + 'static,
    ) -> Arc<Group> {
        self.groups.register(name, predicate)
    }

    pub fn group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.get(name)
    }

    pub fn unregister_groups(&self) {
        self.groups.unregister_all();
    }
}

/// Percentage-of-actors bucket for `actor_id` under `feature`, for callers
/// that must agree with this crate on who is inside a rollout.
#[wasm_bindgen]
pub fn percentage_bucket(feature: &str, actor_id: &str) -> u32 {
    bucket::bucket(feature, actor_id) as u32
}
