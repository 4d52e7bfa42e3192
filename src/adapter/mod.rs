pub mod instrumented;
pub mod memory;
#[cfg(feature = "sled")]
pub mod sled_store;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gate::TRUE_SENTINEL;
use crate::types::Target;

/// Version of the storage contract implemented by the adapters in this crate.
pub const ADAPTER_VERSION: u32 = 1;

/// Stored gate values for one feature.
///
/// Every slot is a string or a set of strings, whatever the backend: other
/// implementations may share the same storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateValues {
    pub boolean: Option<String>,
    pub groups: BTreeSet<String>,
    pub actors: BTreeSet<String>,
    pub percentage_of_actors: Option<String>,
    pub percentage_of_time: Option<String>,
}

impl GateValues {
    /// Applies an enable operation in place.
    pub fn apply_enable(&mut self, target: &Target) {
        match target {
            Target::Boolean(_) => self.boolean = Some(TRUE_SENTINEL.to_string()),
            Target::Group(name) => {
                self.groups.insert(name.clone());
            }
            Target::Actor(id) => {
                self.actors.insert(id.clone());
            }
            Target::PercentageOfActors(p) => self.percentage_of_actors = Some(p.to_string()),
            Target::PercentageOfTime(p) => self.percentage_of_time = Some(p.to_string()),
        }
    }

    /// Applies a disable operation in place. Disabling the boolean gate resets
    /// every slot.
    pub fn apply_disable(&mut self, target: &Target) {
        match target {
            Target::Boolean(_) => *self = GateValues::default(),
            Target::Group(name) => {
                self.groups.remove(name);
            }
            Target::Actor(id) => {
                self.actors.remove(id);
            }
            Target::PercentageOfActors(p) => self.percentage_of_actors = Some(p.to_string()),
            Target::PercentageOfTime(p) => self.percentage_of_time = Some(p.to_string()),
        }
    }

    pub fn is_default(&self) -> bool {
        *self == GateValues::default()
    }
}

/// Storage for gate values, keyed by feature name.
///
/// Every backend must behave identically from the caller's point of view:
/// unknown features read as [`GateValues::default`], and every mutation is
/// idempotent and atomic per (feature, gate, value). Backend failures surface
/// as [`crate::Error::AdapterUnavailable`].
pub trait Adapter: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> u32 {
        ADAPTER_VERSION
    }

    /// Names of every feature added and not since removed.
    fn features(&self) -> Result<BTreeSet<String>>;

    fn add(&self, feature: &str) -> Result<bool>;

    /// Forgets the feature and wipes all of its gate values.
    fn remove(&self, feature: &str) -> Result<bool>;

    /// Wipes the feature's gate values, keeping it in [`Adapter::features`].
    fn clear(&self, feature: &str) -> Result<bool>;

    fn get(&self, feature: &str) -> Result<GateValues>;

    fn enable(&self, feature: &str, target: &Target) -> Result<bool>;

    fn disable(&self, feature: &str, target: &Target) -> Result<bool>;

    /// Reads several features at once. Backends with a batch read should
    /// override this.
    fn get_multi(&self, features: &[&str]) -> Result<HashMap<String, GateValues>> {
        features
            .iter()
            .map(|feature| Ok((feature.to_string(), self.get(feature)?)))
            .collect()
    }
}

impl<A: Adapter + ?Sized> Adapter for Arc<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn version(&self) -> u32 {
        (**self).version()
    }

    fn features(&self) -> Result<BTreeSet<String>> {
        (**self).features()
    }

    fn add(&self, feature: &str) -> Result<bool> {
        (**self).add(feature)
    }

    fn remove(&self, feature: &str) -> Result<bool> {
        (**self).remove(feature)
    }

    fn clear(&self, feature: &str) -> Result<bool> {
        (**self).clear(feature)
    }

    fn get(&self, feature: &str) -> Result<GateValues> {
        (**self).get(feature)
    }

    fn enable(&self, feature: &str, target: &Target) -> Result<bool> {
        (**self).enable(feature, target)
    }

    fn disable(&self, feature: &str, target: &Target) -> Result<bool> {
        (**self).disable(feature, target)
    }

    fn get_multi(&self, features: &[&str]) -> Result<HashMap<String, GateValues>> {
        (**self).get_multi(features)
    }
}
