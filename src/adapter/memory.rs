use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Adapter, GateValues};
use crate::error::{Error, Result};
use crate::types::Target;

#[derive(Default)]
struct State {
    features: BTreeSet<String>,
    values: HashMap<String, GateValues>,
}

/// In-memory adapter backed by a `RwLock`. Every mutation runs under the
/// write lock, which makes it atomic per call.
#[derive(Default)]
pub struct MemoryAdapter {
    state: RwLock<State>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| Error::AdapterUnavailable(format!("memory adapter lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| Error::AdapterUnavailable(format!("memory adapter lock poisoned: {}", e)))
    }
}

impl Adapter for MemoryAdapter {
    fn name(&self) -> &str {
        "memory"
    }

    fn features(&self) -> Result<BTreeSet<String>> {
        Ok(self.read()?.features.clone())
    }

    fn add(&self, feature: &str) -> Result<bool> {
        self.write()?.features.insert(feature.to_string());
        Ok(true)
    }

    fn remove(&self, feature: &str) -> Result<bool> {
        let mut state = self.write()?;
        state.features.remove(feature);
        state.values.remove(feature);
        Ok(true)
    }

    fn clear(&self, feature: &str) -> Result<bool> {
        self.write()?.values.remove(feature);
        Ok(true)
    }

    fn get(&self, feature: &str) -> Result<GateValues> {
        Ok(self
            .read()?
            .values
            .get(feature)
            .cloned()
            .unwrap_or_default())
    }

    fn enable(&self, feature: &str, target: &Target) -> Result<bool> {
        self.write()?
            .values
            .entry(feature.to_string())
            .or_default()
            .apply_enable(target);
        Ok(true)
    }

    fn disable(&self, feature: &str, target: &Target) -> Result<bool> {
        let mut state = self.write()?;
        if let Some(values) = state.values.get_mut(feature) {
            values.apply_disable(target);
            if values.is_default() {
                state.values.remove(feature);
            }
        } else {
            let mut values = GateValues::default();
            values.apply_disable(target);
            if !values.is_default() {
                state.values.insert(feature.to_string(), values);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_concurrent_actor_enables_are_not_lost() {
        let adapter = Arc::new(MemoryAdapter::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let adapter = adapter.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        adapter
                            .enable("stats", &Target::Actor(format!("{}-{}", t, i)))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(adapter.get("stats").unwrap().actors.len(), 400);
    }

    #[test]
    fn test_disable_on_unknown_feature_keeps_no_entry() {
        let adapter = MemoryAdapter::new();
        adapter.disable("stats", &Target::group("admins")).unwrap();
        adapter.disable("stats", &Target::boolean(false)).unwrap();
        assert!(adapter.read().unwrap().values.is_empty());
        assert!(adapter.features().unwrap().is_empty());
    }
}
