use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use super::{Adapter, GateValues};
use crate::error::Result;
use crate::types::Target;

/// Wraps an adapter and traces every operation.
///
/// Each call runs inside an `adapter_operation` span carrying the adapter
/// name, operation and feature. Results pass through untouched.
pub struct InstrumentedAdapter<A> {
    inner: A,
}

impl<A: Adapter> InstrumentedAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn into_inner(self) -> A {
        self.inner
    }

    fn observe<T>(
        &self,
        operation: &'static str,
        feature: &str,
        target: Option<&Target>,
        f: impl FnOnce(&A) -> Result<T>,
    ) -> Result<T> {
        let span = tracing::debug_span!(
            "adapter_operation",
            adapter = self.inner.name(),
            operation,
            feature,
            gate = target.map(|t| t.gate().name()),
        );
        let _guard = span.enter();

        let start = Instant::now();
        let result = f(&self.inner);
        let elapsed_us = start.elapsed().as_micros() as u64;

        match &result {
            Ok(_) => tracing::debug!(elapsed_us, "adapter operation completed"),
            Err(e) => tracing::warn!(elapsed_us, error = %e, "adapter operation failed"),
        }
        result
    }
}

impl<A: Adapter> Adapter for InstrumentedAdapter<A> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn version(&self) -> u32 {
        self.inner.version()
    }

    fn features(&self) -> Result<BTreeSet<String>> {
        self.observe("features", "", None, |a| a.features())
    }

    fn add(&self, feature: &str) -> Result<bool> {
        self.observe("add", feature, None, |a| a.add(feature))
    }

    fn remove(&self, feature: &str) -> Result<bool> {
        self.observe("remove", feature, None, |a| a.remove(feature))
    }

    fn clear(&self, feature: &str) -> Result<bool> {
        self.observe("clear", feature, None, |a| a.clear(feature))
    }

    fn get(&self, feature: &str) -> Result<GateValues> {
        self.observe("get", feature, None, |a| a.get(feature))
    }

    fn enable(&self, feature: &str, target: &Target) -> Result<bool> {
        self.observe("enable", feature, Some(target), |a| a.enable(feature, target))
    }

    fn disable(&self, feature: &str, target: &Target) -> Result<bool> {
        self.observe("disable", feature, Some(target), |a| a.disable(feature, target))
    }

    fn get_multi(&self, features: &[&str]) -> Result<HashMap<String, GateValues>> {
        let joined = features.join(",");
        self.observe("get_multi", &joined, None, |a| a.get_multi(features))
    }
}
