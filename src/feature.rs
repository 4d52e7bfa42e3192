use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::actor::Actor;
use crate::adapter::{Adapter, GateValues};
use crate::error::{Error, Result};
use crate::gate::{Gate, GateContext};
use crate::groups::GroupRegistry;
use crate::types::{Percentage, Target};

/// Coarse summary of a feature's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureState {
    /// On for everyone.
    On,
    /// Off for everyone.
    Off,
    /// On for some actors or some of the time.
    Conditional,
}

/// A named feature bound to the adapter holding its state.
#[derive(Clone)]
pub struct Feature {
    name: String,
    adapter: Arc<dyn Adapter>,
    groups: Arc<GroupRegistry>,
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("name", &self.name)
            .field("adapter", &self.adapter.name())
            .finish()
    }
}

impl Feature {
    pub fn new(
        name: impl Into<String>,
        adapter: Arc<dyn Adapter>,
        groups: Arc<GroupRegistry>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyFeatureName);
        }
        Ok(Self {
            name,
            adapter,
            groups,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks the feature for `actor`, or for nobody in particular when
    /// `actor` is `None`.
    ///
    /// The boolean gate wins outright when on; otherwise the feature is
    /// enabled if any other gate opens for the actor.
    pub fn is_enabled(&self, actor: Option<&dyn Actor>) -> Result<bool> {
        let values = self.adapter.get(&self.name)?;
        let context = GateContext {
            feature: &self.name,
            actor,
            groups: &self.groups,
        };

        for gate in Gate::ALL {
            if gate.is_enabled(&values, &context)? {
                tracing::debug!(feature = %self.name, gate = gate.name(), "feature enabled");
                return Ok(true);
            }
        }

        tracing::trace!(feature = %self.name, "feature disabled");
        Ok(false)
    }

    /// Enables the target's gate, registering the feature if needed.
    pub fn enable(&self, target: &Target) -> Result<bool> {
        tracing::trace!(feature = %self.name, gate = target.gate().name(), value = %target.value(), "enable");
        self.adapter.add(&self.name)?;
        self.adapter.enable(&self.name, target)
    }

    /// Disables the target's gate, registering the feature if needed.
    pub fn disable(&self, target: &Target) -> Result<bool> {
        tracing::trace!(feature = %self.name, gate = target.gate().name(), value = %target.value(), "disable");
        self.adapter.add(&self.name)?;
        self.adapter.disable(&self.name, target)
    }

    /// Turns the feature on for everyone.
    pub fn enable_all(&self) -> Result<bool> {
        self.enable(&Target::boolean(true))
    }

    /// Turns the feature off for everyone, wiping every gate.
    pub fn disable_all(&self) -> Result<bool> {
        self.disable(&Target::boolean(false))
    }

    pub fn enable_group(&self, group: &str) -> Result<bool> {
        self.enable(&Target::group(group))
    }

    pub fn disable_group(&self, group: &str) -> Result<bool> {
        self.disable(&Target::group(group))
    }

    pub fn enable_actor<A: Actor + ?Sized>(&self, actor: &A) -> Result<bool> {
        self.enable(&Target::actor(actor))
    }

    pub fn disable_actor<A: Actor + ?Sized>(&self, actor: &A) -> Result<bool> {
        self.disable(&Target::actor(actor))
    }

    pub fn enable_percentage_of_actors(&self, percentage: Percentage) -> Result<bool> {
        self.enable(&Target::percentage_of_actors(percentage))
    }

    pub fn disable_percentage_of_actors(&self) -> Result<bool> {
        self.disable(&Target::percentage_of_actors(Percentage::ZERO))
    }

    pub fn enable_percentage_of_time(&self, percentage: Percentage) -> Result<bool> {
        self.enable(&Target::percentage_of_time(percentage))
    }

    pub fn disable_percentage_of_time(&self) -> Result<bool> {
        self.disable(&Target::percentage_of_time(Percentage::ZERO))
    }

    pub fn add(&self) -> Result<bool> {
        self.adapter.add(&self.name)
    }

    pub fn remove(&self) -> Result<bool> {
        self.adapter.remove(&self.name)
    }

    pub fn clear(&self) -> Result<bool> {
        self.adapter.clear(&self.name)
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.adapter.features()?.contains(&self.name))
    }

    pub fn gate_values(&self) -> Result<GateValues> {
        self.adapter.get(&self.name)
    }

    pub fn state(&self) -> Result<FeatureState> {
        let values = self.gate_values()?;
        let full = |gate: Gate| -> Result<bool> { Ok(gate.percentage(&values)? == 100) };

        if Gate::Boolean.is_set(&values)?
            || full(Gate::PercentageOfActors)?
            || full(Gate::PercentageOfTime)?
        {
            return Ok(FeatureState::On);
        }
        for gate in &Gate::ALL[1..] {
            if gate.is_set(&values)? {
                return Ok(FeatureState::Conditional);
            }
        }
        Ok(FeatureState::Off)
    }

    /// Gates currently holding configuration.
    pub fn enabled_gates(&self) -> Result<Vec<Gate>> {
        let values = self.gate_values()?;
        let mut gates = Vec::new();
        for gate in Gate::ALL {
            if gate.is_set(&values)? {
                gates.push(gate);
            }
        }
        Ok(gates)
    }

    pub fn disabled_gates(&self) -> Result<Vec<Gate>> {
        let enabled = self.enabled_gates()?;
        Ok(Gate::ALL
            .into_iter()
            .filter(|gate| !enabled.contains(gate))
            .collect())
    }

    pub fn boolean_value(&self) -> Result<bool> {
        Gate::Boolean.is_set(&self.gate_values()?)
    }

    pub fn groups_value(&self) -> Result<BTreeSet<String>> {
        Ok(self.gate_values()?.groups)
    }

    pub fn actors_value(&self) -> Result<BTreeSet<String>> {
        Ok(self.gate_values()?.actors)
    }

    pub fn percentage_of_actors_value(&self) -> Result<u8> {
        Gate::PercentageOfActors.percentage(&self.gate_values()?)
    }

    pub fn percentage_of_time_value(&self) -> Result<u8> {
        Gate::PercentageOfTime.percentage(&self.gate_values()?)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
