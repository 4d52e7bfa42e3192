use core::fmt;

use rand::Rng;

use crate::actor::Actor;
use crate::adapter::GateValues;
use crate::bucket;
use crate::error::{Error, Result};
use crate::groups::GroupRegistry;

/// Value the boolean gate stores when switched on.
pub const TRUE_SENTINEL: &str = "true";

/// The five ways a feature can be opened up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    Boolean,
    Group,
    Actor,
    PercentageOfActors,
    PercentageOfTime,
}

/// Everything a gate may look at besides its stored value.
pub struct GateContext<'a> {
    pub feature: &'a str,
    pub actor: Option<&'a dyn Actor>,
    pub groups: &'a GroupRegistry,
}

impl Gate {
    /// Evaluation order. Boolean comes first and short-circuits.
    pub const ALL: [Gate; 5] = [
        Gate::Boolean,
        Gate::Group,
        Gate::Actor,
        Gate::PercentageOfActors,
        Gate::PercentageOfTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Gate::Boolean => "boolean",
            Gate::Group => "group",
            Gate::Actor => "actor",
            Gate::PercentageOfActors => "percentage_of_actors",
            Gate::PercentageOfTime => "percentage_of_time",
        }
    }

    /// Key of this gate's slot in a [`GateValues`] snapshot.
    pub fn key(&self) -> &'static str {
        match self {
            Gate::Boolean => "boolean",
            Gate::Group => "groups",
            Gate::Actor => "actors",
            Gate::PercentageOfActors => "percentage_of_actors",
            Gate::PercentageOfTime => "percentage_of_time",
        }
    }

    /// Accepts either the gate name or its snapshot key.
    pub fn from_name(name: &str) -> Option<Gate> {
        Gate::ALL
            .into_iter()
            .find(|gate| gate.name() == name || gate.key() == name)
    }

    pub fn is_enabled(&self, values: &GateValues, context: &GateContext) -> Result<bool> {
        let enabled = match self {
            Gate::Boolean => values.boolean.as_deref() == Some(TRUE_SENTINEL),
            Gate::Group => match context.actor {
                Some(actor) => values
                    .groups
                    .iter()
                    .any(|name| context.groups.matches(name, actor)),
                None => false,
            },
            Gate::Actor => match context.actor {
                Some(actor) => values.actors.contains(&actor.actor_id()),
                None => false,
            },
            Gate::PercentageOfActors => {
                let percentage = self.percentage(values)?;
                match context.actor {
                    Some(actor) => {
                        bucket::in_rollout(context.feature, &actor.actor_id(), percentage)
                    }
                    None => false,
                }
            }
            Gate::PercentageOfTime => {
                let percentage = self.percentage(values)?;
                percentage > 0 && rand::thread_rng().gen_range(0..100u8) < percentage
            }
        };
        Ok(enabled)
    }

    /// Whether the gate holds anything other than its default value.
    pub fn is_set(&self, values: &GateValues) -> Result<bool> {
        Ok(match self {
            Gate::Boolean => values.boolean.as_deref() == Some(TRUE_SENTINEL),
            Gate::Group => !values.groups.is_empty(),
            Gate::Actor => !values.actors.is_empty(),
            Gate::PercentageOfActors | Gate::PercentageOfTime => self.percentage(values)? > 0,
        })
    }

    /// Parses a stored percentage. Absent means 0; anything that isn't an
    /// integer string in 0..=100 violates the storage contract.
    pub fn percentage(&self, values: &GateValues) -> Result<u8> {
        let raw = match self {
            Gate::PercentageOfActors => values.percentage_of_actors.as_deref(),
            Gate::PercentageOfTime => values.percentage_of_time.as_deref(),
            _ => return Ok(0),
        };
        match raw {
            None => Ok(0),
            Some(s) => match s.parse::<u8>() {
                Ok(p) if p <= 100 && p.to_string() == s => Ok(p),
                _ => Err(Error::MalformedValue {
                    gate: self.name(),
                    value: s.to_string(),
                }),
            },
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
