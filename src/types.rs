use core::fmt;

use crate::actor::Actor;
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::groups::Group;

/// Whole-number percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const FULL: Percentage = Percentage(100);

    pub fn new(value: i64) -> Result<Self> {
        if (0..=100).contains(&value) {
            Ok(Percentage(value as u8))
        } else {
            Err(Error::InvalidPercentage(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Percentage {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Percentage::new(value)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The value handed to an adapter's `enable`/`disable`, tagged with the gate
/// it targets. Constructors coerce their input to the form that is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Boolean(bool),
    Group(String),
    Actor(String),
    PercentageOfActors(Percentage),
    PercentageOfTime(Percentage),
}

impl Target {
    pub fn boolean(value: bool) -> Self {
        Target::Boolean(value)
    }

    pub fn group(name: impl Into<String>) -> Self {
        Target::Group(name.into())
    }

    pub fn actor<A: Actor + ?Sized>(actor: &A) -> Self {
        Target::Actor(actor.actor_id())
    }

    pub fn percentage_of_actors(percentage: Percentage) -> Self {
        Target::PercentageOfActors(percentage)
    }

    pub fn percentage_of_time(percentage: Percentage) -> Self {
        Target::PercentageOfTime(percentage)
    }

    pub fn gate(&self) -> Gate {
        match self {
            Target::Boolean(_) => Gate::Boolean,
            Target::Group(_) => Gate::Group,
            Target::Actor(_) => Gate::Actor,
            Target::PercentageOfActors(_) => Gate::PercentageOfActors,
            Target::PercentageOfTime(_) => Gate::PercentageOfTime,
        }
    }

    /// String form written to storage.
    pub fn value(&self) -> String {
        match self {
            Target::Boolean(b) => b.to_string(),
            Target::Group(name) => name.clone(),
            Target::Actor(id) => id.clone(),
            Target::PercentageOfActors(p) | Target::PercentageOfTime(p) => p.to_string(),
        }
    }
}

/// A group is stored by name.
impl From<&Group> for Target {
    fn from(group: &Group) -> Self {
        Target::Group(group.name().to_string())
    }
}
