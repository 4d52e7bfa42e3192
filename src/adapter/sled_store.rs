use std::collections::BTreeSet;

use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;

use super::{Adapter, GateValues};
use crate::error::{Error, Result};
use crate::gate::{Gate, TRUE_SENTINEL};
use crate::types::Target;

/// Persistent adapter backed by sled.
///
/// Known feature names live in the `features` tree. Gate values live in the
/// `gates` tree with one key per scalar slot or set member:
///
/// ```text
/// u32-BE(len(feature)) ++ feature ++ gate_key ++ 0x00 [++ member]
/// ```
///
/// so adding or removing a set member is a single key write and never a
/// read-modify-write of the whole set.
pub struct SledAdapter {
    db: sled::Db,
    features: sled::Tree,
    gates: sled::Tree,
}

fn unavailable(action: &'static str) -> impl FnOnce(sled::Error) -> Error {
    move |e| Error::AdapterUnavailable(format!("failed to {}: {}", action, e))
}

fn feature_prefix(feature: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(4 + feature.len());
    key.extend_from_slice(&(feature.len() as u32).to_be_bytes());
    key.extend_from_slice(feature.as_bytes());
    key
}

fn slot_key(feature: &str, gate: Gate) -> Vec<u8> {
    let mut key = feature_prefix(feature);
    key.extend_from_slice(gate.key().as_bytes());
    key.push(0);
    key
}

fn member_key(feature: &str, gate: Gate, member: &str) -> Vec<u8> {
    let mut key = slot_key(feature, gate);
    key.extend_from_slice(member.as_bytes());
    key
}

fn decode(gate: &'static str, bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| Error::MalformedValue {
        gate,
        value: String::from_utf8_lossy(bytes).into_owned(),
    })
}

impl SledAdapter {
    pub fn new(db: sled::Db) -> Result<Self> {
        let features = db
            .open_tree("features")
            .map_err(unavailable("open features tree"))?;
        let gates = db
            .open_tree("gates")
            .map_err(unavailable("open gates tree"))?;
        Ok(Self {
            db,
            features,
            gates,
        })
    }

    /// Open a sled database at the given directory path.
    pub fn open(data_dir: &str) -> Result<Self> {
        let db = sled::open(data_dir).map_err(unavailable("open sled db"))?;
        Self::new(db)
    }

    /// A throwaway database that is deleted when dropped.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(unavailable("open temporary sled db"))?;
        Self::new(db)
    }

    fn flush(&self) -> Result<()> {
        self.db.flush().map_err(unavailable("flush"))?;
        Ok(())
    }

    fn clear_values(&self, feature: &str) -> Result<()> {
        let mut batch = sled::Batch::default();
        for item in self.gates.scan_prefix(feature_prefix(feature)) {
            let (key, _) = item.map_err(unavailable("read gate key"))?;
            batch.remove(key);
        }
        self.gates
            .apply_batch(batch)
            .map_err(unavailable("clear gate values"))
    }
}

impl Adapter for SledAdapter {
    fn name(&self) -> &str {
        "sled"
    }

    fn features(&self) -> Result<BTreeSet<String>> {
        self.features
            .iter()
            .keys()
            .map(|key| {
                let key = key.map_err(unavailable("read feature key"))?;
                decode("feature", &key)
            })
            .collect()
    }

    fn add(&self, feature: &str) -> Result<bool> {
        self.features
            .insert(feature.as_bytes(), Vec::<u8>::new())
            .map_err(unavailable("add feature"))?;
        self.flush()?;
        Ok(true)
    }

    fn remove(&self, feature: &str) -> Result<bool> {
        let keys = self
            .gates
            .scan_prefix(feature_prefix(feature))
            .keys()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(unavailable("read gate key"))?;

        // Unregistering and wiping the values commit together.
        (&self.features, &self.gates)
            .transaction(|(features, gates)| {
                features.remove(feature.as_bytes())?;
                for key in &keys {
                    gates.remove(key.clone())?;
                }
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(|e| match e {
                TransactionError::Storage(e) => unavailable("remove feature")(e),
                TransactionError::Abort(()) => {
                    Error::AdapterUnavailable("failed to remove feature: aborted".to_string())
                }
            })?;
        self.flush()?;
        Ok(true)
    }

    fn clear(&self, feature: &str) -> Result<bool> {
        self.clear_values(feature)?;
        self.flush()?;
        Ok(true)
    }

    fn get(&self, feature: &str) -> Result<GateValues> {
        let prefix = feature_prefix(feature);
        let mut values = GateValues::default();

        for item in self.gates.scan_prefix(&prefix) {
            let (key, value) = item.map_err(unavailable("read gate values"))?;
            let rest = &key[prefix.len()..];
            let Some(split) = rest.iter().position(|b| *b == 0) else {
                return Err(Error::MalformedValue {
                    gate: "unknown",
                    value: String::from_utf8_lossy(rest).into_owned(),
                });
            };
            let (gate_key, member) = (&rest[..split], &rest[split + 1..]);

            match std::str::from_utf8(gate_key).ok().and_then(Gate::from_name) {
                Some(Gate::Boolean) => values.boolean = Some(decode("boolean", &value)?),
                Some(Gate::Group) => {
                    values.groups.insert(decode("group", member)?);
                }
                Some(Gate::Actor) => {
                    values.actors.insert(decode("actor", member)?);
                }
                Some(Gate::PercentageOfActors) => {
                    values.percentage_of_actors = Some(decode("percentage_of_actors", &value)?)
                }
                Some(Gate::PercentageOfTime) => {
                    values.percentage_of_time = Some(decode("percentage_of_time", &value)?)
                }
                None => {
                    return Err(Error::MalformedValue {
                        gate: "unknown",
                        value: String::from_utf8_lossy(gate_key).into_owned(),
                    })
                }
            }
        }

        Ok(values)
    }

    fn enable(&self, feature: &str, target: &Target) -> Result<bool> {
        let gate = target.gate();
        match target {
            Target::Boolean(_) => {
                self.gates
                    .insert(slot_key(feature, gate), TRUE_SENTINEL.as_bytes())
                    .map_err(unavailable("enable boolean gate"))?;
            }
            Target::Group(member) | Target::Actor(member) => {
                self.gates
                    .insert(member_key(feature, gate, member), Vec::<u8>::new())
                    .map_err(unavailable("add set member"))?;
            }
            Target::PercentageOfActors(p) | Target::PercentageOfTime(p) => {
                self.gates
                    .insert(slot_key(feature, gate), p.to_string().as_bytes())
                    .map_err(unavailable("set percentage"))?;
            }
        }
        self.flush()?;
        Ok(true)
    }

    fn disable(&self, feature: &str, target: &Target) -> Result<bool> {
        let gate = target.gate();
        match target {
            Target::Boolean(_) => self.clear_values(feature)?,
            Target::Group(member) | Target::Actor(member) => {
                self.gates
                    .remove(member_key(feature, gate, member))
                    .map_err(unavailable("remove set member"))?;
            }
            Target::PercentageOfActors(p) | Target::PercentageOfTime(p) => {
                self.gates
                    .insert(slot_key(feature, gate), p.to_string().as_bytes())
                    .map_err(unavailable("set percentage"))?;
            }
        }
        self.flush()?;
        Ok(true)
    }
}
