//! The value map produced by one collection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Oid, SnmpValue};

/// Values collected from one target, keyed by the OID's string form.
///
/// Filled by the collector during a single collection and read-only for
/// everything downstream. A second insert for the same OID replaces the
/// first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionResult {
    values: BTreeMap<String, SnmpValue>,
}

impl CollectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, oid: &Oid, value: SnmpValue) {
        self.values.insert(oid.to_string(), value);
    }

    /// Looks up a value by its dotted OID string (with leading dot).
    pub fn get(&self, oid: &str) -> Option<&SnmpValue> {
        self.values.get(oid)
    }

    pub fn get_oid(&self, oid: &Oid) -> Option<&SnmpValue> {
        self.values.get(&oid.to_string())
    }

    pub fn contains(&self, oid: &str) -> bool {
        self.values.contains_key(oid)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over all entries, ordered by key string.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SnmpValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the entries lying under `root`, in OID order.
    ///
    /// Keys that do not parse as OIDs are skipped.
    pub fn subtree(&self, root: &Oid) -> Vec<(Oid, &SnmpValue)> {
        let mut entries: Vec<(Oid, &SnmpValue)> = self
            .values
            .iter()
            .filter_map(|(key, value)| {
                let oid: Oid = key.parse().ok()?;
                oid.starts_with(root).then_some((oid, value))
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl FromIterator<(Oid, SnmpValue)> for CollectionResult {
    fn from_iter<I: IntoIterator<Item = (Oid, SnmpValue)>>(iter: I) -> Self {
        let mut result = CollectionResult::new();
        for (oid, value) in iter {
            result.insert(&oid, value);
        }
        result
    }
}
