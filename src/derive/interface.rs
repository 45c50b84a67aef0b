//! Per-interface metrics derived from a collection.
//!
//! Interfaces are found in the ifName column of ifXTable; each metric is
//! then read from `<metric column>.<ifIndex>`. The index is the only link
//! between the naming column and the metric columns.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::derive::metric_table::MetricTable;
use crate::model::{CollectionResult, Oid};

/// Interface name → metric name → value.
pub type InterfaceMetrics = BTreeMap<String, BTreeMap<String, u64>>;

/// ifName column of ifXTable.
const IF_NAME: [u32; 11] = [1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1];

/// How interface indices are discovered in the naming column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexDiscovery {
    /// Probe 1, 2, 3, ... and stop at the first missing index.
    ///
    /// Interfaces after a hole in the table are not reported.
    #[default]
    Contiguous,
    /// Use every index present under the naming column.
    FullScan,
}

/// Error type for interface metric derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeriveError {
    /// The collection holds no entries at all.
    EmptyCollection,
    /// A naming entry does not carry a byte string.
    InvalidInterfaceName { oid: String, type_name: &'static str },
}

impl fmt::Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeriveError::EmptyCollection => write!(f, "no collected data"),
            DeriveError::InvalidInterfaceName { oid, type_name } => {
                write!(f, "interface name at {} is {}, expected STRING", oid, type_name)
            }
        }
    }
}

impl std::error::Error for DeriveError {}

/// Derives per-interface metrics from a `CollectionResult`.
#[derive(Debug, Clone)]
pub struct InterfaceDeriver {
    naming_root: Oid,
    metrics: MetricTable,
    discovery: IndexDiscovery,
}

impl Default for InterfaceDeriver {
    fn default() -> Self {
        Self {
            naming_root: Oid::from(&IF_NAME[..]),
            metrics: MetricTable::inherited(),
            discovery: IndexDiscovery::Contiguous,
        }
    }
}

impl InterfaceDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the metric table.
    pub fn with_metrics(mut self, metrics: MetricTable) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_discovery(mut self, discovery: IndexDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    /// Builds the interface metrics map.
    ///
    /// Every discovered interface gets an entry. A metric is present only if
    /// its `<column>.<index>` entry exists in `data`; missing entries are
    /// skipped. If two indices carry the same name, the higher index wins.
    pub fn derive(&self, data: &CollectionResult) -> Result<InterfaceMetrics, DeriveError> {
        if data.is_empty() {
            return Err(DeriveError::EmptyCollection);
        }

        for (a, b) in self.metrics.duplicate_roots() {
            debug!("metrics {} and {} read the same column", a, b);
        }

        let index = self.interface_index(data)?;
        debug!("discovered {} interfaces", index.len());

        let mut result = InterfaceMetrics::new();
        for (name, if_index) in index {
            let mut values = BTreeMap::new();
            for column in self.metrics.iter() {
                if let Some(value) = data.get_oid(&column.root.child(if_index)) {
                    values.insert(column.name.to_string(), value.coerce_u64());
                }
            }
            result.insert(name, values);
        }

        Ok(result)
    }

    /// Maps interface names to their table index.
    fn interface_index(&self, data: &CollectionResult) -> Result<BTreeMap<String, u32>, DeriveError> {
        let mut index = BTreeMap::new();
        for (oid, if_index) in self.discover(data) {
            let Some(value) = data.get_oid(&oid) else {
                continue;
            };
            let bytes = value
                .as_bytes()
                .ok_or_else(|| DeriveError::InvalidInterfaceName {
                    oid: oid.to_string(),
                    type_name: value.type_name(),
                })?;
            index.insert(String::from_utf8_lossy(bytes).into_owned(), if_index);
        }
        Ok(index)
    }

    /// Returns naming entries in ascending index order.
    fn discover(&self, data: &CollectionResult) -> Vec<(Oid, u32)> {
        match self.discovery {
            IndexDiscovery::Contiguous => {
                let mut found = Vec::new();
                for if_index in 1..=u32::MAX {
                    let oid = self.naming_root.child(if_index);
                    if data.get_oid(&oid).is_none() {
                        break;
                    }
                    found.push((oid, if_index));
                }
                found
            }
            IndexDiscovery::FullScan => data
                .subtree(&self.naming_root)
                .into_iter()
                .filter_map(|(oid, _)| {
                    let if_index = oid.index_under(&self.naming_root)?;
                    Some((oid, if_index))
                })
                .collect(),
        }
    }
}

/// Derives the inherited seven interface metrics with contiguous discovery.
pub fn derive_interface_metrics(data: &CollectionResult) -> Result<InterfaceMetrics, DeriveError> {
    InterfaceDeriver::default().derive(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::metric_table::MetricColumn;
    use crate::model::SnmpValue;

    fn data(entries: &[(&str, SnmpValue)]) -> CollectionResult {
        entries
            .iter()
            .map(|(oid, value)| (oid.parse::<Oid>().unwrap(), value.clone()))
            .collect()
    }

    fn name(s: &str) -> SnmpValue {
        SnmpValue::OctetString(s.as_bytes().to_vec())
    }

    #[test]
    fn test_end_to_end_example() {
        let input = data(&[
            (".1.3.6.1.2.1.31.1.1.1.1.1", name("eth0")),
            (".1.3.6.1.2.1.2.2.1.14.1", SnmpValue::Counter32(5)),
            (".1.3.6.1.2.1.2.2.1.20.1", SnmpValue::Counter32(2)),
        ]);

        let metrics = derive_interface_metrics(&input).unwrap();

        assert_eq!(metrics.len(), 1);
        let eth0 = &metrics["eth0"];
        assert_eq!(eth0.len(), 2);
        assert_eq!(eth0["rx-errors"], 5);
        assert_eq!(eth0["tx-errors"], 2);
        assert!(!eth0.contains_key("mtu"));
        assert!(!eth0.contains_key("rx-data"));
    }

    #[test]
    fn test_discovery_stops_at_first_gap() {
        let input = data(&[
            (".1.3.6.1.2.1.31.1.1.1.1.1", name("lo")),
            (".1.3.6.1.2.1.31.1.1.1.1.2", name("eth0")),
            (".1.3.6.1.2.1.31.1.1.1.1.4", name("eth2")),
            (".1.3.6.1.2.1.2.2.1.4.4", SnmpValue::Integer(1500)),
        ]);

        let metrics = derive_interface_metrics(&input).unwrap();

        let names: Vec<&str> = metrics.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["eth0", "lo"]);
        assert!(metrics["eth0"].is_empty());
    }

    #[test]
    fn test_full_scan_crosses_gaps() {
        let input = data(&[
            (".1.3.6.1.2.1.31.1.1.1.1.1", name("lo")),
            (".1.3.6.1.2.1.31.1.1.1.1.2", name("eth0")),
            (".1.3.6.1.2.1.31.1.1.1.1.4", name("eth2")),
            (".1.3.6.1.2.1.2.2.1.4.4", SnmpValue::Integer(1500)),
        ]);

        let metrics = InterfaceDeriver::new()
            .with_discovery(IndexDiscovery::FullScan)
            .derive(&input)
            .unwrap();

        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics["eth2"]["mtu"], 1500);
    }

    #[test]
    fn test_metrics_only_reachable_through_naming_column() {
        let input = data(&[
            (".1.3.6.1.2.1.2.2.1.14.1", SnmpValue::Counter32(5)),
            (".1.3.6.1.2.1.1.5.0", name("vm01")),
        ]);
        assert!(derive_interface_metrics(&input).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_names_later_index_wins() {
        let input = data(&[
            (".1.3.6.1.2.1.31.1.1.1.1.1", name("eth0")),
            (".1.3.6.1.2.1.31.1.1.1.1.2", name("eth0")),
            (".1.3.6.1.2.1.2.2.1.14.1", SnmpValue::Counter32(1)),
            (".1.3.6.1.2.1.2.2.1.20.2", SnmpValue::Counter32(9)),
        ]);

        let metrics = derive_interface_metrics(&input).unwrap();

        assert_eq!(metrics.len(), 1);
        let eth0 = &metrics["eth0"];
        assert_eq!(eth0.get("tx-errors"), Some(&9));
        assert_eq!(eth0.get("rx-errors"), None);
    }

    #[test]
    fn test_shared_column_fills_both_metrics() {
        let input = data(&[
            (".1.3.6.1.2.1.31.1.1.1.1.1", name("eth0")),
            (".1.3.6.1.2.1.31.1.1.1.6.1", SnmpValue::Counter64(100)),
            (".1.3.6.1.2.1.31.1.1.1.10.1", SnmpValue::Counter64(200)),
            (".1.3.6.1.2.1.31.1.1.1.11.1", SnmpValue::Counter64(3)),
        ]);

        let eth0 = &derive_interface_metrics(&input).unwrap()["eth0"];

        assert_eq!(eth0["rx-data"], 100);
        assert_eq!(eth0["rx-packets"], 200);
        assert_eq!(eth0["tx-data"], 200);
        assert_eq!(eth0["tx-packets"], 3);
    }

    #[test]
    fn test_counter64_kept_whole() {
        let input = data(&[
            (".1.3.6.1.2.1.31.1.1.1.1.1", name("eth0")),
            (".1.3.6.1.2.1.31.1.1.1.6.1", SnmpValue::Counter64(u64::MAX - 1)),
        ]);
        let metrics = derive_interface_metrics(&input).unwrap();
        assert_eq!(metrics["eth0"]["rx-data"], u64::MAX - 1);
    }

    #[test]
    fn test_non_numeric_metric_coerces_to_zero() {
        let input = data(&[
            (".1.3.6.1.2.1.31.1.1.1.1.1", name("eth0")),
            (".1.3.6.1.2.1.2.2.1.4.1", name("1500")),
        ]);
        let metrics = derive_interface_metrics(&input).unwrap();
        assert_eq!(metrics["eth0"]["mtu"], 0);
    }

    #[test]
    fn test_empty_collection_is_an_error() {
        assert_eq!(
            derive_interface_metrics(&CollectionResult::new()),
            Err(DeriveError::EmptyCollection)
        );
    }

    #[test]
    fn test_invalid_interface_name() {
        let input = data(&[(".1.3.6.1.2.1.31.1.1.1.1.1", SnmpValue::Integer(7))]);

        let err = derive_interface_metrics(&input).unwrap_err();

        assert_eq!(
            err,
            DeriveError::InvalidInterfaceName {
                oid: ".1.3.6.1.2.1.31.1.1.1.1.1".to_string(),
                type_name: "INTEGER",
            }
        );
        assert!(err.to_string().contains("expected STRING"));
    }

    #[test]
    fn test_non_utf8_name_is_decoded_lossily() {
        let input = data(&[(
            ".1.3.6.1.2.1.31.1.1.1.1.1",
            SnmpValue::OctetString(vec![b'e', b't', b'h', 0xff]),
        )]);
        let metrics = derive_interface_metrics(&input).unwrap();
        assert!(metrics.contains_key("eth\u{fffd}"));
    }

    #[test]
    fn test_custom_metric_table() {
        let input = data(&[
            (".1.3.6.1.2.1.31.1.1.1.1.1", name("eth0")),
            (".1.3.6.1.2.1.31.1.1.1.7.1", SnmpValue::Counter64(11)),
            (".1.3.6.1.2.1.2.2.1.14.1", SnmpValue::Counter32(5)),
        ]);
        let table = MetricTable::new(vec![MetricColumn {
            name: "rx-packets",
            root: ".1.3.6.1.2.1.31.1.1.1.7".parse().unwrap(),
        }]);

        let metrics = InterfaceDeriver::new().with_metrics(table).derive(&input).unwrap();

        assert_eq!(metrics["eth0"].len(), 1);
        assert_eq!(metrics["eth0"]["rx-packets"], 11);
    }

    #[test]
    fn test_input_is_not_modified() {
        let input = data(&[
            (".1.3.6.1.2.1.31.1.1.1.1.1", name("eth0")),
            (".1.3.6.1.2.1.2.2.1.14.1", SnmpValue::Counter32(5)),
        ]);
        let before = input.clone();
        let _ = derive_interface_metrics(&input).unwrap();
        assert_eq!(input, before);
    }
}
