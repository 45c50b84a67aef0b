//! Logical interface metric names and the table columns they are read from.

use crate::model::Oid;

/// One logical metric and the table column holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricColumn {
    pub name: &'static str,
    pub root: Oid,
}

/// Ordered, immutable metric name → column root table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricTable {
    columns: Vec<MetricColumn>,
}

/// ifTable (.1.3.6.1.2.1.2.2.1) and ifXTable (.1.3.6.1.2.1.31.1.1.1) columns.
///
/// `rx-packets` and `tx-data` both point at ifHCOutOctets (.10); ifHCInUcastPkts
/// (.7) is never read. Kept as is to stay compatible with existing consumers.
const INHERITED_COLUMNS: [(&str, &[u32]); 7] = [
    ("mtu", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 4]),
    ("rx-errors", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 14]),
    ("tx-errors", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 20]),
    ("rx-data", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 6]),
    ("rx-packets", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 10]),
    ("tx-data", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 10]),
    ("tx-packets", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 11]),
];

impl MetricTable {
    pub fn new(columns: Vec<MetricColumn>) -> Self {
        Self { columns }
    }

    /// The seven interface metrics reported by earlier versions of this tool.
    pub fn inherited() -> Self {
        Self::new(
            INHERITED_COLUMNS
                .iter()
                .map(|&(name, root)| MetricColumn {
                    name,
                    root: Oid::from(root),
                })
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricColumn> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns pairs of metric names that read the same column.
    pub fn duplicate_roots(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::new();
        for (i, a) in self.columns.iter().enumerate() {
            for b in &self.columns[i + 1..] {
                if a.root == b.root {
                    pairs.push((a.name, b.name));
                }
            }
        }
        pairs
    }
}

impl Default for MetricTable {
    fn default() -> Self {
        Self::inherited()
    }
}
