//! The subtree roots walked by the collector.

use crate::model::Oid;

/// A named subtree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtree {
    /// MIB name, used in logs and errors.
    pub name: &'static str,
    pub root: Oid,
}

/// Ordered, immutable list of subtrees to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeSet {
    subtrees: Vec<Subtree>,
}

/// MIB-II, HOST-RESOURCES-MIB, IF-MIB and UCD-SNMP-MIB roots exposed by a
/// net-snmp agent on Linux. Collected in this order.
const LINUX_HOST_SUBTREES: [(&str, &[u32]); 10] = [
    ("system", &[1, 3, 6, 1, 2, 1, 1]),
    ("interfaces", &[1, 3, 6, 1, 2, 1, 2]),
    ("hrSystem", &[1, 3, 6, 1, 2, 1, 25, 1]),
    ("hrStorage", &[1, 3, 6, 1, 2, 1, 25, 2]),
    ("hrDevice", &[1, 3, 6, 1, 2, 1, 25, 3]),
    ("ifMIB", &[1, 3, 6, 1, 2, 1, 31]),
    ("ucdDaemons", &[1, 3, 6, 1, 4, 1, 2021, 2]),
    ("ucdMemory", &[1, 3, 6, 1, 4, 1, 2021, 4]),
    ("ucdLaTable", &[1, 3, 6, 1, 4, 1, 2021, 10]),
    ("ucdCPU", &[1, 3, 6, 1, 4, 1, 2021, 11]),
];

impl SubtreeSet {
    pub fn new(subtrees: Vec<Subtree>) -> Self {
        Self { subtrees }
    }

    /// The ten subtrees of a Linux host running net-snmp.
    pub fn linux_host() -> Self {
        Self::new(
            LINUX_HOST_SUBTREES
                .iter()
                .map(|&(name, root)| Subtree {
                    name,
                    root: Oid::from(root),
                })
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subtree> {
        self.subtrees.iter()
    }

    pub fn len(&self) -> usize {
        self.subtrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subtrees.is_empty()
    }
}

impl Default for SubtreeSet {
    fn default() -> Self {
        Self::linux_host()
    }
}
