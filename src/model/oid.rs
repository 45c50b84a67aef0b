//! SNMP object identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Object identifier: a path of non-negative integers in the MIB tree.
///
/// Ordering is lexicographic over components, which is the order an agent
/// returns entries in during a walk.
///
/// Displayed with a leading dot (`.1.3.6.1.2.1.1`); parsing accepts the
/// leading dot as optional.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Oid(Vec<u32>);

/// Error returned when a string is not a valid dotted OID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOidError {
    pub input: String,
    pub message: String,
}

impl fmt::Display for ParseOidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid OID '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for ParseOidError {}

impl Oid {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Returns this OID with `index` appended as the last component.
    ///
    /// Table rows live at `<column root>.<row index>`.
    pub fn child(&self, index: u32) -> Oid {
        let mut components = Vec::with_capacity(self.0.len() + 1);
        components.extend_from_slice(&self.0);
        components.push(index);
        Oid(components)
    }

    /// Returns true if `prefix` is this OID or one of its ancestors.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Returns the single component following `root`, if this OID is
    /// exactly one level below it.
    pub fn index_under(&self, root: &Oid) -> Option<u32> {
        if self.0.len() == root.0.len() + 1 && self.starts_with(root) {
            self.0.last().copied()
        } else {
            None
        }
    }
}

impl FromStr for Oid {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |message: &str| ParseOidError {
            input: s.to_string(),
            message: message.to_string(),
        };

        let trimmed = s.trim();
        let body = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(error("empty identifier"));
        }

        let components = body
            .split('.')
            .map(|part| {
                if part.is_empty() {
                    return Err(error("empty component"));
                }
                part.parse::<u32>()
                    .map_err(|e| error(&format!("component '{}': {}", part, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Oid(components))
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.0 {
            write!(f, ".{}", component)?;
        }
        Ok(())
    }
}

impl From<&[u32]> for Oid {
    fn from(components: &[u32]) -> Self {
        Oid(components.to_vec())
    }
}

impl Serialize for Oid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Oid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_leading_dot() {
        let a: Oid = ".1.3.6.1.2.1.1".parse().unwrap();
        let b: Oid = "1.3.6.1.2.1.1".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_slice(), &[1, 3, 6, 1, 2, 1, 1]);
        assert_eq!(a.to_string(), ".1.3.6.1.2.1.1");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<Oid>().is_err());
        assert!(".".parse::<Oid>().is_err());
        assert!(".1..3".parse::<Oid>().is_err());
        assert!(".1.3.x".parse::<Oid>().is_err());
        assert!(".1.3.-1".parse::<Oid>().is_err());

        let err = ".1.a".parse::<Oid>().unwrap_err();
        assert_eq!(err.input, ".1.a");
        assert!(err.to_string().contains("component 'a'"));
    }

    #[test]
    fn test_child_and_prefix() {
        let root: Oid = ".1.3.6.1.2.1.2.2.1.14".parse().unwrap();
        let row = root.child(3);
        assert_eq!(row.to_string(), ".1.3.6.1.2.1.2.2.1.14.3");
        assert!(row.starts_with(&root));
        assert!(row.starts_with(&row));
        assert!(!root.starts_with(&row));
        assert_eq!(row.index_under(&root), Some(3));
        assert_eq!(row.child(1).index_under(&root), None);
        assert_eq!(root.index_under(&root), None);
    }

    #[test]
    fn test_prefix_is_component_wise() {
        // .1.3.6.1.2.1.2 must not be treated as a prefix of .1.3.6.1.2.1.25
        let interfaces: Oid = ".1.3.6.1.2.1.2".parse().unwrap();
        let hr_system: Oid = ".1.3.6.1.2.1.25.1".parse().unwrap();
        assert!(!hr_system.starts_with(&interfaces));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut oids: Vec<Oid> = [".1.3.6.1.2.1.2.2.1.10.1", ".1.3.6.1.2.1.2.2.1.2.1", ".1.3.6.1.2.1.2"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        oids.sort();
        let rendered: Vec<String> = oids.iter().map(|o| o.to_string()).collect();
        assert_eq!(
            rendered,
            vec![".1.3.6.1.2.1.2", ".1.3.6.1.2.1.2.2.1.2.1", ".1.3.6.1.2.1.2.2.1.10.1"]
        );
    }
}
