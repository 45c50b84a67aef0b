//! Typed SNMP values.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Oid;

/// A value returned by an SNMP agent, tagged with its wire type.
///
/// The tag matters to consumers: interface names are read from
/// `OctetString` payloads, while counters and gauges are coerced to `u64`
/// regardless of their original width.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum SnmpValue {
    /// ASN.1 INTEGER (Integer32).
    Integer(i64),
    /// Gauge32 / Unsigned32.
    Unsigned32(u32),
    Counter32(u32),
    Counter64(u64),
    /// Hundredths of a second.
    Timeticks(u32),
    OctetString(Vec<u8>),
    ObjectIdentifier(Oid),
    IpAddress([u8; 4]),
    Opaque(Vec<u8>),
    Null,
}

impl SnmpValue {
    /// Stable name of the wire type, used in logs and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            SnmpValue::Integer(_) => "INTEGER",
            SnmpValue::Unsigned32(_) => "Gauge32",
            SnmpValue::Counter32(_) => "Counter32",
            SnmpValue::Counter64(_) => "Counter64",
            SnmpValue::Timeticks(_) => "Timeticks",
            SnmpValue::OctetString(_) => "STRING",
            SnmpValue::ObjectIdentifier(_) => "OID",
            SnmpValue::IpAddress(_) => "IpAddress",
            SnmpValue::Opaque(_) => "Opaque",
            SnmpValue::Null => "NULL",
        }
    }

    /// Returns the raw payload of byte-carrying values.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SnmpValue::OctetString(b) | SnmpValue::Opaque(b) => Some(b),
            _ => None,
        }
    }

    /// Converts numeric values to `u64`.
    ///
    /// Unsigned types widen losslessly. A negative `Integer` wraps to its
    /// two's complement representation. Non-numeric values yield `None`.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            SnmpValue::Integer(v) => Some(v as u64),
            SnmpValue::Unsigned32(v) | SnmpValue::Counter32(v) | SnmpValue::Timeticks(v) => {
                Some(u64::from(v))
            }
            SnmpValue::Counter64(v) => Some(v),
            _ => None,
        }
    }

    /// Like [`as_u64`](Self::as_u64), but non-numeric values coerce to 0.
    pub fn coerce_u64(&self) -> u64 {
        self.as_u64().unwrap_or(0)
    }
}

impl fmt::Display for SnmpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnmpValue::Integer(v) => write!(f, "INTEGER: {}", v),
            SnmpValue::Unsigned32(v) => write!(f, "Gauge32: {}", v),
            SnmpValue::Counter32(v) => write!(f, "Counter32: {}", v),
            SnmpValue::Counter64(v) => write!(f, "Counter64: {}", v),
            SnmpValue::Timeticks(v) => write!(f, "Timeticks: ({})", v),
            SnmpValue::OctetString(b) => write!(f, "STRING: {}", String::from_utf8_lossy(b)),
            SnmpValue::ObjectIdentifier(oid) => write!(f, "OID: {}", oid),
            SnmpValue::IpAddress([a, b, c, d]) => write!(f, "IpAddress: {}.{}.{}.{}", a, b, c, d),
            SnmpValue::Opaque(b) => write!(f, "Opaque: {} bytes", b.len()),
            SnmpValue::Null => write!(f, "NULL"),
        }
    }
}
