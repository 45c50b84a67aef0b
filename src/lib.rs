//! snmpfetch - SNMP host telemetry collection library.
//!
//! This library provides:
//! - `collector` - walks a fixed set of SNMP subtrees into a typed value map
//! - `derive` - per-interface traffic/error metrics derived from that map
//! - `model` - OIDs, typed values and the collection result
//!
//! The `snmpfetch` binary drives one collection and prints the result.

pub mod collector;
pub mod derive;
pub mod model;

pub use collector::{CollectError, Collector, fetch_host_data};
pub use derive::{DeriveError, InterfaceDeriver, InterfaceMetrics, derive_interface_metrics};
pub use model::{CollectionResult, Oid, SnmpValue};
