//! SNMP host data collector.
//!
//! This module walks a fixed list of SNMP subtrees on one agent and merges
//! the returned values into a `CollectionResult`, with support for mocking
//! the agent in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Collector                           │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │     SubtreeSet      │   │      per subtree:           │  │
//! │  │  - system, ifTable  │   │  1. bulk_walk (GETBULK)     │  │
//! │  │  - hr*, ifMIB, ucd* │   │  2. walk (GETNEXT) fallback │  │
//! │  └──────────┬──────────┘   └──────────────┬──────────────┘  │
//! │             └──────────────┬──────────────┘                 │
//! │                            │                                │
//! │                   ┌────────▼────────┐                       │
//! │                   │  SnmpTransport  │ (trait)               │
//! │                   └────────┬────────┘                       │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              │               │               │
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │ UdpTransport│ │  MockAgent  │ │  Scenarios  │
//!       │ (snmp crate)│ │  (Testing)  │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production
//!
//! ```no_run
//! use snmpfetch::collector::fetch_host_data;
//!
//! let data = fetch_host_data("192.0.2.10", 161, "public").unwrap();
//! println!("{} entries", data.len());
//! ```
//!
//! ## Testing (with MockAgent)
//!
//! ```
//! use snmpfetch::collector::{Collector, MockAgent, Target};
//!
//! let agent = MockAgent::linux_host();
//! let mut collector = Collector::new(agent);
//! let data = collector.collect(&Target::new("vm01", 161, "public")).unwrap();
//! assert!(!data.is_empty());
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
mod subtrees;
pub mod traits;
mod udp;

pub use collector::{CollectError, Collector, CollectorTiming, SubtreeTiming, fetch_host_data};
pub use mock::MockAgent;
pub use subtrees::{Subtree, SubtreeSet};
pub use traits::{SessionError, SessionOptions, SnmpSession, SnmpTransport, Target, Varbind};
pub use udp::{UdpSession, UdpTransport};
