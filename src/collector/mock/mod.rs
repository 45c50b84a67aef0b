//! Mock SNMP agent for testing without a network.

mod agent;
mod scenarios;

pub use agent::{MockAgent, MockCall, MockSession, Operation};
