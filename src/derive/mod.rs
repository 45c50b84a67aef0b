//! Metrics derived from collected SNMP data.

mod interface;
mod metric_table;

pub use interface::{
    DeriveError, IndexDiscovery, InterfaceDeriver, InterfaceMetrics, derive_interface_metrics,
};
pub use metric_table::{MetricColumn, MetricTable};
