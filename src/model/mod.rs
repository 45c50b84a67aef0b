//! Data model shared by the collector and the interface deriver.
//!
//! - [`Oid`] - dotted object identifier, used as lookup key and prefix
//! - [`SnmpValue`] - typed value that keeps the SNMP wire tag
//! - [`CollectionResult`] - OID string → value map produced by one collection

mod oid;
mod result;
mod value;

pub use oid::{Oid, ParseOidError};
pub use result::CollectionResult;
pub use value::SnmpValue;
