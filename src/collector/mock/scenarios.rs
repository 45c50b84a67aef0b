//! Pre-built mock agent scenarios for testing.
//!
//! These scenarios provide realistic agent tables for testing collection and
//! interface metric derivation end to end.

use super::agent::MockAgent;
use crate::model::{Oid, SnmpValue};

/// (ifIndex, ifName, ifMtu, in octets, in errors, out octets, out errors)
type InterfaceRow = (u32, &'static str, i64, u64, u32, u64, u32);

const LINUX_HOST_INTERFACES: [InterfaceRow; 3] = [
    (1, "lo", 65536, 184_320, 0, 184_320, 0),
    (2, "eth0", 1500, 9_876_543_210, 3, 1_234_567_890, 1),
    (3, "eth1", 9000, 42, 0, 0, 0),
];

fn string(s: &str) -> SnmpValue {
    SnmpValue::OctetString(s.as_bytes().to_vec())
}

impl MockAgent {
    /// Creates an agent resembling net-snmp on a small Linux VM.
    ///
    /// Includes: system group, ifTable and ifXTable for lo/eth0/eth1,
    /// host resources, and the UCD daemon/memory/load/CPU groups. Every
    /// entry lies under one of the Linux host subtrees.
    pub fn linux_host() -> Self {
        let mut agent = Self::new();

        // system
        agent.add(".1.3.6.1.2.1.1.1.0", string("Linux vm01 6.1.0-18-amd64 x86_64"));
        if let Ok(object_id) = ".1.3.6.1.4.1.8072.3.2.10".parse::<Oid>() {
            agent.add(".1.3.6.1.2.1.1.2.0", SnmpValue::ObjectIdentifier(object_id));
        }
        agent.add(".1.3.6.1.2.1.1.3.0", SnmpValue::Timeticks(1_234_567));
        agent.add(".1.3.6.1.2.1.1.5.0", string("vm01"));

        // interfaces
        agent.add(
            ".1.3.6.1.2.1.2.1.0",
            SnmpValue::Integer(LINUX_HOST_INTERFACES.len() as i64),
        );
        for (index, name, mtu, in_octets, in_errors, out_octets, out_errors) in
            LINUX_HOST_INTERFACES
        {
            let entry = |column: u32| format!(".1.3.6.1.2.1.2.2.1.{}.{}", column, index);
            agent.add(&entry(1), SnmpValue::Integer(index as i64));
            agent.add(&entry(2), string(name));
            agent.add(&entry(4), SnmpValue::Integer(mtu));
            agent.add(&entry(10), SnmpValue::Counter32(in_octets as u32));
            agent.add(&entry(14), SnmpValue::Counter32(in_errors));
            agent.add(&entry(16), SnmpValue::Counter32(out_octets as u32));
            agent.add(&entry(20), SnmpValue::Counter32(out_errors));

            let xentry = |column: u32| format!(".1.3.6.1.2.1.31.1.1.1.{}.{}", column, index);
            agent.add(&xentry(1), string(name));
            agent.add(&xentry(6), SnmpValue::Counter64(in_octets));
            agent.add(&xentry(7), SnmpValue::Counter64(in_octets / 1000));
            agent.add(&xentry(10), SnmpValue::Counter64(out_octets));
            agent.add(&xentry(11), SnmpValue::Counter64(out_octets / 1000));
            agent.add(&xentry(15), SnmpValue::Unsigned32(10_000));
        }

        // hrSystem
        agent.add(".1.3.6.1.2.1.25.1.1.0", SnmpValue::Timeticks(1_234_600));
        agent.add(".1.3.6.1.2.1.25.1.5.0", SnmpValue::Unsigned32(2));
        agent.add(".1.3.6.1.2.1.25.1.6.0", SnmpValue::Unsigned32(142));

        // hrStorage
        agent.add(".1.3.6.1.2.1.25.2.2.0", SnmpValue::Integer(16_384_000));
        agent.add(".1.3.6.1.2.1.25.2.3.1.3.1", string("Physical memory"));
        agent.add(".1.3.6.1.2.1.25.2.3.1.5.1", SnmpValue::Integer(4_096_000));

        // hrDevice
        agent.add(
            ".1.3.6.1.2.1.25.3.2.1.3.196608",
            string("GenuineIntel: Intel(R) Xeon(R) CPU"),
        );
        agent.add(".1.3.6.1.2.1.25.3.3.1.2.196608", SnmpValue::Integer(3));

        // ucdDaemons
        agent.add(".1.3.6.1.4.1.2021.2.1.2.1", string("sshd"));
        agent.add(".1.3.6.1.4.1.2021.2.1.5.1", SnmpValue::Integer(1));

        // ucdMemory
        agent.add(".1.3.6.1.4.1.2021.4.5.0", SnmpValue::Integer(16_384_000));
        agent.add(".1.3.6.1.4.1.2021.4.6.0", SnmpValue::Integer(8_192_000));

        // ucdLaTable
        for (i, (label, load)) in [("Load-1", "0.15"), ("Load-5", "0.10"), ("Load-15", "0.05")]
            .iter()
            .enumerate()
        {
            agent.add(&format!(".1.3.6.1.4.1.2021.10.1.2.{}", i + 1), string(label));
            agent.add(&format!(".1.3.6.1.4.1.2021.10.1.3.{}", i + 1), string(load));
        }

        // ucdCPU
        agent.add(".1.3.6.1.4.1.2021.11.50.0", SnmpValue::Counter32(10_000));
        agent.add(".1.3.6.1.4.1.2021.11.52.0", SnmpValue::Counter32(3_000));
        agent.add(".1.3.6.1.4.1.2021.11.53.0", SnmpValue::Counter32(80_000));

        agent
    }
}
