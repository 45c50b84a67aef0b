//! Main collector that walks every configured subtree of one target.
//!
//! The `Collector` opens a session, walks the subtrees in order and merges
//! the results into a single `CollectionResult`.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::collector::subtrees::{Subtree, SubtreeSet};
use crate::collector::traits::{
    SessionError, SessionOptions, SnmpSession, SnmpTransport, Target, Varbind,
};
use crate::collector::udp::UdpTransport;
use crate::model::CollectionResult;

/// Error type for a collection.
///
/// Both variants are fatal: the caller should treat the target as having
/// no data this cycle.
#[derive(Debug)]
pub enum CollectError {
    /// The session could not be opened.
    Connection(SessionError),
    /// Both bulk and sequential walks failed for one subtree.
    Retrieval {
        subtree: &'static str,
        bulk: SessionError,
        walk: SessionError,
        /// Entries gathered before the failure. Incomplete; for diagnostics only.
        partial: CollectionResult,
    },
}

impl CollectError {
    /// Returns the entries gathered before a retrieval failure.
    pub fn partial(&self) -> Option<&CollectionResult> {
        match self {
            CollectError::Connection(_) => None,
            CollectError::Retrieval { partial, .. } => Some(partial),
        }
    }
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Connection(e) => write!(f, "connection failed: {}", e),
            CollectError::Retrieval {
                subtree,
                bulk,
                walk,
                ..
            } => write!(
                f,
                "failed to retrieve {} (bulk walk: {}; walk: {})",
                subtree, bulk, walk
            ),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Connection(e) => Some(e),
            CollectError::Retrieval { walk, .. } => Some(walk),
        }
    }
}

/// Timing information for one subtree.
#[derive(Debug, Clone)]
pub struct SubtreeTiming {
    pub name: &'static str,
    pub entries: usize,
    pub duration: Duration,
    /// True if the bulk walk failed and the sequential walk was used.
    pub fallback: bool,
}

/// Timing information for the last collection.
///
/// Used for debugging and performance monitoring.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total collection time, including connect and close.
    pub total: Duration,
    /// Per-subtree results, in walk order. Stops at the failed subtree.
    pub subtrees: Vec<SubtreeTiming>,
}

/// Collects the configured subtrees from SNMP agents.
pub struct Collector<T: SnmpTransport> {
    transport: T,
    subtrees: SubtreeSet,
    options: SessionOptions,
    /// Timing information from the last collect call.
    last_timing: Option<CollectorTiming>,
}

impl<T: SnmpTransport> Collector<T> {
    /// Creates a collector for the Linux host subtrees with default
    /// session options.
    ///
    /// # Arguments
    /// * `transport` - Transport implementation (UDP or mock)
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            subtrees: SubtreeSet::linux_host(),
            options: SessionOptions::default(),
            last_timing: None,
        }
    }

    /// Replaces the list of subtrees to walk.
    pub fn with_subtrees(mut self, subtrees: SubtreeSet) -> Self {
        self.subtrees = subtrees;
        self
    }

    /// Replaces the session options passed to the transport.
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn subtrees(&self) -> &SubtreeSet {
        &self.subtrees
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Returns timing information from the last collect call.
    pub fn last_timing(&self) -> Option<&CollectorTiming> {
        self.last_timing.as_ref()
    }

    /// Collects every configured subtree from `target`.
    ///
    /// Each subtree is walked with GETBULK first and with GETNEXT if that
    /// fails. If both fail the collection stops and no further subtrees are
    /// requested. The session is closed before returning on every path.
    pub fn collect(&mut self, target: &Target) -> Result<CollectionResult, CollectError> {
        let start = Instant::now();
        let mut timing = CollectorTiming::default();

        debug!("connecting to {}", target);
        let mut session = match self.transport.connect(target, &self.options) {
            Ok(session) => session,
            Err(e) => {
                timing.total = start.elapsed();
                self.last_timing = Some(timing);
                return Err(CollectError::Connection(e));
            }
        };

        let outcome = collect_subtrees(&mut session, &self.subtrees, &mut timing);
        session.close();

        timing.total = start.elapsed();
        if let Ok(ref result) = outcome {
            debug!(
                "collected {} entries from {} in {:?}",
                result.len(),
                target,
                timing.total
            );
        }
        self.last_timing = Some(timing);
        outcome
    }
}

impl Collector<UdpTransport> {
    /// Creates a collector that talks to real agents over UDP.
    pub fn udp() -> Self {
        Self::new(UdpTransport::new())
    }
}

/// Fetches the Linux host subtrees from `host:port` using SNMPv2c.
///
/// Uses a 3 second timeout and 2 retries. Returns the merged value map, or
/// the first fatal error.
pub fn fetch_host_data(
    host: &str,
    port: u16,
    community: &str,
) -> Result<CollectionResult, CollectError> {
    Collector::udp().collect(&Target::new(host, port, community))
}

fn collect_subtrees<S: SnmpSession>(
    session: &mut S,
    subtrees: &SubtreeSet,
    timing: &mut CollectorTiming,
) -> Result<CollectionResult, CollectError> {
    let mut result = CollectionResult::new();

    for subtree in subtrees.iter() {
        let t = Instant::now();
        let (varbinds, fallback) = match walk_subtree(session, subtree) {
            Ok(walked) => walked,
            Err((bulk, walk)) => {
                warn!(
                    "giving up on {} ({}): bulk walk: {}; walk: {}",
                    subtree.name, subtree.root, bulk, walk
                );
                return Err(CollectError::Retrieval {
                    subtree: subtree.name,
                    bulk,
                    walk,
                    partial: result,
                });
            }
        };

        let entries = varbinds.len();
        for varbind in varbinds {
            result.insert(&varbind.oid, varbind.value);
        }

        let duration = t.elapsed();
        debug!(
            "{}: {} entries in {:?}{}",
            subtree.name,
            entries,
            duration,
            if fallback { " (sequential)" } else { "" }
        );
        timing.subtrees.push(SubtreeTiming {
            name: subtree.name,
            entries,
            duration,
            fallback,
        });
    }

    Ok(result)
}

/// Walks one subtree, bulk first. Returns the varbinds and whether the
/// sequential fallback was needed, or both errors.
fn walk_subtree<S: SnmpSession>(
    session: &mut S,
    subtree: &Subtree,
) -> Result<(Vec<Varbind>, bool), (SessionError, SessionError)> {
    let bulk_err = match session.bulk_walk(&subtree.root) {
        Ok(varbinds) => return Ok((varbinds, false)),
        Err(e) => e,
    };

    warn!(
        "bulk walk of {} failed ({}), falling back to sequential walk",
        subtree.name, bulk_err
    );

    match session.walk(&subtree.root) {
        Ok(varbinds) => Ok((varbinds, true)),
        Err(walk_err) => Err((bulk_err, walk_err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockAgent, MockCall, Operation};
    use crate::model::{Oid, SnmpValue};

    fn oid(s: &str) -> Oid {
        s.parse().unwrap()
    }

    fn target() -> Target {
        Target::new("192.0.2.10", 161, "public")
    }

    fn small_set() -> SubtreeSet {
        SubtreeSet::new(vec![
            Subtree {
                name: "system",
                root: oid(".1.3.6.1.2.1.1"),
            },
            Subtree {
                name: "interfaces",
                root: oid(".1.3.6.1.2.1.2"),
            },
            Subtree {
                name: "ifMIB",
                root: oid(".1.3.6.1.2.1.31"),
            },
        ])
    }

    fn small_agent() -> MockAgent {
        let mut agent = MockAgent::new();
        agent.add(".1.3.6.1.2.1.1.5.0", SnmpValue::OctetString(b"vm01".to_vec()));
        agent.add(".1.3.6.1.2.1.2.1.0", SnmpValue::Integer(1));
        agent.add(".1.3.6.1.2.1.2.2.1.14.1", SnmpValue::Counter32(5));
        agent.add(
            ".1.3.6.1.2.1.31.1.1.1.1.1",
            SnmpValue::OctetString(b"eth0".to_vec()),
        );
        agent
    }

    #[test]
    fn test_bulk_success_never_walks() {
        let agent = small_agent();
        let mut collector = Collector::new(agent.clone()).with_subtrees(small_set());

        let result = collector.collect(&target()).unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(
            result.get(".1.3.6.1.2.1.2.2.1.14.1"),
            Some(&SnmpValue::Counter32(5))
        );
        assert_eq!(
            result.get(".1.3.6.1.2.1.31.1.1.1.1.1"),
            Some(&SnmpValue::OctetString(b"eth0".to_vec()))
        );
        assert!(!agent.calls().iter().any(|c| matches!(c, MockCall::Walk(_))));
        assert_eq!(agent.calls().last(), Some(&MockCall::Close));
    }

    #[test]
    fn test_fallback_to_walk() {
        let mut agent = small_agent();
        agent.fail(Operation::BulkWalk, ".1.3.6.1.2.1.2");
        let mut collector = Collector::new(agent.clone()).with_subtrees(small_set());

        let result = collector.collect(&target()).unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(
            agent.calls(),
            vec![
                MockCall::Connect,
                MockCall::BulkWalk(oid(".1.3.6.1.2.1.1")),
                MockCall::BulkWalk(oid(".1.3.6.1.2.1.2")),
                MockCall::Walk(oid(".1.3.6.1.2.1.2")),
                MockCall::BulkWalk(oid(".1.3.6.1.2.1.31")),
                MockCall::Close,
            ]
        );

        let timing = collector.last_timing().unwrap();
        let fallbacks: Vec<bool> = timing.subtrees.iter().map(|s| s.fallback).collect();
        assert_eq!(fallbacks, vec![false, true, false]);
        let entries: Vec<usize> = timing.subtrees.iter().map(|s| s.entries).collect();
        assert_eq!(entries, vec![1, 2, 1]);
    }

    #[test]
    fn test_both_fail_aborts_and_closes() {
        let mut agent = small_agent();
        agent.fail(Operation::BulkWalk, ".1.3.6.1.2.1.2");
        agent.fail(Operation::Walk, ".1.3.6.1.2.1.2");
        let mut collector = Collector::new(agent.clone()).with_subtrees(small_set());

        let err = collector.collect(&target()).unwrap_err();

        match &err {
            CollectError::Retrieval {
                subtree, partial, ..
            } => {
                assert_eq!(*subtree, "interfaces");
                // Only the first subtree made it in.
                assert_eq!(partial.len(), 1);
                assert!(partial.contains(".1.3.6.1.2.1.1.5.0"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().contains("interfaces"));

        let calls = agent.calls();
        assert!(!calls.contains(&MockCall::BulkWalk(oid(".1.3.6.1.2.1.31"))));
        assert_eq!(calls.last(), Some(&MockCall::Close));
        assert_eq!(collector.last_timing().unwrap().subtrees.len(), 1);
    }

    #[test]
    fn test_connection_failure() {
        let mut agent = small_agent();
        agent.fail_connect();
        let mut collector = Collector::new(agent.clone()).with_subtrees(small_set());

        let err = collector.collect(&target()).unwrap_err();

        assert!(matches!(err, CollectError::Connection(_)));
        assert!(err.partial().is_none());
        assert_eq!(agent.calls(), vec![MockCall::Connect]);

        let timing = collector.last_timing().unwrap();
        assert!(timing.subtrees.is_empty());
    }

    #[test]
    fn test_timing_replaced_after_failed_connect() {
        let mut collector = Collector::new(small_agent()).with_subtrees(small_set());
        collector.collect(&target()).unwrap();
        assert_eq!(collector.last_timing().unwrap().subtrees.len(), 3);

        let mut unreachable = small_agent();
        unreachable.fail_connect();
        let subtrees = collector.subtrees().clone();
        let mut collector = Collector::new(unreachable).with_subtrees(subtrees);
        assert!(collector.collect(&target()).is_err());
        assert!(collector.last_timing().unwrap().subtrees.is_empty());
    }

    #[test]
    fn test_custom_session_options() {
        let options = SessionOptions {
            timeout: Duration::from_millis(500),
            retries: 0,
            ..SessionOptions::default()
        };
        let collector = Collector::new(MockAgent::new()).with_options(options.clone());

        assert_eq!(collector.options(), &options);
        assert_eq!(collector.subtrees().len(), 10);
    }

    #[test]
    fn test_empty_subtree_is_not_an_error() {
        let mut agent = MockAgent::new();
        agent.add(".1.3.6.1.2.1.1.5.0", SnmpValue::OctetString(b"vm01".to_vec()));
        let mut collector = Collector::new(agent).with_subtrees(small_set());

        let result = collector.collect(&target()).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_linux_host_walks_all_ten() {
        let agent = MockAgent::linux_host();
        let mut collector = Collector::new(agent.clone());

        let result = collector.collect(&target()).unwrap();

        let bulk_walks = agent
            .calls()
            .iter()
            .filter(|c| matches!(c, MockCall::BulkWalk(_)))
            .count();
        assert_eq!(bulk_walks, 10);
        assert_eq!(result.len(), agent.len());
    }
}
