//! In-memory mock agent for testing the collector without a network.
//!
//! `MockAgent` holds an ordered OID table and answers walks from it, with
//! per-subtree failure injection. Every session operation is recorded so
//! tests can check which requests were made and that the session was closed.

use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::{Arc, Mutex, PoisonError};

use crate::collector::traits::{
    SessionError, SessionOptions, SnmpSession, SnmpTransport, Target, Varbind,
};
use crate::model::{Oid, SnmpValue};

/// A recorded session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Connect,
    BulkWalk(Oid),
    Walk(Oid),
    Close,
}

/// Walk operation selector for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    BulkWalk,
    Walk,
}

/// In-memory SNMP agent.
///
/// Clones share the call log, so a test can keep one handle and pass
/// another to the collector.
#[derive(Debug, Clone, Default)]
pub struct MockAgent {
    entries: BTreeMap<Oid, SnmpValue>,
    failures: HashSet<(Operation, Oid)>,
    connect_fails: bool,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockAgent {
    /// Creates an agent with no entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    ///
    /// # Panics
    /// If `oid` is not a valid dotted OID.
    pub fn add(&mut self, oid: &str, value: SnmpValue) {
        let oid: Oid = oid.parse().expect("mock agent OID must be valid");
        self.entries.insert(oid, value);
    }

    /// Makes `op` fail for walks rooted at `root`.
    ///
    /// # Panics
    /// If `root` is not a valid dotted OID.
    pub fn fail(&mut self, op: Operation, root: &str) {
        let root: Oid = root.parse().expect("mock agent OID must be valid");
        self.failures.insert((op, root));
    }

    /// Makes every connect attempt fail.
    pub fn fail_connect(&mut self) {
        self.connect_fails = true;
    }

    /// Number of entries held by the agent.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy of the recorded calls, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: MockCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn answer(&self, op: Operation, root: &Oid) -> Result<Vec<Varbind>, SessionError> {
        if self.failures.contains(&(op, root.clone())) {
            return Err(match op {
                Operation::BulkWalk => {
                    SessionError::Unsupported("GETBULK rejected by mock agent".to_string())
                }
                Operation::Walk => SessionError::Timeout,
            });
        }

        Ok(self
            .entries
            .range((Bound::Excluded(root.clone()), Bound::Unbounded))
            .take_while(|(oid, _)| oid.starts_with(root))
            .map(|(oid, value)| Varbind::new(oid.clone(), value.clone()))
            .collect())
    }
}

/// Session handed out by [`MockAgent`].
#[derive(Debug)]
pub struct MockSession {
    agent: MockAgent,
}

impl SnmpTransport for MockAgent {
    type Session = MockSession;

    fn connect(
        &self,
        _target: &Target,
        _options: &SessionOptions,
    ) -> Result<MockSession, SessionError> {
        self.record(MockCall::Connect);
        if self.connect_fails {
            return Err(SessionError::Transport(
                "mock agent unreachable".to_string(),
            ));
        }
        Ok(MockSession {
            agent: self.clone(),
        })
    }
}

impl SnmpSession for MockSession {
    fn bulk_walk(&mut self, root: &Oid) -> Result<Vec<Varbind>, SessionError> {
        self.agent.record(MockCall::BulkWalk(root.clone()));
        self.agent.answer(Operation::BulkWalk, root)
    }

    fn walk(&mut self, root: &Oid) -> Result<Vec<Varbind>, SessionError> {
        self.agent.record(MockCall::Walk(root.clone()));
        self.agent.answer(Operation::Walk, root)
    }

    fn close(&mut self) {
        self.agent.record(MockCall::Close);
    }
}
