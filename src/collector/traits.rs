//! Abstractions over the SNMP transport to enable testing and mocking.
//!
//! The collector only needs "open a session, walk a subtree, close". The
//! `SnmpTransport`/`SnmpSession` pair lets it run against a real agent over
//! UDP or against an in-memory mock agent in tests.

use std::fmt;
use std::time::Duration;

use crate::model::{Oid, SnmpValue};

/// Address and credential of the agent to collect from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    /// SNMPv2c community string.
    pub community: String,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16, community: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            community: community.into(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Session settings handed to the transport on connect.
///
/// The protocol version is always SNMPv2c.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Time to wait for each response.
    pub timeout: Duration,
    /// Additional attempts per request after the first one times out.
    pub retries: u32,
    /// Entries requested per GETBULK exchange.
    pub max_repetitions: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            retries: 2,
            max_repetitions: 10,
        }
    }
}

/// One (OID, value) pair returned by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varbind {
    pub oid: Oid,
    pub value: SnmpValue,
}

impl Varbind {
    pub fn new(oid: Oid, value: SnmpValue) -> Self {
        Self { oid, value }
    }
}

/// Error type for transport operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No response within the timeout, after all retries.
    Timeout,
    /// Socket or address resolution failure.
    Transport(String),
    /// Malformed or unexpected response.
    Protocol(String),
    /// Agent answered with a non-zero error-status.
    ErrorStatus { status: u32, index: u32 },
    /// Operation not supported by the agent or transport.
    Unsupported(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Timeout => write!(f, "request timed out"),
            SessionError::Transport(msg) => write!(f, "transport error: {}", msg),
            SessionError::Protocol(msg) => write!(f, "protocol error: {}", msg),
            SessionError::ErrorStatus { status, index } => {
                write!(f, "agent error-status {} at index {}", status, index)
            }
            SessionError::Unsupported(msg) => write!(f, "unsupported: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => SessionError::Timeout,
            _ => SessionError::Transport(e.to_string()),
        }
    }
}

/// Opens sessions to SNMP agents.
pub trait SnmpTransport {
    type Session: SnmpSession;

    /// Opens a session to `target`.
    ///
    /// # Returns
    /// A ready session, or an error if the target cannot be resolved or
    /// the socket cannot be set up.
    fn connect(
        &self,
        target: &Target,
        options: &SessionOptions,
    ) -> Result<Self::Session, SessionError>;
}

/// An open session to one agent.
pub trait SnmpSession {
    /// Walks the subtree under `root` using GETBULK requests.
    ///
    /// Returns every entry whose OID lies strictly under `root`, in the
    /// order the agent returned them.
    fn bulk_walk(&mut self, root: &Oid) -> Result<Vec<Varbind>, SessionError>;

    /// Walks the subtree under `root` one GETNEXT exchange per entry.
    fn walk(&mut self, root: &Oid) -> Result<Vec<Varbind>, SessionError>;

    /// Releases the session. Further calls after `close` are not expected.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_options() {
        let options = SessionOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert_eq!(options.retries, 2);
        assert_eq!(options.max_repetitions, 10);
    }

    #[test]
    fn test_io_error_mapping() {
        let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        assert_eq!(SessionError::from(timeout), SessionError::Timeout);

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            SessionError::from(refused),
            SessionError::Transport(msg) if msg.contains("refused")
        ));
    }

    #[test]
    fn test_target_display() {
        let target = Target::new("10.0.0.5", 161, "public");
        assert_eq!(target.to_string(), "10.0.0.5:161");
    }
}
