//! SNMPv2c transport over UDP, backed by the `snmp` crate.
//!
//! The `snmp` crate stops decoding a response at the first varbind it cannot
//! represent, which includes the endOfMibView/noSuchObject/noSuchInstance
//! exceptions. The end of a walk therefore shows up as a short or empty
//! batch, or as an entry outside the walked subtree.

use snmp::{SnmpError, SnmpPdu, SyncSession, Value};
use tracing::{debug, trace};

use crate::collector::traits::{
    SessionError, SessionOptions, SnmpSession, SnmpTransport, Target, Varbind,
};
use crate::model::{Oid, ParseOidError, SnmpValue};

/// Opens [`UdpSession`]s to real agents.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpTransport;

impl UdpTransport {
    pub fn new() -> Self {
        Self
    }
}

impl SnmpTransport for UdpTransport {
    type Session = UdpSession;

    fn connect(
        &self,
        target: &Target,
        options: &SessionOptions,
    ) -> Result<UdpSession, SessionError> {
        let inner = SyncSession::new(
            (target.host.as_str(), target.port),
            target.community.as_bytes(),
            Some(options.timeout),
            0,
        )
        .map_err(|e| SessionError::Transport(format!("{}: {}", target, e)))?;

        Ok(UdpSession {
            inner: Some(inner),
            retries: options.retries,
            max_repetitions: options.max_repetitions.max(1),
            stale_replies: 0,
        })
    }
}

/// Outcome of a single request attempt.
#[derive(Debug, PartialEq, Eq)]
enum RequestError {
    /// No response within the timeout.
    Timeout,
    /// A response to an earlier, timed-out request was read instead.
    StaleReply,
    Failed(SessionError),
}

/// SNMPv2c session over a UDP socket.
///
/// Each request is retried up to `retries` more times when no response
/// arrives within the timeout. Late replies to timed-out attempts are
/// skipped when they are read later.
pub struct UdpSession {
    inner: Option<SyncSession>,
    retries: u32,
    max_repetitions: u32,
    /// Timed-out requests whose reply may still arrive.
    stale_replies: u32,
}

impl UdpSession {
    fn request<F>(&mut self, mut op: F) -> Result<Vec<Varbind>, SessionError>
    where
        F: FnMut(&mut SyncSession) -> Result<Vec<Varbind>, RequestError>,
    {
        let UdpSession {
            inner,
            retries,
            stale_replies,
            ..
        } = self;
        let inner = inner
            .as_mut()
            .ok_or_else(|| SessionError::Transport("session closed".to_string()))?;

        with_retries(*retries, stale_replies, || op(inner))
    }

    fn getbulk(&mut self, cursor: &Oid) -> Result<Vec<Varbind>, SessionError> {
        let max_repetitions = self.max_repetitions;
        self.request(|inner| {
            let pdu = inner
                .getbulk(&[cursor.as_slice()], 0, max_repetitions)
                .map_err(map_snmp_error)?;
            decode_pdu(pdu).map_err(RequestError::Failed)
        })
    }

    fn getnext(&mut self, cursor: &Oid) -> Result<Vec<Varbind>, SessionError> {
        self.request(|inner| {
            let pdu = inner.getnext(cursor.as_slice()).map_err(map_snmp_error)?;
            decode_pdu(pdu).map_err(RequestError::Failed)
        })
    }
}

impl SnmpSession for UdpSession {
    fn bulk_walk(&mut self, root: &Oid) -> Result<Vec<Varbind>, SessionError> {
        walk_cursor(root, |cursor| self.getbulk(cursor))
    }

    fn walk(&mut self, root: &Oid) -> Result<Vec<Varbind>, SessionError> {
        walk_cursor(root, |cursor| self.getnext(cursor))
    }

    fn close(&mut self) {
        // Dropping the session closes its socket.
        self.inner = None;
    }
}

/// Runs `op` until it succeeds, retrying up to `retries` times on timeout.
///
/// Every timeout may leave a late reply on the socket; `stale_replies`
/// counts them across requests so that reading one later resends the
/// request instead of failing it. Any other error is returned at once.
fn with_retries<T, F>(
    retries: u32,
    stale_replies: &mut u32,
    mut op: F,
) -> Result<T, SessionError>
where
    F: FnMut() -> Result<T, RequestError>,
{
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(RequestError::Timeout) => {
                *stale_replies += 1;
                if attempt >= retries {
                    return Err(SessionError::Timeout);
                }
                attempt += 1;
                debug!("request timed out, retry {}/{}", attempt, retries);
            }
            Err(RequestError::StaleReply) if *stale_replies > 0 => {
                *stale_replies -= 1;
                debug!("skipped late reply to a timed-out request");
            }
            Err(RequestError::StaleReply) => {
                return Err(SessionError::Protocol(
                    "response request-id mismatch".to_string(),
                ));
            }
            Err(RequestError::Failed(e)) => return Err(e),
        }
    }
}

/// Walks `root` by repeatedly fetching the entries after a cursor.
///
/// Stops on an empty batch or at the first entry outside the subtree. An
/// agent that does not advance the cursor is a protocol error.
fn walk_cursor<F>(root: &Oid, mut fetch: F) -> Result<Vec<Varbind>, SessionError>
where
    F: FnMut(&Oid) -> Result<Vec<Varbind>, SessionError>,
{
    let mut varbinds = Vec::new();
    let mut cursor = root.clone();

    loop {
        let batch = fetch(&cursor)?;
        if batch.is_empty() {
            return Ok(varbinds);
        }

        for varbind in batch {
            if !varbind.oid.starts_with(root) {
                return Ok(varbinds);
            }
            if varbind.oid <= cursor {
                return Err(SessionError::Protocol(format!(
                    "OID not increasing: {} after {}",
                    varbind.oid, cursor
                )));
            }
            trace!("{} = {}", varbind.oid, varbind.value);
            cursor = varbind.oid.clone();
            varbinds.push(varbind);
        }
    }
}

fn map_snmp_error(e: SnmpError) -> RequestError {
    match e {
        // The socket read timeout surfaces as a receive error.
        SnmpError::ReceiveError => RequestError::Timeout,
        SnmpError::RequestIdMismatch => RequestError::StaleReply,
        SnmpError::SendError => {
            RequestError::Failed(SessionError::Transport("send failed".to_string()))
        }
        other => RequestError::Failed(SessionError::Protocol(format!("{:?}", other))),
    }
}

fn decode_pdu(pdu: SnmpPdu<'_>) -> Result<Vec<Varbind>, SessionError> {
    if pdu.error_status != 0 {
        return Err(SessionError::ErrorStatus {
            status: pdu.error_status,
            index: pdu.error_index,
        });
    }

    let mut varbinds = Vec::new();
    for (name, value) in pdu.varbinds {
        let oid: Oid = name
            .to_string()
            .parse()
            .map_err(|e: ParseOidError| SessionError::Protocol(e.to_string()))?;
        varbinds.push(Varbind::new(oid, decode_value(value)?));
    }
    Ok(varbinds)
}

fn decode_value(value: Value<'_>) -> Result<SnmpValue, SessionError> {
    Ok(match value {
        Value::Integer(v) => SnmpValue::Integer(v),
        Value::Unsigned32(v) => SnmpValue::Unsigned32(v),
        Value::Counter32(v) => SnmpValue::Counter32(v),
        Value::Counter64(v) => SnmpValue::Counter64(v),
        Value::Timeticks(v) => SnmpValue::Timeticks(v),
        Value::OctetString(b) => SnmpValue::OctetString(b.to_vec()),
        Value::Opaque(b) => SnmpValue::Opaque(b.to_vec()),
        Value::IpAddress(addr) => SnmpValue::IpAddress(addr),
        Value::Null => SnmpValue::Null,
        Value::ObjectIdentifier(oid) => SnmpValue::ObjectIdentifier(
            oid.to_string()
                .parse()
                .map_err(|e: ParseOidError| SessionError::Protocol(e.to_string()))?,
        ),
        other => {
            return Err(SessionError::Protocol(format!(
                "unexpected value type in response: {:?}",
                other
            )));
        }
    })
}
