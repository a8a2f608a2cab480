//! Transport abstraction (§6 "External interfaces").
//!
//! Generalises the teacher's USB/BLE `Transport` trait split to this
//! protocol's actual shape: the core only ever pushes bytes out — inbound
//! bytes are delivered into the core by whoever owns the transport, via
//! [`crate::ManagerConnection::on_bytes_received`], since framing the next
//! whole APDU off the wire is the transport's job, not the core's (§6
//! "receive(bytes) delivered as whole APDUs").

use thiserror::Error;

/// A transport-level failure (§7 `Error::Link`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct LinkError(pub String);

/// The framed byte pipe to an Agent (§6 "Transport contract"). Sends are
/// assumed non-blocking/buffered by the implementation (§5 "Scheduling
/// model": no handler may block on I/O).
pub trait Transport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError>;
}

/// Records every outbound frame instead of sending it anywhere, grounded
/// on the teacher's `MockTransport` test helper.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub sent: Vec<Vec<u8>>,
    pub fail_next: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport::default()
    }

    pub fn last_sent(&self) -> Option<&[u8]> {
        self.sent.last().map(|v| v.as_slice())
    }
}

impl Transport for MockTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(LinkError("mock transport: send failed".into()));
        }
        self.sent.push(bytes.to_vec());
        Ok(())
    }
}
