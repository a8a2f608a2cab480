//! Crate-wide error taxonomy (§7).
//!
//! One `thiserror` enum per subsystem, composed into the top-level
//! [`Error`], the same layering the teacher uses for `UsbError` in
//! `usb/mod.rs`.

use crate::codec::RejectResult;
use crate::transport::LinkError;
use thiserror::Error;

/// Codec-layer failures (§7 `Codec`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("declared length does not match decoded structure")]
    InvalidLength,
    #[error("unrecognised APDU or DATA-apdu choice: {0:#06x}")]
    UnknownChoice(u16),
    #[error("input ended before the declared structure was fully read")]
    TruncatedInput,
}

/// FSM-layer failures (§7 `State`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("operation not valid for the current connection state")]
    InvalidForState,
}

/// Association-rejection failure returned directly to the caller of
/// `request_associate` (§7 `Protocol`). Other terminal conditions
/// (abort, release, timeout) are reported asynchronously through
/// `on_disassociated`'s [`DisassociateReason`](crate::fsm::DisassociateReason)
/// instead of this error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("association rejected by peer, result {0:#06x}")]
    AssociationRejected(u16),
}

/// Per-request failures delivered to a request's own callback (§7
/// `Service`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("request timed out")]
    Timeout,
    #[error("agent returned an error response: {0:#06x}")]
    RemoteError(u16),
    #[error("agent rejected the request: {0:?}")]
    RemoteReject(RejectResult),
    #[error("connection aborted before a response arrived")]
    Aborted,
}

/// Resource/capability failures (§7 `Resource`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

/// Top-level error type returned by the crate's fallible public API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("transport send failed: {0}")]
    Link(#[from] LinkError),
}

pub type Result<T> = std::result::Result<T, Error>;
