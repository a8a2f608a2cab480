//! Manager-side IEEE 11073-20601 personal health device stack: the
//! association/configuration/operating state machine, its MDER wire
//! codec, the per-connection object mirror, and the service layer that
//! correlates remote operations by invoke-id.
//!
//! Layering (leaves first): [`bytelib`] -> [`codec`] -> [`dim`] ->
//! [`service`] -> [`fsm`], topped by [`connection::ManagerConnection`],
//! the single entry point most callers need.

pub mod bytelib;
pub mod codec;
pub mod connection;
pub mod dim;
pub mod error;
pub mod fsm;
pub mod logging;
pub mod registry;
pub mod service;
pub mod standard_config;
pub mod timer;
pub mod transport;

pub use connection::{DataEntry, DataList, ManagerConnection};
pub use error::{Error, Result};
pub use fsm::{DisassociateReason, Role, State};
pub use registry::{ExtendedConfigRegistry, InMemoryRegistry};
pub use transport::{LinkError, MockTransport, Transport};
