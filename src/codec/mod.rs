//! MDER wire codec (§4.2): the closed catalogue of APDU shapes, the
//! `DATA-apdu` choice, and the embedded configuration structures.
//!
//! The codec is side-effect-free — it never allocates timers or mutates
//! FSM/DIM state, only converts between bytes and structs.

pub mod apdu;
pub mod config;
pub mod data_apdu;
pub mod nomenclature;
pub mod scan_report;

pub use apdu::{Aare, Aarq, Abrt, Apdu, Rlre, Rlrq};
pub use config::{AttributeValueAssertion, ConfigObject, ConfigReport, ConfigReportRsp, ConfigResult};
pub use data_apdu::{ActionArgs, DataApdu, DataApduMessage, EventReport, GetArgs, GetResult, RejectResult, SetArgs};
pub use scan_report::{
    ObservationFixed, ObservationVar, ScanReportInfoFixed, ScanReportInfoMPFixed, ScanReportInfoMPVar,
    ScanReportInfoVar, ScanReportPerFixed, ScanReportPerVar,
};
