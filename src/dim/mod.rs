//! DIM (Domain Information Model): the in-memory mirror of the agent's
//! MDS and its sub-objects (§4.3).

pub mod data_request;
pub mod mds;
pub mod object;

pub use data_request::{check_data_request, DataRequestCapability};
pub use mds::{Mds, MdsAttributes, MDS_HANDLE};
pub use object::{
    Enumeration, EpiCfgScanner, MdsObject, MetricCommon, Numeric, PeriCfgScanner, PmStore, Rtsa, ScannerCommon,
    ScannerOperationalState,
};
