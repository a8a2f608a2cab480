//! `ScanReportInfoFixed` / `ScanReportInfoVar`: the observation lists
//! carried inside a measurement event report's `info` bytes while
//! `Operating` (§4.5). Real-time sample arrays are explicitly deferred
//! (§9 "RTSA deferred") — these two forms are the ones this manager
//! decodes.

use crate::bytelib::{Reader, Writer};
use crate::error::CodecError;

/// One handle's reading in a fixed-length scan report: a MDER-style
/// fixed-point observation value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationFixed {
    pub obj_handle: u16,
    pub value: i32,
}

/// One handle's reading in a variable-length scan report: an opaque,
/// class-specific byte value (e.g. an enumeration code or a string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationVar {
    pub obj_handle: u16,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReportInfoFixed {
    pub data_req_id: u16,
    pub scan_report_no: u16,
    pub observations: Vec<ObservationFixed>,
}

impl ScanReportInfoFixed {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(self.data_req_id);
        w.write_u16(self.scan_report_no);
        w.write_u16(self.observations.len() as u16);
        for obs in &self.observations {
            w.write_u16(obs.obj_handle);
            w.write_u32(obs.value as u32);
        }
    }

    pub fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let data_req_id = r.read_u16();
        let scan_report_no = r.read_u16();
        let count = r.read_u16() as usize;
        let mut observations = Vec::with_capacity(count);
        for _ in 0..count {
            let obj_handle = r.read_u16();
            let value = r.read_u32() as i32;
            observations.push(ObservationFixed { obj_handle, value });
        }
        if r.error() {
            return Err(CodecError::TruncatedInput);
        }
        Ok(ScanReportInfoFixed {
            data_req_id,
            scan_report_no,
            observations,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReportInfoVar {
    pub data_req_id: u16,
    pub scan_report_no: u16,
    pub observations: Vec<ObservationVar>,
}

impl ScanReportInfoVar {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(self.data_req_id);
        w.write_u16(self.scan_report_no);
        w.write_u16(self.observations.len() as u16);
        for obs in &self.observations {
            w.write_u16(obs.obj_handle);
            w.write_octets(&obs.value);
        }
    }

    pub fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let data_req_id = r.read_u16();
        let scan_report_no = r.read_u16();
        let count = r.read_u16() as usize;
        let mut observations = Vec::with_capacity(count);
        for _ in 0..count {
            let obj_handle = r.read_u16();
            let value = r.read_octets();
            observations.push(ObservationVar { obj_handle, value });
        }
        if r.error() {
            return Err(CodecError::TruncatedInput);
        }
        Ok(ScanReportInfoVar {
            data_req_id,
            scan_report_no,
            observations,
        })
    }
}

/// One person's slice of a multi-person fixed-length scan report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReportPerFixed {
    pub person_id: u16,
    pub observations: Vec<ObservationFixed>,
}

/// One person's slice of a multi-person variable-length scan report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReportPerVar {
    pub person_id: u16,
    pub observations: Vec<ObservationVar>,
}

/// Same shape as `ScanReportInfoFixed`, but allows inclusion of data from
/// multiple persons (§4.5 "Operating" multi-person variant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReportInfoMPFixed {
    pub data_req_id: u16,
    pub scan_report_no: u16,
    pub persons: Vec<ScanReportPerFixed>,
}

impl ScanReportInfoMPFixed {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(self.data_req_id);
        w.write_u16(self.scan_report_no);
        w.write_u16(self.persons.len() as u16);
        for person in &self.persons {
            w.write_u16(person.person_id);
            w.write_u16(person.observations.len() as u16);
            for obs in &person.observations {
                w.write_u16(obs.obj_handle);
                w.write_u32(obs.value as u32);
            }
        }
    }

    pub fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let data_req_id = r.read_u16();
        let scan_report_no = r.read_u16();
        let person_count = r.read_u16() as usize;
        let mut persons = Vec::with_capacity(person_count);
        for _ in 0..person_count {
            let person_id = r.read_u16();
            let obs_count = r.read_u16() as usize;
            let mut observations = Vec::with_capacity(obs_count);
            for _ in 0..obs_count {
                let obj_handle = r.read_u16();
                let value = r.read_u32() as i32;
                observations.push(ObservationFixed { obj_handle, value });
            }
            persons.push(ScanReportPerFixed { person_id, observations });
        }
        if r.error() {
            return Err(CodecError::TruncatedInput);
        }
        Ok(ScanReportInfoMPFixed {
            data_req_id,
            scan_report_no,
            persons,
        })
    }
}

/// Same shape as `ScanReportInfoVar`, but allows inclusion of data from
/// multiple persons (§4.5 "Operating" multi-person variant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReportInfoMPVar {
    pub data_req_id: u16,
    pub scan_report_no: u16,
    pub persons: Vec<ScanReportPerVar>,
}

impl ScanReportInfoMPVar {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(self.data_req_id);
        w.write_u16(self.scan_report_no);
        w.write_u16(self.persons.len() as u16);
        for person in &self.persons {
            w.write_u16(person.person_id);
            w.write_u16(person.observations.len() as u16);
            for obs in &person.observations {
                w.write_u16(obs.obj_handle);
                w.write_octets(&obs.value);
            }
        }
    }

    pub fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let data_req_id = r.read_u16();
        let scan_report_no = r.read_u16();
        let person_count = r.read_u16() as usize;
        let mut persons = Vec::with_capacity(person_count);
        for _ in 0..person_count {
            let person_id = r.read_u16();
            let obs_count = r.read_u16() as usize;
            let mut observations = Vec::with_capacity(obs_count);
            for _ in 0..obs_count {
                let obj_handle = r.read_u16();
                let value = r.read_octets();
                observations.push(ObservationVar { obj_handle, value });
            }
            persons.push(ScanReportPerVar { person_id, observations });
        }
        if r.error() {
            return Err(CodecError::TruncatedInput);
        }
        Ok(ScanReportInfoMPVar {
            data_req_id,
            scan_report_no,
            persons,
        })
    }
}
