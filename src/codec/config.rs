//! Configuration structures: `AVA_Type`, `ConfigObject`, `ConfigReport`,
//! `ConfigReportRsp` (§3 "Configuration", §4.2).

use crate::bytelib::{Reader, Writer};
use crate::error::CodecError;

/// An attribute-id / raw-value pair, as carried inside a `ConfigObject` or
/// an attribute-value map. The value is never interpreted by the codec
/// itself — only the DIM layer knows how to decode a given attribute id's
/// bytes (§4.2 "the codec is side-effect-free").
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttributeValueAssertion {
    pub attribute_id: u16,
    pub value: Vec<u8>,
}

impl AttributeValueAssertion {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(self.attribute_id);
        w.write_octets(&self.value);
    }

    pub fn decode(r: &mut Reader) -> Self {
        let attribute_id = r.read_u16();
        let value = r.read_octets();
        AttributeValueAssertion { attribute_id, value }
    }
}

/// One object description inside a `ConfigReport` (§3 "Configuration").
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConfigObject {
    pub obj_class: u16,
    pub obj_handle: u16,
    pub attributes: Vec<AttributeValueAssertion>,
}

impl ConfigObject {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(self.obj_class);
        w.write_u16(self.obj_handle);
        w.write_u16(self.attributes.len() as u16);
        w.with_length_prefixed(|w| {
            for ava in &self.attributes {
                ava.encode(w);
            }
        });
    }

    pub fn decode(r: &mut Reader) -> Option<Self> {
        let obj_class = r.read_u16();
        let obj_handle = r.read_u16();
        let attr_count = r.read_u16() as usize;
        r.with_length_prefixed(|r| {
            let mut attributes = Vec::with_capacity(attr_count);
            for _ in 0..attr_count {
                attributes.push(AttributeValueAssertion::decode(r));
            }
            ConfigObject {
                obj_class,
                obj_handle,
                attributes,
            }
        })
    }
}

/// The agent's declared object model (§3 "Configuration"). Invariant:
/// handles are unique within a report — checked by the FSM/DIM layer when
/// the report is installed, not by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigReport {
    pub config_report_id: u16,
    pub objects: Vec<ConfigObject>,
}

impl ConfigReport {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(self.config_report_id);
        w.write_u16(self.objects.len() as u16);
        w.write_u16(0); // reserved, matches the wire layout's count+reserved pairing
        for obj in &self.objects {
            obj.encode(w);
        }
    }

    pub fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let config_report_id = r.read_u16();
        let count = r.read_u16() as usize;
        let _reserved = r.read_u16();
        let mut objects = Vec::with_capacity(count);
        for _ in 0..count {
            match ConfigObject::decode(r) {
                Some(obj) => objects.push(obj),
                None => return Err(CodecError::TruncatedInput),
            }
        }
        if r.error() {
            return Err(CodecError::TruncatedInput);
        }
        Ok(ConfigReport {
            config_report_id,
            objects,
        })
    }
}

/// Outcome of evaluating a `ConfigReport`'s validity (§4.5 "Configuring").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigResult {
    Accepted,
    StandardConfigUnknown,
    Unsupported,
}

impl ConfigResult {
    pub fn to_wire(self) -> u16 {
        use crate::codec::nomenclature::config_result::*;
        match self {
            ConfigResult::Accepted => ACCEPTED_CONFIG,
            ConfigResult::StandardConfigUnknown => STANDARD_CONFIG_UNKNOWN,
            ConfigResult::Unsupported => UNSUPPORTED_CONFIG,
        }
    }

    pub fn from_wire(v: u16) -> Self {
        use crate::codec::nomenclature::config_result::*;
        match v {
            ACCEPTED_CONFIG => ConfigResult::Accepted,
            STANDARD_CONFIG_UNKNOWN => ConfigResult::StandardConfigUnknown,
            _ => ConfigResult::Unsupported,
        }
    }
}

/// The manager's reply to a `MDC_NOTI_CONFIG` event report (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigReportRsp {
    pub config_report_id: u16,
    pub result: ConfigResult,
}

impl ConfigReportRsp {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(self.config_report_id);
        w.write_u16(self.result.to_wire());
    }

    pub fn decode(r: &mut Reader) -> Self {
        let config_report_id = r.read_u16();
        let result = ConfigResult::from_wire(r.read_u16());
        ConfigReportRsp {
            config_report_id,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ConfigReport {
        ConfigReport {
            config_report_id: 0x4001,
            objects: vec![ConfigObject {
                obj_class: crate::codec::nomenclature::object_class::MDC_MOC_VMO_METRIC_NU,
                obj_handle: 1,
                attributes: vec![
                    AttributeValueAssertion {
                        attribute_id: 1,
                        value: vec![0xAA, 0xBB],
                    },
                    AttributeValueAssertion {
                        attribute_id: 2,
                        value: vec![],
                    },
                ],
            }],
        }
    }

    #[test]
    fn config_report_round_trips() {
        let report = sample_report();
        let mut w = Writer::with_capacity(256);
        report.encode(&mut w);
        let buf = w.buffer();

        let mut r = Reader::new(&buf);
        let decoded = ConfigReport::decode(&mut r).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn empty_config_report_decodes() {
        let report = ConfigReport {
            config_report_id: 0xBEEF,
            objects: vec![],
        };
        let mut w = Writer::with_capacity(32);
        report.encode(&mut w);
        let buf = w.buffer();
        let mut r = Reader::new(&buf);
        let decoded = ConfigReport::decode(&mut r).unwrap();
        assert_eq!(decoded, report);
        assert!(decoded.objects.is_empty());
    }

    #[test]
    fn config_report_rsp_round_trips() {
        let rsp = ConfigReportRsp {
            config_report_id: 0x4007,
            result: ConfigResult::Accepted,
        };
        let mut w = Writer::with_capacity(8);
        rsp.encode(&mut w);
        let buf = w.buffer();
        let mut r = Reader::new(&buf);
        assert_eq!(ConfigReportRsp::decode(&mut r), rsp);
    }
}
