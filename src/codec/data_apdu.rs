//! `DATA-apdu`: the tagged choice carried inside a `PRST` APDU (§4.2).
//!
//! Every inner form carries an `invoke_id` used by the service layer to
//! correlate a response with its originating request (§4.4).

use crate::bytelib::{Reader, Writer};
use crate::codec::config::AttributeValueAssertion;
use crate::codec::nomenclature::data_apdu_choice::*;
use crate::error::CodecError;

/// `ROER`/`RORJ` reject reason (§7 `Service::RemoteReject`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectResult {
    pub problem: u16,
}

/// Arguments of a `ROIV-CMIP-CONFIRMED-EVENT-REPORT` / result of the
/// matching `RORS` (§3, §4.5). The embedded `info` is the raw
/// `event_info`/`event_reply_info` octet string; higher layers (the
/// configuring state, or the PM-Store segment handling) decode it further
/// once they know which `event_type` it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReport {
    pub obj_handle: u16,
    pub event_time: u32,
    pub event_type: u16,
    pub info: Vec<u8>,
}

impl EventReport {
    fn encode(&self, w: &mut Writer) {
        w.write_u16(self.obj_handle);
        w.write_u32(self.event_time);
        w.write_u16(self.event_type);
        w.write_octets(&self.info);
    }

    fn decode(r: &mut Reader) -> Self {
        let obj_handle = r.read_u16();
        let event_time = r.read_u32();
        let event_type = r.read_u16();
        let info = r.read_octets();
        EventReport {
            obj_handle,
            event_time,
            event_type,
            info,
        }
    }
}

/// `ROIV-CMIP-GET` / `RORS-CMIP-GET`. An empty `attribute_ids` list in a
/// request means "all attributes" (§4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetArgs {
    pub obj_handle: u16,
    pub attribute_ids: Vec<u16>,
}

impl GetArgs {
    fn encode(&self, w: &mut Writer) {
        w.write_u16(self.obj_handle);
        w.write_u16(self.attribute_ids.len() as u16);
        for id in &self.attribute_ids {
            w.write_u16(*id);
        }
    }

    fn decode(r: &mut Reader) -> Self {
        let obj_handle = r.read_u16();
        let count = r.read_u16() as usize;
        let mut attribute_ids = Vec::with_capacity(count);
        for _ in 0..count {
            attribute_ids.push(r.read_u16());
        }
        GetArgs {
            obj_handle,
            attribute_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetResult {
    pub obj_handle: u16,
    pub attributes: Vec<AttributeValueAssertion>,
}

impl GetResult {
    fn encode(&self, w: &mut Writer) {
        w.write_u16(self.obj_handle);
        w.write_u16(self.attributes.len() as u16);
        for ava in &self.attributes {
            ava.encode(w);
        }
    }

    fn decode(r: &mut Reader) -> Self {
        let obj_handle = r.read_u16();
        let count = r.read_u16() as usize;
        let mut attributes = Vec::with_capacity(count);
        for _ in 0..count {
            attributes.push(AttributeValueAssertion::decode(r));
        }
        GetResult {
            obj_handle,
            attributes,
        }
    }
}

/// `ROIV`/`RORS`-CMIP-CONFIRMED-SET: a request to write a set of
/// attributes, and the agent's echo of the attributes actually applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetArgs {
    pub obj_handle: u16,
    pub attributes: Vec<AttributeValueAssertion>,
}

impl SetArgs {
    fn encode(&self, w: &mut Writer) {
        w.write_u16(self.obj_handle);
        w.write_u16(self.attributes.len() as u16);
        for ava in &self.attributes {
            ava.encode(w);
        }
    }

    fn decode(r: &mut Reader) -> Self {
        let obj_handle = r.read_u16();
        let count = r.read_u16() as usize;
        let mut attributes = Vec::with_capacity(count);
        for _ in 0..count {
            attributes.push(AttributeValueAssertion::decode(r));
        }
        SetArgs {
            obj_handle,
            attributes,
        }
    }
}

/// `ROIV`/`RORS`-CMIP-CONFIRMED-ACTION: an action invocation against an
/// object (e.g. PM-Store segment operations) and its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionArgs {
    pub obj_handle: u16,
    pub action_type: u16,
    pub info: Vec<u8>,
}

impl ActionArgs {
    fn encode(&self, w: &mut Writer) {
        w.write_u16(self.obj_handle);
        w.write_u16(self.action_type);
        w.write_octets(&self.info);
    }

    fn decode(r: &mut Reader) -> Self {
        let obj_handle = r.read_u16();
        let action_type = r.read_u16();
        let info = r.read_octets();
        ActionArgs {
            obj_handle,
            action_type,
            info,
        }
    }
}

/// The tagged choice inside a `DATA-apdu` (§4.2). Exhaustive over the forms
/// this manager needs to send or receive; unrecognised wire choices fail
/// decode with [`CodecError::UnknownChoice`] rather than falling through a
/// default case (§9 "Tagged variants").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataApduMessage {
    RoivConfirmedEventReport(EventReport),
    RoivGet(GetArgs),
    RoivConfirmedSet(SetArgs),
    RoivConfirmedAction(ActionArgs),
    RorsConfirmedEventReport(EventReport),
    RorsGet(GetResult),
    RorsConfirmedSet(SetArgs),
    RorsConfirmedAction(ActionArgs),
    Roer { error_value: u16, parameter: Vec<u8> },
    Rorj(RejectResult),
}

impl DataApduMessage {
    fn choice(&self) -> u16 {
        match self {
            DataApduMessage::RoivConfirmedEventReport(_) => ROIV_CMIP_CONFIRMED_EVENT_REPORT,
            DataApduMessage::RoivGet(_) => ROIV_CMIP_GET,
            DataApduMessage::RoivConfirmedSet(_) => ROIV_CMIP_CONFIRMED_SET,
            DataApduMessage::RoivConfirmedAction(_) => ROIV_CMIP_CONFIRMED_ACTION,
            DataApduMessage::RorsConfirmedEventReport(_) => RORS_CMIP_CONFIRMED_EVENT_REPORT,
            DataApduMessage::RorsGet(_) => RORS_CMIP_GET,
            DataApduMessage::RorsConfirmedSet(_) => RORS_CMIP_CONFIRMED_SET,
            DataApduMessage::RorsConfirmedAction(_) => RORS_CMIP_CONFIRMED_ACTION,
            DataApduMessage::Roer { .. } => ROER,
            DataApduMessage::Rorj(_) => RORJ,
        }
    }

    /// True if this is a `ROIV-*` request form (§4.5 rejects classify on
    /// this).
    pub fn is_roiv(&self) -> bool {
        matches!(
            self,
            DataApduMessage::RoivConfirmedEventReport(_)
                | DataApduMessage::RoivGet(_)
                | DataApduMessage::RoivConfirmedSet(_)
                | DataApduMessage::RoivConfirmedAction(_)
        )
    }

    /// True if this is a `RORS-*` response form, used by the service layer
    /// to decide whether an invoke-id's expected family matches (§4.4
    /// `check_known_invoke_id`).
    pub fn is_rors(&self) -> bool {
        matches!(
            self,
            DataApduMessage::RorsConfirmedEventReport(_)
                | DataApduMessage::RorsGet(_)
                | DataApduMessage::RorsConfirmedSet(_)
                | DataApduMessage::RorsConfirmedAction(_)
        )
    }

    pub fn is_roer(&self) -> bool {
        matches!(self, DataApduMessage::Roer { .. })
    }

    pub fn is_rorj(&self) -> bool {
        matches!(self, DataApduMessage::Rorj(_))
    }

    fn encode_body(&self, w: &mut Writer) {
        match self {
            DataApduMessage::RoivConfirmedEventReport(e) => e.encode(w),
            DataApduMessage::RoivGet(a) => a.encode(w),
            DataApduMessage::RoivConfirmedSet(a) => a.encode(w),
            DataApduMessage::RoivConfirmedAction(a) => a.encode(w),
            DataApduMessage::RorsConfirmedEventReport(e) => e.encode(w),
            DataApduMessage::RorsGet(r) => r.encode(w),
            DataApduMessage::RorsConfirmedSet(a) => a.encode(w),
            DataApduMessage::RorsConfirmedAction(a) => a.encode(w),
            DataApduMessage::Roer {
                error_value,
                parameter,
            } => {
                w.write_u16(*error_value);
                w.write_octets(parameter);
            }
            DataApduMessage::Rorj(r) => w.write_u16(r.problem),
        }
    }

    fn decode_body(choice: u16, r: &mut Reader) -> Result<Self, CodecError> {
        Ok(match choice {
            ROIV_CMIP_CONFIRMED_EVENT_REPORT => {
                DataApduMessage::RoivConfirmedEventReport(EventReport::decode(r))
            }
            ROIV_CMIP_GET => DataApduMessage::RoivGet(GetArgs::decode(r)),
            ROIV_CMIP_CONFIRMED_SET => DataApduMessage::RoivConfirmedSet(SetArgs::decode(r)),
            ROIV_CMIP_CONFIRMED_ACTION => {
                DataApduMessage::RoivConfirmedAction(ActionArgs::decode(r))
            }
            RORS_CMIP_CONFIRMED_EVENT_REPORT => {
                DataApduMessage::RorsConfirmedEventReport(EventReport::decode(r))
            }
            RORS_CMIP_GET => DataApduMessage::RorsGet(GetResult::decode(r)),
            RORS_CMIP_CONFIRMED_SET => DataApduMessage::RorsConfirmedSet(SetArgs::decode(r)),
            RORS_CMIP_CONFIRMED_ACTION => {
                DataApduMessage::RorsConfirmedAction(ActionArgs::decode(r))
            }
            ROER => {
                let error_value = r.read_u16();
                let parameter = r.read_octets();
                DataApduMessage::Roer {
                    error_value,
                    parameter,
                }
            }
            RORJ => DataApduMessage::Rorj(RejectResult {
                problem: r.read_u16(),
            }),
            other => return Err(CodecError::UnknownChoice(other)),
        })
    }
}

/// The full `DATA-apdu`: `invoke_id` plus the tagged message (§4.2, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataApdu {
    pub invoke_id: u16,
    pub message: DataApduMessage,
}

impl DataApdu {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(self.invoke_id);
        w.write_u16(self.message.choice());
        w.with_length_prefixed(|w| self.message.encode_body(w));
    }

    pub fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let invoke_id = r.read_u16();
        let choice = r.read_u16();
        let message = r
            .with_length_prefixed(|r| DataApduMessage::decode_body(choice, r))
            .ok_or(CodecError::TruncatedInput)??;
        if r.error() {
            return Err(CodecError::TruncatedInput);
        }
        Ok(DataApdu { invoke_id, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(apdu: DataApdu) {
        let mut w = Writer::with_capacity(512);
        apdu.encode(&mut w);
        let buf = w.buffer();
        let mut r = Reader::new(&buf);
        let decoded = DataApdu::decode(&mut r).unwrap();
        assert_eq!(decoded, apdu);
    }

    #[test]
    fn roiv_confirmed_event_report_round_trips() {
        round_trip(DataApdu {
            invoke_id: 7,
            message: DataApduMessage::RoivConfirmedEventReport(EventReport {
                obj_handle: 0,
                event_time: 0,
                event_type: crate::codec::nomenclature::event_type::MDC_NOTI_CONFIG,
                info: vec![1, 2, 3, 4],
            }),
        });
    }

    #[test]
    fn get_round_trips() {
        round_trip(DataApdu {
            invoke_id: 1,
            message: DataApduMessage::RoivGet(GetArgs {
                obj_handle: 0,
                attribute_ids: vec![],
            }),
        });
        round_trip(DataApdu {
            invoke_id: 2,
            message: DataApduMessage::RorsGet(GetResult {
                obj_handle: 0,
                attributes: vec![AttributeValueAssertion {
                    attribute_id: 9,
                    value: vec![0xFF],
                }],
            }),
        });
    }

    #[test]
    fn roer_and_rorj_round_trip() {
        round_trip(DataApdu {
            invoke_id: 3,
            message: DataApduMessage::Roer {
                error_value: crate::codec::nomenclature::error_value::NO_SUCH_OBJECT_INSTANCE,
                parameter: vec![],
            },
        });
        round_trip(DataApdu {
            invoke_id: 4,
            message: DataApduMessage::Rorj(RejectResult { problem: 1 }),
        });
    }

    #[test]
    fn unknown_choice_fails_to_decode() {
        let mut w = Writer::with_capacity(16);
        w.write_u16(99);
        w.write_u16(0xFFFF);
        w.with_length_prefixed(|_| {});
        let buf = w.buffer();
        let mut r = Reader::new(&buf);
        assert_eq!(DataApdu::decode(&mut r), Err(CodecError::UnknownChoice(0xFFFF)));
    }

    #[test]
    fn truncated_length_is_an_error() {
        // Declares a 10-byte body but the buffer only has 2.
        let buf = [0u8, 1, 0x02, 0x03, 0, 10, 0xAA, 0xBB];
        let mut r = Reader::new(&buf);
        assert_eq!(DataApdu::decode(&mut r), Err(CodecError::TruncatedInput));
    }
}
