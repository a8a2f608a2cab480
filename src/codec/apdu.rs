//! Outer APDU catalogue: `AARQ`, `AARE`, `RLRQ`, `RLRE`, `ABRT`, `PRST`
//! (§4.2, §6).
//!
//! Every APDU begins with a 16-bit choice discriminator and a 16-bit
//! length of the remainder (§6). `PRST` wraps a [`DataApdu`].

use crate::bytelib::{Reader, Writer};
use crate::codec::data_apdu::DataApdu;
use crate::codec::nomenclature::apdu_choice::*;
use crate::error::CodecError;

/// Association request (§4.5 "Association"). The manager sends this on
/// `req_assoc`; its content is opaque to the FSM beyond triggering the
/// transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aarq {
    pub protocol_version: u32,
}

/// Association response. `result` is one of
/// [`nomenclature::result_value`](crate::codec::nomenclature::result_value);
/// `config_report_id` and `system_id` are what the FSM uses to decide
/// between a known standard config, a cached extended config, or
/// `WaitingForConfig` (§4.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aare {
    pub result: u16,
    pub config_report_id: u16,
    pub system_id: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rlrq {
    pub reason: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rlre {
    pub reason: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Abrt {
    pub reason: u16,
}

/// The outer tagged choice (§4.2 "a closed catalogue of APDU, DATA-apdu,
/// and embedded structures").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Apdu {
    Aarq(Aarq),
    Aare(Aare),
    Rlrq(Rlrq),
    Rlre(Rlre),
    Abrt(Abrt),
    Prst(DataApdu),
}

impl Apdu {
    fn choice(&self) -> u16 {
        match self {
            Apdu::Aarq(_) => AARQ,
            Apdu::Aare(_) => AARE,
            Apdu::Rlrq(_) => RLRQ,
            Apdu::Rlre(_) => RLRE,
            Apdu::Abrt(_) => ABRT,
            Apdu::Prst(_) => PRST,
        }
    }

    fn encode_body(&self, w: &mut Writer) {
        match self {
            Apdu::Aarq(a) => w.write_u32(a.protocol_version),
            Apdu::Aare(a) => {
                w.write_u16(a.result);
                w.write_u16(a.config_report_id);
                w.write_octets(&a.system_id);
            }
            Apdu::Rlrq(r) => w.write_u16(r.reason),
            Apdu::Rlre(r) => w.write_u16(r.reason),
            Apdu::Abrt(a) => w.write_u16(a.reason),
            Apdu::Prst(d) => d.encode(w),
        }
    }

    /// Encodes the full, well-formed APDU: discriminator, true byte length
    /// of the remainder (computed from what was actually written, per §9
    /// "Byte-level lengths" — never from `size_of`), then the body.
    ///
    /// Fails with [`CodecError::InvalidLength`] if `capacity` was too small
    /// to hold the encoded APDU — the alternative is silently handing the
    /// caller a truncated frame.
    pub fn encode(&self, capacity: usize) -> Result<Vec<u8>, CodecError> {
        let mut w = Writer::with_capacity(capacity);
        w.write_u16(self.choice());
        w.with_length_prefixed(|w| self.encode_body(w));
        if w.overflowed() {
            return Err(CodecError::InvalidLength);
        }
        Ok(w.buffer())
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(bytes);
        let choice = r.read_u16();
        let apdu = r
            .with_length_prefixed(|r| -> Result<Apdu, CodecError> {
                Ok(match choice {
                    AARQ => Apdu::Aarq(Aarq {
                        protocol_version: r.read_u32(),
                    }),
                    AARE => Apdu::Aare(Aare {
                        result: r.read_u16(),
                        config_report_id: r.read_u16(),
                        system_id: r.read_octets(),
                    }),
                    RLRQ => Apdu::Rlrq(Rlrq {
                        reason: r.read_u16(),
                    }),
                    RLRE => Apdu::Rlre(Rlre {
                        reason: r.read_u16(),
                    }),
                    ABRT => Apdu::Abrt(Abrt {
                        reason: r.read_u16(),
                    }),
                    PRST => Apdu::Prst(DataApdu::decode(r)?),
                    other => return Err(CodecError::UnknownChoice(other)),
                })
            })
            .ok_or(CodecError::TruncatedInput)??;
        if r.error() {
            return Err(CodecError::TruncatedInput);
        }
        Ok(apdu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(apdu: Apdu) {
        let bytes = apdu.encode(256).unwrap();
        let decoded = Apdu::decode(&bytes).unwrap();
        assert_eq!(decoded, apdu);
    }

    #[test]
    fn aarq_round_trips() {
        round_trip(Apdu::Aarq(Aarq {
            protocol_version: 0x8000_0002,
        }));
    }

    #[test]
    fn aare_round_trips() {
        round_trip(Apdu::Aare(Aare {
            result: crate::codec::nomenclature::result_value::ACCEPTED,
            config_report_id: 0x4007,
            system_id: vec![0x12, 0x34, 0x56, 0x78],
        }));
    }

    #[test]
    fn release_and_abort_round_trip() {
        round_trip(Apdu::Rlrq(Rlrq { reason: 0 }));
        round_trip(Apdu::Rlre(Rlre { reason: 0 }));
        round_trip(Apdu::Abrt(Abrt { reason: 0 }));
    }

    #[test]
    fn well_formed_length_matches_remainder() {
        let bytes = Apdu::Aarq(Aarq::default()).encode(64).unwrap();
        let declared_len = u16::from_be_bytes([bytes[2], bytes[3]]) as usize;
        assert_eq!(declared_len, bytes.len() - 4);
    }

    #[test]
    fn capacity_too_small_is_an_invalid_length_error() {
        let err = Apdu::Aare(Aare {
            result: 0,
            config_report_id: 0,
            system_id: vec![0; 64],
        })
        .encode(4);
        assert_eq!(err, Err(CodecError::InvalidLength));
    }

    #[test]
    fn trailing_bytes_inside_declared_length_are_tolerated() {
        let mut bytes = Apdu::Rlrq(Rlrq { reason: 0 }).encode(64).unwrap();
        // Bump the declared length to pretend there's one extra trailing byte,
        // and append a junk byte to match it.
        let new_len = (u16::from_be_bytes([bytes[2], bytes[3]]) + 1).to_be_bytes();
        bytes[2] = new_len[0];
        bytes[3] = new_len[1];
        bytes.push(0xAB);

        let decoded = Apdu::decode(&bytes).unwrap();
        assert_eq!(decoded, Apdu::Rlrq(Rlrq { reason: 0 }));
    }
}
