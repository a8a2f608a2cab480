//! Sub-object variants (§3 "Sub-object"): `Numeric`, `Enumeration`, `RTSA`,
//! `PMStore`, `EpiCfgScanner`, `PeriCfgScanner`.
//!
//! Each variant exclusively owns its attribute storage, as the spec
//! requires. The class-specific fields this crate bothers to decode are
//! kept small and typed; everything else from the `ConfigObject`'s
//! attribute list is retained verbatim in `raw_attributes` so nothing is
//! silently dropped on the floor.

use crate::codec::nomenclature::object_class::*;
use crate::codec::AttributeValueAssertion;

/// The handle/attribute part shared by Numeric and Enumeration metrics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetricCommon {
    pub handle: u16,
}

/// Scanner operational state (§6 `set_scanner_operational_state`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScannerOperationalState {
    #[default]
    Disabled,
    Enabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScannerCommon {
    pub handle: u16,
    pub operational_state: ScannerOperationalState,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Numeric {
    pub common: MetricCommon,
    pub value: Option<i32>,
    pub raw_attributes: Vec<AttributeValueAssertion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Enumeration {
    pub common: MetricCommon,
    pub value: Option<u16>,
    pub raw_attributes: Vec<AttributeValueAssertion>,
}

/// Real-time sample array. §9 "RTSA deferred": the class is recognised
/// (so its handle still participates in handle-uniqueness and the mirror)
/// but its attribute bytes are stored opaque rather than decoded, pending
/// a real consumer. See DESIGN.md for the open-question resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rtsa {
    pub common: MetricCommon,
    pub raw_attributes: Vec<AttributeValueAssertion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PmStore {
    pub handle: u16,
    pub segment_count: Option<u16>,
    pub raw_attributes: Vec<AttributeValueAssertion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EpiCfgScanner {
    pub common: ScannerCommon,
    pub raw_attributes: Vec<AttributeValueAssertion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PeriCfgScanner {
    pub common: ScannerCommon,
    pub raw_attributes: Vec<AttributeValueAssertion>,
}

/// Reserved attribute id this manager uses, internally, for a metric's
/// measured value when one isn't supplied at configuration time but
/// arrives later via a scan report. Configuration-time attribute lists
/// use it too, for devices that pre-seed an initial reading.
pub const ATTR_MEASURED_VALUE: u16 = 0x0100;

/// A tagged variant over every sub-object class this manager understands
/// (§3, §9 "Tagged variants"). Exhaustive pattern matching over this type
/// replaces the source's `choice`-plus-`union` layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MdsObject {
    Numeric(Numeric),
    Enumeration(Enumeration),
    Rtsa(Rtsa),
    PmStore(PmStore),
    EpiCfgScanner(EpiCfgScanner),
    PeriCfgScanner(PeriCfgScanner),
}

impl MdsObject {
    pub fn handle(&self) -> u16 {
        match self {
            MdsObject::Numeric(n) => n.common.handle,
            MdsObject::Enumeration(e) => e.common.handle,
            MdsObject::Rtsa(r) => r.common.handle,
            MdsObject::PmStore(p) => p.handle,
            MdsObject::EpiCfgScanner(s) => s.common.handle,
            MdsObject::PeriCfgScanner(s) => s.common.handle,
        }
    }

    /// Builds a sub-object of the given class from a `ConfigObject`'s
    /// attribute list, decoding the attributes this crate recognises and
    /// retaining the rest verbatim. Returns `None` for an unrecognised
    /// `obj_class` (the caller decides whether that's an error, per §4.3
    /// `mds_configure_operating`).
    pub fn from_config(obj_class: u16, obj_handle: u16, attrs: Vec<AttributeValueAssertion>) -> Option<Self> {
        Some(match obj_class {
            MDC_MOC_VMO_METRIC_NU => {
                let value = find_i32(&attrs, ATTR_MEASURED_VALUE);
                MdsObject::Numeric(Numeric {
                    common: MetricCommon { handle: obj_handle },
                    value,
                    raw_attributes: attrs,
                })
            }
            MDC_MOC_VMO_METRIC_ENUM => {
                let value = find_u16(&attrs, ATTR_MEASURED_VALUE);
                MdsObject::Enumeration(Enumeration {
                    common: MetricCommon { handle: obj_handle },
                    value,
                    raw_attributes: attrs,
                })
            }
            MDC_MOC_VMO_METRIC_SA_RT => MdsObject::Rtsa(Rtsa {
                common: MetricCommon { handle: obj_handle },
                raw_attributes: attrs,
            }),
            MDC_MOC_VMO_PMSTORE => {
                let segment_count = find_u16(&attrs, ATTR_SEGMENT_COUNT);
                MdsObject::PmStore(PmStore {
                    handle: obj_handle,
                    segment_count,
                    raw_attributes: attrs,
                })
            }
            MDC_MOC_SCAN_CFG_EPI => MdsObject::EpiCfgScanner(EpiCfgScanner {
                common: ScannerCommon {
                    handle: obj_handle,
                    operational_state: ScannerOperationalState::Disabled,
                },
                raw_attributes: attrs,
            }),
            MDC_MOC_SCAN_CFG_PERI => MdsObject::PeriCfgScanner(PeriCfgScanner {
                common: ScannerCommon {
                    handle: obj_handle,
                    operational_state: ScannerOperationalState::Disabled,
                },
                raw_attributes: attrs,
            }),
            _ => return None,
        })
    }

    /// Applies a fixed-point observation value to this sub-object, as
    /// decoded from a `ScanReportInfoFixed` while `Operating` (§4.5).
    /// No-op for classes a fixed scan report cannot target.
    pub fn apply_fixed_value(&mut self, value: i32) {
        if let MdsObject::Numeric(n) = self {
            n.value = Some(value);
        }
    }

    /// Applies a variable-length observation to this sub-object, as
    /// decoded from a `ScanReportInfoVar`.
    pub fn apply_var_value(&mut self, value: &[u8]) {
        if let MdsObject::Enumeration(e) = self {
            if value.len() >= 2 {
                e.value = Some(u16::from_be_bytes([value[0], value[1]]));
            }
        }
    }

    /// Applies one attribute-value assertion from an echoed `ConfirmedSet`
    /// result (§6 `set_scanner_operational_state`). A no-op for any
    /// variant/attribute-id combination this crate doesn't interpret.
    pub fn apply_attribute(&mut self, attribute_id: u16, value: &[u8]) {
        if attribute_id == ATTR_SCANNER_OP_STATE {
            let state = match value.first() {
                Some(1) => ScannerOperationalState::Enabled,
                _ => ScannerOperationalState::Disabled,
            };
            match self {
                MdsObject::EpiCfgScanner(s) => s.common.operational_state = state,
                MdsObject::PeriCfgScanner(s) => s.common.operational_state = state,
                _ => {}
            }
        }
    }
}

/// Reserved attribute id for a PM-Store's segment count.
pub const ATTR_SEGMENT_COUNT: u16 = 0x0101;

/// Reserved attribute id used by `set_scanner_operational_state` to carry
/// the new state in a `ConfirmedSet` request (§6 application surface).
pub const ATTR_SCANNER_OP_STATE: u16 = 0x0102;

fn find_i32(attrs: &[AttributeValueAssertion], id: u16) -> Option<i32> {
    attrs
        .iter()
        .find(|a| a.attribute_id == id)
        .filter(|a| a.value.len() >= 4)
        .map(|a| i32::from_be_bytes([a.value[0], a.value[1], a.value[2], a.value[3]]))
}

fn find_u16(attrs: &[AttributeValueAssertion], id: u16) -> Option<u16> {
    attrs
        .iter()
        .find(|a| a.attribute_id == id)
        .filter(|a| a.value.len() >= 2)
        .map(|a| u16::from_be_bytes([a.value[0], a.value[1]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognised_class_returns_none() {
        assert!(MdsObject::from_config(0xFFFF, 1, vec![]).is_none());
    }

    #[test]
    fn numeric_picks_up_seeded_value() {
        let attrs = vec![AttributeValueAssertion {
            attribute_id: ATTR_MEASURED_VALUE,
            value: 1205i32.to_be_bytes().to_vec(),
        }];
        let obj = MdsObject::from_config(MDC_MOC_VMO_METRIC_NU, 7, attrs).unwrap();
        match obj {
            MdsObject::Numeric(n) => {
                assert_eq!(n.common.handle, 7);
                assert_eq!(n.value, Some(1205));
            }
            _ => panic!("expected Numeric"),
        }
    }

    #[test]
    fn rtsa_is_opaque() {
        let attrs = vec![AttributeValueAssertion {
            attribute_id: 0xAAAA,
            value: vec![1, 2, 3],
        }];
        let obj = MdsObject::from_config(MDC_MOC_VMO_METRIC_SA_RT, 9, attrs.clone()).unwrap();
        match obj {
            MdsObject::Rtsa(r) => {
                assert_eq!(r.common.handle, 9);
                assert_eq!(r.raw_attributes, attrs);
            }
            _ => panic!("expected Rtsa"),
        }
    }

    #[test]
    fn apply_fixed_value_updates_numeric_only() {
        let mut obj = MdsObject::Numeric(Numeric::default());
        obj.apply_fixed_value(42);
        assert_eq!(obj, MdsObject::Numeric(Numeric { value: Some(42), ..Default::default() }));

        let mut pmstore = MdsObject::PmStore(PmStore::default());
        pmstore.apply_fixed_value(42);
        assert_eq!(pmstore, MdsObject::PmStore(PmStore::default()));
    }
}
