//! The MDS mirror (§3 "MDS mirror", §4.3).

use crate::codec::nomenclature::attribute::*;
use crate::codec::{AttributeValueAssertion, ConfigObject};
use crate::dim::data_request::DataRequestCapability;
use crate::dim::object::MdsObject;

/// Handle reserved for the MDS object itself (§3 invariant).
pub const MDS_HANDLE: u16 = 0;

/// The MDS's own scalar attributes (§3 "MDS mirror"), updated in place by
/// `set_attribute`. All fields default empty/zero until an `AARE`/`Get`
/// response supplies them.
#[derive(Debug, Clone, Default)]
pub struct MdsAttributes {
    pub system_type: Option<u32>,
    pub system_model: Option<Vec<u8>>,
    pub system_id: Vec<u8>,
    pub dev_configuration_id: Option<u16>,
    pub attribute_value_map: Vec<u16>,
    pub production_specification: Option<Vec<u8>>,
    pub mds_time_info: Option<u32>,
    pub time_abs: Option<Vec<u8>>,
    pub time_rel: Option<u32>,
    pub time_rel_hi_res: Option<u32>,
    pub time_abs_adjust: Option<Vec<u8>>,
    pub power_status: Option<u16>,
    pub battery_charge_percent: Option<u8>,
    pub time_battery_remaining: Option<u32>,
    pub reg_cert_data_list: Option<Vec<u8>>,
    pub sys_type_spec_list: Option<Vec<u8>>,
    pub confirm_timeout: Option<u16>,
    /// Not part of the enumerated MDS attribute ids (§4.3) — the spec
    /// leaves the wire source of these flags unspecified, calling them
    /// part of the MDS's scalar attributes (§3). This manager exposes
    /// them as a directly-settable field so a host can seed them from
    /// whatever association-time signalling it has, defaulting to
    /// full support (see DESIGN.md).
    pub data_request_capability: DataRequestCapability,
}

/// The root record of an agent's object model (§3 "MDS mirror").
#[derive(Debug, Clone, Default)]
pub struct Mds {
    pub attrs: MdsAttributes,
    objects: Vec<MdsObject>,
}

impl Mds {
    /// §4.3 `mds_create`.
    pub fn create() -> Self {
        Mds::default()
    }

    /// §4.3 `mds_add_object`: appends to the dynamic sequence. Returns
    /// `false` (and does not insert) if `obj.handle()` collides with an
    /// existing handle or with the reserved MDS handle, preserving the
    /// §3 "every sub-object has a unique 16-bit handle" invariant.
    pub fn add_object(&mut self, obj: MdsObject) -> bool {
        if obj.handle() == MDS_HANDLE || self.get_by_handle(obj.handle()).is_some() {
            return false;
        }
        self.objects.push(obj);
        true
    }

    /// §4.3 `mds_get_by_handle`. A linear scan is acceptable per the spec
    /// (typical N < 32).
    pub fn get_by_handle(&self, handle: u16) -> Option<&MdsObject> {
        self.objects.iter().find(|o| o.handle() == handle)
    }

    pub fn get_by_handle_mut(&mut self, handle: u16) -> Option<&mut MdsObject> {
        self.objects.iter_mut().find(|o| o.handle() == handle)
    }

    pub fn objects(&self) -> &[MdsObject] {
        &self.objects
    }

    /// §4.3 `mds_set_attribute`: decodes one `AVA_Type`'s value for a
    /// recognised MDS attribute id; unknown ids are a silent no-op.
    pub fn set_attribute(&mut self, ava: &AttributeValueAssertion) {
        let v = &ava.value;
        match ava.attribute_id {
            MDC_ATTR_ID_HANDLE => {}
            MDC_ATTR_SYS_TYPE => self.attrs.system_type = read_u32(v),
            MDC_ATTR_ID_MODEL => self.attrs.system_model = Some(v.clone()),
            MDC_ATTR_SYS_ID => self.attrs.system_id = v.clone(),
            MDC_ATTR_DEV_CONFIG_ID => self.attrs.dev_configuration_id = read_u16(v),
            MDC_ATTR_ATTRIBUTE_VAL_MAP => self.attrs.attribute_value_map = read_u16_list(v),
            MDC_ATTR_ID_PROD_SPECN => self.attrs.production_specification = Some(v.clone()),
            MDC_ATTR_MDS_TIME_INFO => self.attrs.mds_time_info = read_u32(v),
            MDC_ATTR_TIME_ABS => self.attrs.time_abs = Some(v.clone()),
            MDC_ATTR_TIME_REL => self.attrs.time_rel = read_u32(v),
            MDC_ATTR_TIME_REL_HI_RES => self.attrs.time_rel_hi_res = read_u32(v),
            MDC_ATTR_TIME_ABS_ADJUST => self.attrs.time_abs_adjust = Some(v.clone()),
            MDC_ATTR_POWER_STAT => self.attrs.power_status = read_u16(v),
            MDC_ATTR_VAL_BATT_CHARGE => self.attrs.battery_charge_percent = v.first().copied(),
            MDC_ATTR_TIME_BATT_REMAIN => self.attrs.time_battery_remaining = read_u32(v),
            MDC_ATTR_REG_CERT_DATA_LIST => self.attrs.reg_cert_data_list = Some(v.clone()),
            MDC_ATTR_SYS_TYPE_SPEC_LIST => self.attrs.sys_type_spec_list = Some(v.clone()),
            MDC_ATTR_CONFIRM_TIMEOUT => self.attrs.confirm_timeout = read_u16(v),
            _ => {} // unknown attribute id: no-op, per §4.3
        }
    }

    /// §4.3 `mds_configure_operating`: instantiates each `ConfigObject`
    /// into the matching sub-object variant and appends it to the mirror.
    /// Returns the objects that were actually installed (an object whose
    /// class is unrecognised, or whose handle collides, is skipped and
    /// logged, not a hard error — the rest of the configuration still
    /// applies).
    pub fn configure_operating(&mut self, objects: &[ConfigObject]) -> Vec<u16> {
        let mut installed = Vec::with_capacity(objects.len());
        for cfg_obj in objects {
            match MdsObject::from_config(cfg_obj.obj_class, cfg_obj.obj_handle, cfg_obj.attributes.clone()) {
                Some(obj) => {
                    let handle = obj.handle();
                    if self.add_object(obj) {
                        installed.push(handle);
                    } else {
                        log::warn!(
                            "configure_operating: handle {} collided or is reserved, skipping",
                            handle
                        );
                    }
                }
                None => {
                    log::debug!(
                        "configure_operating: unrecognised object class {:#06x} at handle {}, skipping",
                        cfg_obj.obj_class,
                        cfg_obj.obj_handle
                    );
                }
            }
        }
        installed
    }

    /// §4.3 `mds_destroy`: drops every sub-object. Destruction of the
    /// whole connection context (and this mirror with it) happens when
    /// the owning `ManagerConnection` is dropped; this method exists for
    /// explicit re-configuration (association ending and resuming without
    /// tearing down the whole connection handle).
    pub fn destroy(&mut self) {
        self.objects.clear();
        self.attrs = MdsAttributes::default();
    }
}

fn read_u16(v: &[u8]) -> Option<u16> {
    if v.len() >= 2 {
        Some(u16::from_be_bytes([v[0], v[1]]))
    } else {
        None
    }
}

fn read_u32(v: &[u8]) -> Option<u32> {
    if v.len() >= 4 {
        Some(u32::from_be_bytes([v[0], v[1], v[2], v[3]]))
    } else {
        None
    }
}

fn read_u16_list(v: &[u8]) -> Vec<u16> {
    v.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect()
}
