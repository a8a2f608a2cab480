//! Closed catalogue of wire constants (ISO/IEEE 11073-20601 nomenclature).
//!
//! Values are verified against the teacher's `protocol.rs` (which already
//! hard-codes several of them for a real Accu-Chek session) and the
//! Antidote C reference implementation in `examples/original_source/`.

/// Outer APDU choice discriminators (§6).
pub mod apdu_choice {
    pub const AARQ: u16 = 0xE200;
    pub const AARE: u16 = 0xE300;
    pub const RLRQ: u16 = 0xE400;
    pub const RLRE: u16 = 0xE500;
    pub const ABRT: u16 = 0xE600;
    pub const PRST: u16 = 0xE700;
}

/// `DATA-apdu` inner choice discriminators.
pub mod data_apdu_choice {
    pub const ROIV_CMIP_EVENT_REPORT: u16 = 0x0100;
    pub const ROIV_CMIP_CONFIRMED_EVENT_REPORT: u16 = 0x0101;
    pub const ROIV_CMIP_GET: u16 = 0x0103;
    pub const ROIV_CMIP_SET: u16 = 0x0104;
    pub const ROIV_CMIP_CONFIRMED_SET: u16 = 0x0105;
    pub const ROIV_CMIP_ACTION: u16 = 0x0106;
    pub const ROIV_CMIP_CONFIRMED_ACTION: u16 = 0x0107;
    pub const RORS_CMIP_EVENT_REPORT: u16 = 0x0200;
    pub const RORS_CMIP_CONFIRMED_EVENT_REPORT: u16 = 0x0201;
    pub const RORS_CMIP_GET: u16 = 0x0203;
    pub const RORS_CMIP_SET: u16 = 0x0204;
    pub const RORS_CMIP_CONFIRMED_SET: u16 = 0x0205;
    pub const RORS_CMIP_ACTION: u16 = 0x0206;
    pub const RORS_CMIP_CONFIRMED_ACTION: u16 = 0x0207;
    pub const ROER: u16 = 0x0300;
    pub const RORJ: u16 = 0x0400;
}

/// Association result / config-report-result values.
pub mod result_value {
    pub const ACCEPTED: u16 = 0x0000;
    pub const REJECTED_PERMANENT: u16 = 0x0001;
    pub const ACCEPTED_UNKNOWN_CONFIG: u16 = 0x0002;
}

/// Event-report `event_type` values.
pub mod event_type {
    pub const MDC_NOTI_CONFIG: u16 = 0x0D1C;
    pub const MDC_NOTI_SEGMENT_DATA: u16 = 0x0D21;
    pub const MDC_NOTI_SCAN_REPORT_VAR: u16 = 0x0D24;
    pub const MDC_NOTI_SCAN_REPORT_FIXED: u16 = 0x0D25;
    /// Multi-person variants (§4.5 "Operating") — same per-observation
    /// encoding as their single-person counterparts, wrapped in a list of
    /// per-person observation groups.
    pub const MDC_NOTI_SCAN_REPORT_MP_FIXED: u16 = 0x0D26;
    pub const MDC_NOTI_SCAN_REPORT_MP_VAR: u16 = 0x0D27;
}

/// `ConfigResult` returned in a `ConfigReportRsp`.
pub mod config_result {
    pub const ACCEPTED_CONFIG: u16 = 0x0000;
    pub const STANDARD_CONFIG_UNKNOWN: u16 = 0x0001;
    pub const UNSUPPORTED_CONFIG: u16 = 0x0002;
}

/// Action-type values used against a PM-Store or the MDS itself.
pub mod action_type {
    pub const MDC_ACT_SEG_GET_INFO: u16 = 0x0C0D;
    pub const MDC_ACT_SEG_TRIG_XFER: u16 = 0x0C1C;
    pub const MDC_ACT_SEG_CLR: u16 = 0x0C1D;
    pub const MDC_ACT_SET_TIME: u16 = 0x0C16;
    /// Internal identifier for a `request_data_request` invocation; not a
    /// real IEEE 10101 nomenclature assignment (§1 non-goals), kept
    /// separate from `MDC_ACT_SET_TIME` and the segment actions above.
    pub const MDC_ACT_DATA_REQUEST: u16 = 0x0C21;
}

/// `ROER`/`RORJ` error / reject values (§7 `Service` kind).
pub mod error_value {
    pub const NO_SUCH_OBJECT_INSTANCE: u16 = 0x0001;
    pub const NO_SUCH_ACTION: u16 = 0x0006;
    pub const UNSPECIFIED: u16 = 0x0000;
}

pub mod reject_reason {
    pub const UNRECOGNIZED_OPERATION: u16 = 0x0001;
}

/// Object class ids (`MDC_MOC_*`), from `mds.c`'s `mds_configure_operating`
/// switch.
pub mod object_class {
    pub const MDC_MOC_VMS_MDS_SIMP: u16 = 0;
    pub const MDC_MOC_VMO_METRIC: u16 = 3;
    pub const MDC_MOC_VMO_METRIC_NU: u16 = 4;
    pub const MDC_MOC_VMO_METRIC_ENUM: u16 = 5;
    pub const MDC_MOC_VMO_METRIC_SA_RT: u16 = 6;
    pub const MDC_MOC_VMO_PMSTORE: u16 = 61;
    pub const MDC_MOC_SCAN: u16 = 16;
    pub const MDC_MOC_SCAN_CFG: u16 = 17;
    pub const MDC_MOC_SCAN_CFG_EPI: u16 = 18;
    pub const MDC_MOC_SCAN_CFG_PERI: u16 = 19;
}

/// MDS attribute ids recognised by `mds_set_attribute` (§4.3), in the same
/// order as `mds.c`'s dispatch `switch`. These are internal identifiers for
/// the closed set of attributes this manager understands; full IEEE
/// 11073-10101 nomenclature assignment is out of scope (§1 non-goals).
pub mod attribute {
    pub const MDC_ATTR_ID_HANDLE: u16 = 0x0001;
    pub const MDC_ATTR_SYS_TYPE: u16 = 0x0002;
    pub const MDC_ATTR_ID_MODEL: u16 = 0x0003;
    pub const MDC_ATTR_SYS_ID: u16 = 0x0004;
    pub const MDC_ATTR_DEV_CONFIG_ID: u16 = 0x0005;
    pub const MDC_ATTR_ATTRIBUTE_VAL_MAP: u16 = 0x0006;
    pub const MDC_ATTR_ID_PROD_SPECN: u16 = 0x0007;
    pub const MDC_ATTR_MDS_TIME_INFO: u16 = 0x0008;
    pub const MDC_ATTR_TIME_ABS: u16 = 0x0009;
    pub const MDC_ATTR_TIME_REL: u16 = 0x000A;
    pub const MDC_ATTR_TIME_REL_HI_RES: u16 = 0x000B;
    pub const MDC_ATTR_TIME_ABS_ADJUST: u16 = 0x000C;
    pub const MDC_ATTR_POWER_STAT: u16 = 0x000D;
    pub const MDC_ATTR_VAL_BATT_CHARGE: u16 = 0x000E;
    pub const MDC_ATTR_TIME_BATT_REMAIN: u16 = 0x000F;
    pub const MDC_ATTR_REG_CERT_DATA_LIST: u16 = 0x0010;
    pub const MDC_ATTR_SYS_TYPE_SPEC_LIST: u16 = 0x0011;
    pub const MDC_ATTR_CONFIRM_TIMEOUT: u16 = 0x0012;
}

/// Data-request capability bitmasks (§4.3 "Data-request capability check").
pub mod data_req_mode {
    pub const SINGLE_RESPONSE: u32 = 1 << 0;
    pub const TIME_PERIOD: u32 = 1 << 1;
    pub const NO_LIMIT: u32 = 1 << 2;
    pub const MODE_MASK: u32 = SINGLE_RESPONSE | TIME_PERIOD | NO_LIMIT;

    pub const SCOPE_ALL: u32 = 1 << 8;
    pub const SCOPE_CLASS: u32 = 1 << 9;
    pub const SCOPE_HANDLE: u32 = 1 << 10;
    pub const SCOPE_MASK: u32 = SCOPE_ALL | SCOPE_CLASS | SCOPE_HANDLE;

    pub const TYPE_MASK: u32 = 0x00FF_F000;
    pub const PERSON_ID: u32 = 1 << 24;
}

/// Configuration ids recognised by the builtin standard-configuration
/// catalogue (§9 "Global catalogues"). `0x4007` and `0x4001` are the ids
/// exercised by the end-to-end scenarios in §8.
pub mod config_id {
    pub const STANDARD_WEIGHING_SCALE: u16 = 0x4007;
    pub const STANDARD_GLUCOMETER: u16 = 0x4001;
}
