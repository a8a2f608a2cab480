//! Data-request capability check (§4.3 "Data-request capability check").

use crate::codec::nomenclature::data_req_mode::*;
use crate::error::ResourceError;

/// The agent's advertised data-request capability. Defaults to "supports
/// everything", which is the only sane default in the absence of a wire
/// source for these bits (see DESIGN.md for the open-question resolution);
/// a host that learns narrower capability from the agent should set this
/// directly before issuing `request_data_request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRequestCapability {
    pub type_mask: u32,
    pub mode_mask: u32,
    pub scope_mask: u32,
    pub person_id_supported: bool,
}

impl Default for DataRequestCapability {
    fn default() -> Self {
        DataRequestCapability {
            type_mask: TYPE_MASK,
            mode_mask: MODE_MASK,
            scope_mask: SCOPE_MASK,
            person_id_supported: true,
        }
    }
}

/// Checks a requested `data_req_mode` bitmask against capability (§4.3).
/// On any violation, returns a structured [`ResourceError::Unsupported`]
/// without emitting any APDU, as the spec requires.
pub fn check_data_request(cap: &DataRequestCapability, requested: u32) -> Result<(), ResourceError> {
    let type_bits = requested & TYPE_MASK;
    if type_bits & !cap.type_mask != 0 {
        return Err(ResourceError::Unsupported("requested type bits exceed agent capability"));
    }

    let mode_bits = requested & MODE_MASK;
    if mode_bits.count_ones() != 1 || mode_bits & cap.mode_mask != mode_bits {
        return Err(ResourceError::Unsupported(
            "exactly one supported mode bit (single-response/time-period/no-limit) is required",
        ));
    }

    let scope_bits = requested & SCOPE_MASK;
    if scope_bits.count_ones() != 1 || scope_bits & cap.scope_mask != scope_bits {
        return Err(ResourceError::Unsupported(
            "exactly one supported scope bit (all/class/handle) is required",
        ));
    }

    if requested & PERSON_ID != 0 && !cap.person_id_supported {
        return Err(ResourceError::Unsupported("agent does not support person-id"));
    }

    Ok(())
}
