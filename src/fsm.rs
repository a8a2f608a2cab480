//! Per-connection state machine (§3 "FSM state", §4.5).

use crate::codec::ConfigResult;
use std::time::Duration;

/// Association timeout: how long `Associating` waits for an `AARE`. Not
/// named explicitly in the source material; chosen in line with the
/// configuring timeout below (see DESIGN.md).
pub const ASSOCIATION_TIMEOUT: Duration = Duration::from_secs(30);

/// §9 "Timer re-arming" / configuring.c `CONFIGURING_TO`: ten seconds to
/// receive the `MDC_NOTI_CONFIG` event report once `WaitingForConfig`.
pub const CONFIGURING_TIMEOUT: Duration = Duration::from_secs(10);

/// How long `Disassociating` waits for `RLRE` after sending `RLRQ`.
pub const DISASSOCIATING_TIMEOUT: Duration = Duration::from_secs(10);

/// Default per-operation timeout for Get/Set/Action/inter-service
/// requests issued while `Operating` (§4.5 "Operating").
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(3);

/// §3 "FSM state": `Disconnected, Unassociated, Associating,
/// WaitingForConfig, CheckingConfig, Operating, Disassociating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Disconnected,
    Unassociated,
    Associating,
    WaitingForConfig,
    CheckingConfig,
    Operating,
    Disassociating,
}

/// §3 "auxiliary role (Manager vs. Agent — this spec focuses on
/// Manager)". `Agent` exists only so the type is total; this crate
/// implements no Agent-role behaviour (§1 non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Manager,
    Agent,
}

/// Why a connection ended, delivered via `on_disassociated` (§6, §7
/// `Protocol`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisassociateReason {
    ReleasedByUs,
    ReleasedByPeer,
    Aborted,
    LinkDown,
    TimedOut,
}

/// §4.5 "Configuring", the three-way validity evaluation, as a pure
/// function so it can be unit-tested independent of the FSM's side
/// effects (sending the `RORS`, registering, installing into the
/// mirror).
///
/// 1. A known standard id always wins, even if the agent also sent a
///    non-empty override list (§8 boundary: "override IGNORED in favour
///    of builtin").
/// 2. An unknown id with an empty object list means the Agent assumed we
///    already know it and didn't — we don't, so it's unknown.
/// 3. An unknown id with a non-empty object list is the Agent handing us
///    a fresh description to adopt and cache.
pub fn evaluate_config(config_report_id: u16, object_count: usize) -> ConfigResult {
    if crate::standard_config::is_supported_standard(config_report_id) {
        ConfigResult::Accepted
    } else if object_count == 0 {
        ConfigResult::StandardConfigUnknown
    } else {
        ConfigResult::Accepted
    }
}
