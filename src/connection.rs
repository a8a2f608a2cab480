//! The application surface (§2 "A small application surface", §6): the
//! per-connection context that owns the FSM state, the MDS mirror, the
//! service layer, the timer, and a transport, and wires them together per
//! §4.5's dispatch table.

use crate::bytelib::{Reader, Writer};
use crate::codec::nomenclature::{action_type, error_value, event_type, result_value};
use crate::codec::{
    ActionArgs, Aare, Aarq, Abrt, Apdu, AttributeValueAssertion, ConfigObject, ConfigReport, ConfigReportRsp,
    ConfigResult, DataApdu, DataApduMessage, EventReport, GetArgs, ObservationFixed, ObservationVar, Rlre, Rlrq,
    ScanReportInfoFixed, ScanReportInfoMPFixed, ScanReportInfoMPVar, ScanReportInfoVar, SetArgs,
};
use crate::dim::object::ATTR_SCANNER_OP_STATE;
use crate::dim::{check_data_request, Mds, MdsObject, MDS_HANDLE};
use crate::error::{Error, ProtocolError, Result, StateError};
use crate::fsm::{evaluate_config, DisassociateReason, Role, State, ASSOCIATION_TIMEOUT, CONFIGURING_TIMEOUT, DISASSOCIATING_TIMEOUT, OPERATION_TIMEOUT};
use crate::registry::ExtendedConfigRegistry;
use crate::service::{ResponseKind, Service, ServiceResult};
use crate::standard_config;
use crate::timer::Timer;
use crate::transport::Transport;
use std::time::Instant;

/// A lightweight snapshot of the mirror's current readable values,
/// delivered to `on_device_available`/`on_measurement_data_updated` in
/// place of handing out a live `&Mds` (§6 `DataList`). Serializable so a
/// host application can hand it straight to its own logging/IPC layer
/// without writing its own mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct DataList {
    pub entries: Vec<DataEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DataEntry {
    pub handle: u16,
    pub numeric: Option<i32>,
    pub enumeration: Option<u16>,
}

impl DataList {
    fn from_mds(mds: &Mds) -> Self {
        let entries = mds
            .objects()
            .iter()
            .map(|obj| match obj {
                MdsObject::Numeric(n) => DataEntry {
                    handle: n.common.handle,
                    numeric: n.value,
                    enumeration: None,
                },
                MdsObject::Enumeration(e) => DataEntry {
                    handle: e.common.handle,
                    numeric: None,
                    enumeration: e.value,
                },
                other => DataEntry {
                    handle: other.handle(),
                    numeric: None,
                    enumeration: None,
                },
            })
            .collect();
        DataList { entries }
    }
}

type DeviceAvailableCallback = Box<dyn FnMut(DataList)>;
type MeasurementCallback = Box<dyn FnMut(DataList)>;
type DisassociatedCallback = Box<dyn FnMut(DisassociateReason)>;

/// Owns everything scoped to one association attempt (§3 "Connection
/// context"): exactly one MDS mirror, one FSM state, one pending-request
/// table, one timer slot, and a reference to a transport.
pub struct ManagerConnection<T: Transport, R: ExtendedConfigRegistry> {
    transport: T,
    registry: R,
    state: State,
    role: Role,
    timer: Timer,
    service: Service,
    mds: Mds,
    on_device_available: Option<DeviceAvailableCallback>,
    on_measurement_data_updated: Option<MeasurementCallback>,
    on_disassociated: Option<DisassociatedCallback>,
}

impl<T: Transport, R: ExtendedConfigRegistry> ManagerConnection<T, R> {
    pub fn new(transport: T, registry: R) -> Self {
        ManagerConnection {
            transport,
            registry,
            state: State::Disconnected,
            role: Role::Manager,
            timer: Timer::new(),
            service: Service::new(),
            mds: Mds::create(),
            on_device_available: None,
            on_measurement_data_updated: None,
            on_disassociated: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn mds(&self) -> &Mds {
        &self.mds
    }

    pub fn on_device_available(&mut self, cb: impl FnMut(DataList) + 'static) {
        self.on_device_available = Some(Box::new(cb));
    }

    pub fn on_measurement_data_updated(&mut self, cb: impl FnMut(DataList) + 'static) {
        self.on_measurement_data_updated = Some(Box::new(cb));
    }

    pub fn on_disassociated(&mut self, cb: impl FnMut(DisassociateReason) + 'static) {
        self.on_disassociated = Some(Box::new(cb));
    }

    /// §6 `open(transport)`: brings the link up and immediately requests
    /// association.
    pub fn open(&mut self, now: Instant) -> Result<()> {
        self.state = State::Unassociated;
        self.request_associate(now)
    }

    /// `req_assoc` (§4.5 "Association").
    pub fn request_associate(&mut self, now: Instant) -> Result<()> {
        if self.state != State::Unassociated {
            return Err(Error::State(StateError::InvalidForState));
        }
        self.send_apdu(&Apdu::Aarq(Aarq { protocol_version: 0x8000_0001 }))?;
        log::debug!("fsm: Unassociated -> Associating");
        self.state = State::Associating;
        self.timer.count_timeout(now, ASSOCIATION_TIMEOUT);
        Ok(())
    }

    /// `req_release` (§4.5 "Release").
    pub fn release(&mut self, now: Instant) -> Result<()> {
        self.send_apdu(&Apdu::Rlrq(Rlrq { reason: 0 }))?;
        log::debug!("fsm: {:?} -> Disassociating", self.state);
        self.state = State::Disassociating;
        self.timer.count_timeout(now, DISASSOCIATING_TIMEOUT);
        Ok(())
    }

    /// `req_abort`: cancels the timer, sends `ABRT`, fails every pending
    /// request with `Aborted`, and returns to `Unassociated` (§5
    /// "Cancellation").
    pub fn abort(&mut self) -> Result<()> {
        log::warn!("fsm: aborting from {:?}", self.state);
        let _ = self.send_apdu(&Apdu::Abrt(Abrt { reason: 0 }));
        self.teardown(DisassociateReason::Aborted);
        Ok(())
    }

    /// A link-down event: identical to `abort` but sends nothing (§5).
    pub fn link_down(&mut self) {
        self.teardown(DisassociateReason::LinkDown);
    }

    /// Feeds one whole decoded-or-decodable APDU frame into the FSM (§6
    /// "receive(bytes) delivered as whole APDUs").
    pub fn on_bytes_received(&mut self, bytes: &[u8], now: Instant) -> Result<()> {
        let apdu = Apdu::decode(bytes)?;
        self.dispatch(apdu, now)
    }

    /// Drives the single per-context timer and the service layer's
    /// per-invocation deadlines (§3 "Timer", §4.4 `on_timer_tick`).
    pub fn on_timer_tick(&mut self, now: Instant) {
        self.service.on_timer_tick(now);
        if self.timer.is_expired(now) {
            self.timer.reset_timeout();
            match self.state {
                State::Associating => self.teardown(DisassociateReason::TimedOut),
                State::WaitingForConfig | State::Disassociating => self.teardown(DisassociateReason::TimedOut),
                _ => {}
            }
        }
    }

    // -- application requests (§2 "application surface") --------------

    pub fn request_get_mds(&mut self, now: Instant, callback: impl FnOnce(ServiceResult) + 'static) -> Result<u16> {
        self.send_request(
            DataApduMessage::RoivGet(GetArgs {
                obj_handle: MDS_HANDLE,
                attribute_ids: vec![],
            }),
            ResponseKind::Get,
            Some(OPERATION_TIMEOUT),
            now,
            "get_mds",
            callback,
        )
    }

    pub fn request_segment_info(
        &mut self,
        pm_store_handle: u16,
        now: Instant,
        callback: impl FnOnce(ServiceResult) + 'static,
    ) -> Result<u16> {
        self.send_request(
            DataApduMessage::RoivConfirmedAction(ActionArgs {
                obj_handle: pm_store_handle,
                action_type: action_type::MDC_ACT_SEG_GET_INFO,
                info: vec![],
            }),
            ResponseKind::Action,
            Some(OPERATION_TIMEOUT),
            now,
            "segment_info",
            callback,
        )
    }

    pub fn request_segment_data(
        &mut self,
        pm_store_handle: u16,
        segment_id: u16,
        now: Instant,
        callback: impl FnOnce(ServiceResult) + 'static,
    ) -> Result<u16> {
        self.send_request(
            DataApduMessage::RoivConfirmedAction(ActionArgs {
                obj_handle: pm_store_handle,
                action_type: action_type::MDC_ACT_SEG_TRIG_XFER,
                info: segment_id.to_be_bytes().to_vec(),
            }),
            ResponseKind::Action,
            Some(OPERATION_TIMEOUT),
            now,
            "segment_data",
            callback,
        )
    }

    pub fn request_clear_segments(
        &mut self,
        pm_store_handle: u16,
        now: Instant,
        callback: impl FnOnce(ServiceResult) + 'static,
    ) -> Result<u16> {
        self.send_request(
            DataApduMessage::RoivConfirmedAction(ActionArgs {
                obj_handle: pm_store_handle,
                action_type: action_type::MDC_ACT_SEG_CLR,
                info: vec![],
            }),
            ResponseKind::Action,
            Some(OPERATION_TIMEOUT),
            now,
            "clear_segments",
            callback,
        )
    }

    /// `req_data_request` (§4.3 "Data-request capability check"). Fails
    /// fast with `ResourceError` and emits no APDU if the bitmask isn't
    /// supported.
    pub fn request_data_request(
        &mut self,
        mode_bitmask: u32,
        now: Instant,
        callback: impl FnOnce(ServiceResult) + 'static,
    ) -> Result<u16> {
        check_data_request(&self.mds.attrs.data_request_capability, mode_bitmask).map_err(|e| {
            log::warn!("data request {:#010x} rejected locally: {:?}", mode_bitmask, e);
            Error::Resource(e)
        })?;
        self.send_request(
            DataApduMessage::RoivConfirmedAction(ActionArgs {
                obj_handle: MDS_HANDLE,
                action_type: action_type::MDC_ACT_DATA_REQUEST,
                info: mode_bitmask.to_be_bytes().to_vec(),
            }),
            ResponseKind::Action,
            Some(OPERATION_TIMEOUT),
            now,
            "data_request",
            callback,
        )
    }

    pub fn request_set_time(
        &mut self,
        time_abs: Vec<u8>,
        now: Instant,
        callback: impl FnOnce(ServiceResult) + 'static,
    ) -> Result<u16> {
        self.send_request(
            DataApduMessage::RoivConfirmedAction(ActionArgs {
                obj_handle: MDS_HANDLE,
                action_type: action_type::MDC_ACT_SET_TIME,
                info: time_abs,
            }),
            ResponseKind::Action,
            Some(OPERATION_TIMEOUT),
            now,
            "set_time",
            callback,
        )
    }

    pub fn set_scanner_operational_state(
        &mut self,
        scanner_handle: u16,
        enabled: bool,
        now: Instant,
        callback: impl FnOnce(ServiceResult) + 'static,
    ) -> Result<u16> {
        self.send_request(
            DataApduMessage::RoivConfirmedSet(SetArgs {
                obj_handle: scanner_handle,
                attributes: vec![AttributeValueAssertion {
                    attribute_id: ATTR_SCANNER_OP_STATE,
                    value: vec![enabled as u8],
                }],
            }),
            ResponseKind::Set,
            Some(OPERATION_TIMEOUT),
            now,
            "set_scanner_operational_state",
            callback,
        )
    }

    // -- internals ------------------------------------------------------

    fn send_apdu(&mut self, apdu: &Apdu) -> Result<()> {
        let bytes = apdu.encode(512)?;
        self.transport.send(&bytes).map_err(Error::Link)
    }

    fn send_request(
        &mut self,
        message: DataApduMessage,
        expected: ResponseKind,
        timeout: Option<std::time::Duration>,
        now: Instant,
        label: &'static str,
        callback: impl FnOnce(ServiceResult) + 'static,
    ) -> Result<u16> {
        if self.state != State::Operating {
            return Err(Error::State(StateError::InvalidForState));
        }
        let invoke_id = self.service.send_remote_operation(expected, timeout, now, label, Box::new(callback));
        let apdu = Apdu::Prst(DataApdu { invoke_id, message });
        if let Err(e) = self.send_apdu(&apdu) {
            self.service.cancel(invoke_id, crate::error::ServiceError::Aborted);
            return Err(e);
        }
        Ok(invoke_id)
    }

    fn teardown(&mut self, reason: DisassociateReason) {
        self.timer.reset_timeout();
        self.service.drain_all(|| crate::error::ServiceError::Aborted);
        self.mds.destroy();
        self.state = State::Unassociated;
        if let Some(cb) = self.on_disassociated.as_mut() {
            cb(reason);
        }
    }

    fn fire_device_available(&mut self) {
        let data = DataList::from_mds(&self.mds);
        if let Some(cb) = self.on_device_available.as_mut() {
            cb(data);
        }
    }

    fn fire_measurement_updated(&mut self) {
        let data = DataList::from_mds(&self.mds);
        if let Some(cb) = self.on_measurement_data_updated.as_mut() {
            cb(data);
        }
    }

    fn apdu_kind(apdu: &Apdu) -> &'static str {
        match apdu {
            Apdu::Aarq(_) => "AARQ",
            Apdu::Aare(_) => "AARE",
            Apdu::Rlrq(_) => "RLRQ",
            Apdu::Rlre(_) => "RLRE",
            Apdu::Abrt(_) => "ABRT",
            Apdu::Prst(_) => "PRST",
        }
    }

    fn dispatch(&mut self, apdu: Apdu, now: Instant) -> Result<()> {
        // §4.5 "rx_rlrq from any state sends RLRE ... and returns to
        // Unassociated" and "rx_abrt ... drops directly to Unassociated" —
        // both apply regardless of the current state.
        match &apdu {
            Apdu::Rlrq(_) => {
                log::debug!("dispatch: RLRQ from {:?}, releasing", self.state);
                let _ = self.send_apdu(&Apdu::Rlre(Rlre { reason: 0 }));
                self.teardown(DisassociateReason::ReleasedByPeer);
                return Ok(());
            }
            Apdu::Abrt(_) => {
                log::warn!("dispatch: peer ABRT while in {:?}", self.state);
                self.teardown(DisassociateReason::Aborted);
                return Ok(());
            }
            _ => {}
        }

        log::trace!("dispatch: {} apdu while in {:?}", Self::apdu_kind(&apdu), self.state);
        match (self.state, apdu) {
            (State::Associating, Apdu::Aare(aare)) => self.handle_aare(aare, now),
            (State::Disassociating, Apdu::Rlre(_)) => {
                self.timer.reset_timeout();
                self.state = State::Unassociated;
                self.mds.destroy();
                if let Some(cb) = self.on_disassociated.as_mut() {
                    cb(DisassociateReason::ReleasedByUs);
                }
                Ok(())
            }
            (State::WaitingForConfig, Apdu::Prst(data_apdu)) => self.handle_waiting_for_config(data_apdu, now),
            (State::Operating, Apdu::Prst(data_apdu)) => self.handle_operating(data_apdu, now),
            // (a) legal wire syntax, invalid for this state: ignored silently.
            _ => Ok(()),
        }
    }

    fn handle_aare(&mut self, aare: Aare, now: Instant) -> Result<()> {
        if aare.result != result_value::ACCEPTED {
            log::warn!("association rejected by peer, result {:#06x}", aare.result);
            self.teardown(DisassociateReason::Aborted);
            return Err(Error::Protocol(ProtocolError::AssociationRejected(aare.result)));
        }

        self.mds = Mds::create();
        self.mds.attrs.system_id = aare.system_id.clone();

        if let Some(objects) = standard_config::lookup(aare.config_report_id) {
            log::debug!("fsm: config {:#06x} is a builtin standard config", aare.config_report_id);
            self.install_config(aare.config_report_id, objects, now, false);
        } else if let Some(objects) = self.registry.lookup(&aare.system_id, aare.config_report_id) {
            log::debug!("fsm: config {:#06x} found in the extended registry", aare.config_report_id);
            self.install_config(aare.config_report_id, objects, now, false);
        } else {
            log::debug!(
                "fsm: Associating -> WaitingForConfig (config {:#06x} unknown)",
                aare.config_report_id
            );
            self.state = State::WaitingForConfig;
            self.timer.count_timeout(now, CONFIGURING_TIMEOUT);
        }
        Ok(())
    }

    fn install_config(&mut self, config_report_id: u16, objects: Vec<ConfigObject>, now: Instant, register: bool) {
        if register {
            self.registry.register(&self.mds.attrs.system_id, config_report_id, objects.clone());
        }
        self.mds.attrs.dev_configuration_id = Some(config_report_id);
        self.mds.configure_operating(&objects);
        self.service.init();
        self.timer.reset_timeout();
        log::debug!("fsm: -> Operating ({} object(s), config {:#06x})", objects.len(), config_report_id);
        self.state = State::Operating;
        let _ = now;
        self.fire_device_available();
    }

    fn handle_waiting_for_config(&mut self, data_apdu: DataApdu, now: Instant) -> Result<()> {
        match data_apdu.message {
            DataApduMessage::RoivConfirmedEventReport(ref ev) if ev.event_type == event_type::MDC_NOTI_CONFIG => {
                self.handle_config_report(data_apdu.invoke_id, ev, now)
            }
            DataApduMessage::RoivConfirmedEventReport(_)
            | DataApduMessage::RoivGet(_)
            | DataApduMessage::RoivConfirmedSet(_) => {
                self.reject(data_apdu.invoke_id, error_value::NO_SUCH_OBJECT_INSTANCE)
            }
            DataApduMessage::RoivConfirmedAction(_) => self.reject(data_apdu.invoke_id, error_value::NO_SUCH_ACTION),
            _ => Ok(()),
        }
    }

    fn handle_config_report(&mut self, invoke_id: u16, ev: &EventReport, now: Instant) -> Result<()> {
        self.timer.reset_timeout();
        self.state = State::CheckingConfig;

        let mut r = Reader::new(&ev.info);
        let report = ConfigReport::decode(&mut r)?;
        let verdict = evaluate_config(report.config_report_id, report.objects.len());

        match verdict {
            ConfigResult::Accepted => {
                let objects = if standard_config::is_supported_standard(report.config_report_id) {
                    standard_config::lookup(report.config_report_id).expect("just checked supported")
                } else {
                    report.objects.clone()
                };
                let register = !standard_config::is_supported_standard(report.config_report_id);
                self.reply_config(invoke_id, report.config_report_id, ConfigResult::Accepted)?;
                self.install_config(report.config_report_id, objects, now, register);
            }
            other => {
                log::warn!("config report {:#06x} not accepted: {:?}", report.config_report_id, other);
                self.reply_config(invoke_id, report.config_report_id, other)?;
                self.state = State::WaitingForConfig;
                self.timer.count_timeout(now, CONFIGURING_TIMEOUT);
            }
        }
        Ok(())
    }

    fn reply_config(&mut self, invoke_id: u16, config_report_id: u16, result: ConfigResult) -> Result<()> {
        let rsp = ConfigReportRsp { config_report_id, result };
        let mut w = Writer::with_capacity(16);
        rsp.encode(&mut w);
        let apdu = Apdu::Prst(DataApdu {
            invoke_id,
            message: DataApduMessage::RorsConfirmedEventReport(EventReport {
                obj_handle: MDS_HANDLE,
                event_time: 0,
                event_type: event_type::MDC_NOTI_CONFIG,
                info: w.buffer(),
            }),
        });
        self.send_apdu(&apdu)
    }

    fn reject(&mut self, invoke_id: u16, error_code: u16) -> Result<()> {
        log::warn!("rejecting invoke_id {} with error {:#06x}", invoke_id, error_code);
        let apdu = Apdu::Prst(DataApdu {
            invoke_id,
            message: DataApduMessage::Roer {
                error_value: error_code,
                parameter: vec![],
            },
        });
        self.send_apdu(&apdu)
    }

    fn handle_operating(&mut self, data_apdu: DataApdu, _now: Instant) -> Result<()> {
        match data_apdu.message {
            DataApduMessage::RoivConfirmedEventReport(ref ev) => self.handle_measurement_event(data_apdu.invoke_id, ev),
            DataApduMessage::RorsConfirmedSet(ref args) => {
                self.apply_set_echo(args);
                if self.service.check_known_invoke_id(&data_apdu) {
                    self.service.request_retired(data_apdu);
                }
                Ok(())
            }
            DataApduMessage::RorsGet(_)
            | DataApduMessage::RorsConfirmedAction(_)
            | DataApduMessage::RorsConfirmedEventReport(_)
            | DataApduMessage::Roer { .. }
            | DataApduMessage::Rorj(_) => {
                if self.service.check_known_invoke_id(&data_apdu) {
                    self.service.request_retired(data_apdu);
                }
                Ok(())
            }
            DataApduMessage::RoivGet(_) | DataApduMessage::RoivConfirmedSet(_) => {
                self.reject(data_apdu.invoke_id, error_value::NO_SUCH_OBJECT_INSTANCE)
            }
            DataApduMessage::RoivConfirmedAction(_) => self.reject(data_apdu.invoke_id, error_value::NO_SUCH_ACTION),
        }
    }

    fn handle_measurement_event(&mut self, invoke_id: u16, ev: &EventReport) -> Result<()> {
        let mut r = Reader::new(&ev.info);
        match ev.event_type {
            event_type::MDC_NOTI_SCAN_REPORT_FIXED => {
                if let Ok(report) = ScanReportInfoFixed::decode(&mut r) {
                    self.apply_fixed_report(&report);
                    self.ack_event_report(invoke_id)?;
                    self.fire_measurement_updated();
                }
            }
            event_type::MDC_NOTI_SCAN_REPORT_VAR => {
                if let Ok(report) = ScanReportInfoVar::decode(&mut r) {
                    self.apply_var_report(&report);
                    self.ack_event_report(invoke_id)?;
                    self.fire_measurement_updated();
                }
            }
            event_type::MDC_NOTI_SCAN_REPORT_MP_FIXED => {
                if let Ok(report) = ScanReportInfoMPFixed::decode(&mut r) {
                    for person in &report.persons {
                        for ObservationFixed { obj_handle, value } in &person.observations {
                            if let Some(obj) = self.mds.get_by_handle_mut(*obj_handle) {
                                obj.apply_fixed_value(*value);
                            }
                        }
                    }
                    self.ack_event_report(invoke_id)?;
                    self.fire_measurement_updated();
                }
            }
            event_type::MDC_NOTI_SCAN_REPORT_MP_VAR => {
                if let Ok(report) = ScanReportInfoMPVar::decode(&mut r) {
                    for person in &report.persons {
                        for ObservationVar { obj_handle, value } in &person.observations {
                            if let Some(obj) = self.mds.get_by_handle_mut(*obj_handle) {
                                obj.apply_var_value(value);
                            }
                        }
                    }
                    self.ack_event_report(invoke_id)?;
                    self.fire_measurement_updated();
                }
            }
            event_type::MDC_NOTI_SEGMENT_DATA => {
                self.ack_event_report(invoke_id)?;
                self.fire_measurement_updated();
            }
            _ => self.reject(invoke_id, error_value::NO_SUCH_OBJECT_INSTANCE)?,
        }
        Ok(())
    }

    fn apply_fixed_report(&mut self, report: &ScanReportInfoFixed) {
        for ObservationFixed { obj_handle, value } in &report.observations {
            if let Some(obj) = self.mds.get_by_handle_mut(*obj_handle) {
                obj.apply_fixed_value(*value);
            }
        }
    }

    fn apply_var_report(&mut self, report: &ScanReportInfoVar) {
        for ObservationVar { obj_handle, value } in &report.observations {
            if let Some(obj) = self.mds.get_by_handle_mut(*obj_handle) {
                obj.apply_var_value(value);
            }
        }
    }

    /// Mirrors an echoed `ConfirmedSet` result back onto the DIM object it
    /// targeted, so e.g. `set_scanner_operational_state`'s effect is visible
    /// locally as soon as the Agent confirms it rather than only reaching
    /// the caller's callback.
    fn apply_set_echo(&mut self, args: &SetArgs) {
        if let Some(obj) = self.mds.get_by_handle_mut(args.obj_handle) {
            for AttributeValueAssertion { attribute_id, value } in &args.attributes {
                obj.apply_attribute(*attribute_id, value);
            }
        }
    }

    fn ack_event_report(&mut self, invoke_id: u16) -> Result<()> {
        let apdu = Apdu::Prst(DataApdu {
            invoke_id,
            message: DataApduMessage::RorsConfirmedEventReport(EventReport {
                obj_handle: MDS_HANDLE,
                event_time: 0,
                event_type: event_type::MDC_NOTI_SEGMENT_DATA,
                info: vec![],
            }),
        });
        self.send_apdu(&apdu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::nomenclature::config_id;
    use crate::codec::nomenclature::object_class::MDC_MOC_VMO_METRIC_NU;
    use crate::registry::InMemoryRegistry;
    use crate::transport::MockTransport;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn harness() -> ManagerConnection<MockTransport, InMemoryRegistry> {
        ManagerConnection::new(MockTransport::new(), InMemoryRegistry::new())
    }

    fn config_report_bytes(config_report_id: u16, objects: Vec<ConfigObject>) -> Vec<u8> {
        let mut w = Writer::with_capacity(512);
        ConfigReport { config_report_id, objects }.encode(&mut w);
        w.buffer()
    }

    fn deliver_config_report(conn: &mut ManagerConnection<MockTransport, InMemoryRegistry>, invoke_id: u16, config_report_id: u16, objects: Vec<ConfigObject>, now: Instant) {
        let apdu = Apdu::Prst(DataApdu {
            invoke_id,
            message: DataApduMessage::RoivConfirmedEventReport(EventReport {
                obj_handle: MDS_HANDLE,
                event_time: 0,
                event_type: event_type::MDC_NOTI_CONFIG,
                info: config_report_bytes(config_report_id, objects),
            }),
        });
        conn.on_bytes_received(&apdu.encode(1024).unwrap(), now).unwrap();
    }

    fn deliver_aare(conn: &mut ManagerConnection<MockTransport, InMemoryRegistry>, config_report_id: u16, now: Instant) {
        let apdu = Apdu::Aare(Aare {
            result: result_value::ACCEPTED,
            config_report_id,
            system_id: vec![0xAA, 0xBB, 0xCC, 0xDD],
        });
        conn.on_bytes_received(&apdu.encode(256).unwrap(), now).unwrap();
    }

    #[test]
    fn scenario_standard_config_association() {
        let mut conn = harness();
        let now = Instant::now();
        let fired = Rc::new(RefCell::new(false));
        let f = fired.clone();
        conn.on_device_available(move |_| *f.borrow_mut() = true);

        conn.open(now).unwrap();
        assert_eq!(conn.state(), State::Associating);
        deliver_aare(&mut conn, config_id::STANDARD_WEIGHING_SCALE, now);

        assert_eq!(conn.state(), State::Operating);
        assert!(*fired.borrow());
        assert_eq!(conn.mds().objects().len(), 1);
        // Only the AARQ went out — no config-report reply for a standard id.
        assert_eq!(conn.transport.sent.len(), 1);
    }

    #[test]
    fn scenario_extended_config_fresh() {
        let mut conn = harness();
        let now = Instant::now();
        conn.open(now).unwrap();
        deliver_aare(&mut conn, 0x4001, now);
        assert_eq!(conn.state(), State::WaitingForConfig);

        let objects = vec![ConfigObject {
            obj_class: MDC_MOC_VMO_METRIC_NU,
            obj_handle: 1,
            attributes: vec![],
        }];
        deliver_config_report(&mut conn, 5, 0x4001, objects, now);

        assert_eq!(conn.state(), State::Operating);
        assert_eq!(conn.mds().objects().len(), 1);
        assert!(conn
            .registry
            .lookup(&[0xAA, 0xBB, 0xCC, 0xDD], 0x4001)
            .is_some());
    }

    #[test]
    fn scenario_extended_config_cached() {
        let mut conn = harness();
        let now = Instant::now();
        conn.registry.register(
            &[0xAA, 0xBB, 0xCC, 0xDD],
            0x4001,
            vec![ConfigObject {
                obj_class: MDC_MOC_VMO_METRIC_NU,
                obj_handle: 1,
                attributes: vec![],
            }],
        );
        conn.open(now).unwrap();
        deliver_aare(&mut conn, 0x4001, now);

        // Skips WaitingForConfig entirely.
        assert_eq!(conn.state(), State::Operating);
        assert_eq!(conn.mds().objects().len(), 1);
    }

    #[test]
    fn scenario_unknown_standard_id_empty_list() {
        let mut conn = harness();
        let now = Instant::now();
        conn.open(now).unwrap();
        deliver_aare(&mut conn, 0xBEEF, now);
        assert_eq!(conn.state(), State::WaitingForConfig);

        deliver_config_report(&mut conn, 6, 0xBEEF, vec![], now);
        assert_eq!(conn.state(), State::WaitingForConfig);
        assert!(conn.mds().objects().is_empty());
    }

    #[test]
    fn scenario_get_timeout() {
        let mut conn = harness();
        let now = Instant::now();
        conn.open(now).unwrap();
        deliver_aare(&mut conn, config_id::STANDARD_WEIGHING_SCALE, now);
        assert_eq!(conn.state(), State::Operating);

        let outcome = Rc::new(RefCell::new(None));
        let o = outcome.clone();
        conn.request_get_mds(now, move |r| *o.borrow_mut() = Some(r)).unwrap();
        assert_eq!(conn.service.pending_count(), 1);

        conn.on_timer_tick(now + OPERATION_TIMEOUT + std::time::Duration::from_millis(1));
        assert_eq!(conn.service.pending_count(), 0);
        assert!(matches!(
            outcome.borrow().as_ref(),
            Some(Err(crate::error::ServiceError::Timeout))
        ));
        assert_eq!(conn.state(), State::Operating);
    }

    #[test]
    fn scenario_peer_abort() {
        let mut conn = harness();
        let now = Instant::now();
        conn.open(now).unwrap();
        deliver_aare(&mut conn, config_id::STANDARD_WEIGHING_SCALE, now);

        let outcome = Rc::new(RefCell::new(None));
        let o = outcome.clone();
        conn.request_get_mds(now, move |r| *o.borrow_mut() = Some(r)).unwrap();

        let disassociated = Rc::new(RefCell::new(None));
        let d = disassociated.clone();
        conn.on_disassociated(move |r| *d.borrow_mut() = Some(r));

        let abrt = Apdu::Abrt(Abrt { reason: 0 });
        conn.on_bytes_received(&abrt.encode(64).unwrap(), now).unwrap();

        assert!(matches!(
            outcome.borrow().as_ref(),
            Some(Err(crate::error::ServiceError::Aborted))
        ));
        assert_eq!(*disassociated.borrow(), Some(DisassociateReason::Aborted));
        assert_eq!(conn.state(), State::Unassociated);
    }

    #[test]
    fn scanner_set_echo_updates_the_mirror() {
        use crate::codec::nomenclature::object_class::MDC_MOC_SCAN_CFG_EPI;

        let mut conn = harness();
        let now = Instant::now();
        conn.open(now).unwrap();
        deliver_aare(&mut conn, 0x4001, now);
        deliver_config_report(
            &mut conn,
            5,
            0x4001,
            vec![ConfigObject {
                obj_class: MDC_MOC_SCAN_CFG_EPI,
                obj_handle: 2,
                attributes: vec![],
            }],
            now,
        );
        assert_eq!(conn.state(), State::Operating);

        let invoke_id = conn.set_scanner_operational_state(2, true, now, |_| {}).unwrap();
        let echo = Apdu::Prst(DataApdu {
            invoke_id,
            message: DataApduMessage::RorsConfirmedSet(SetArgs {
                obj_handle: 2,
                attributes: vec![AttributeValueAssertion {
                    attribute_id: ATTR_SCANNER_OP_STATE,
                    value: vec![1],
                }],
            }),
        });
        conn.on_bytes_received(&echo.encode(64).unwrap(), now).unwrap();

        match conn.mds().get_by_handle(2).unwrap() {
            MdsObject::EpiCfgScanner(s) => {
                assert_eq!(s.common.operational_state, crate::dim::object::ScannerOperationalState::Enabled)
            }
            other => panic!("expected EpiCfgScanner, got {other:?}"),
        }
    }

    #[test]
    fn multi_person_fixed_scan_report_updates_every_person() {
        let mut conn = harness();
        let now = Instant::now();
        conn.open(now).unwrap();
        deliver_aare(&mut conn, config_id::STANDARD_WEIGHING_SCALE, now);
        assert_eq!(conn.state(), State::Operating);

        let report = crate::codec::ScanReportInfoMPFixed {
            data_req_id: 1,
            scan_report_no: 1,
            persons: vec![
                crate::codec::ScanReportPerFixed {
                    person_id: 1,
                    observations: vec![ObservationFixed { obj_handle: 1, value: 1100 }],
                },
                crate::codec::ScanReportPerFixed {
                    person_id: 2,
                    observations: vec![ObservationFixed { obj_handle: 1, value: 900 }],
                },
            ],
        };
        let mut w = Writer::with_capacity(64);
        report.encode(&mut w);
        let apdu = Apdu::Prst(DataApdu {
            invoke_id: 11,
            message: DataApduMessage::RoivConfirmedEventReport(EventReport {
                obj_handle: MDS_HANDLE,
                event_time: 0,
                event_type: event_type::MDC_NOTI_SCAN_REPORT_MP_FIXED,
                info: w.buffer(),
            }),
        });
        conn.on_bytes_received(&apdu.encode(256).unwrap(), now).unwrap();

        // The second person's observation is the one left standing: both
        // target the same handle, and this mirror has no per-person slots.
        match conn.mds().get_by_handle(1).unwrap() {
            MdsObject::Numeric(n) => assert_eq!(n.value, Some(900)),
            other => panic!("expected Numeric, got {other:?}"),
        }
    }

    #[test]
    fn data_list_serializes_to_json() {
        let data = DataList {
            entries: vec![DataEntry {
                handle: 1,
                numeric: Some(42),
                enumeration: None,
            }],
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("42"));
    }

    #[test]
    fn non_config_roiv_in_waiting_for_config_is_rejected() {
        let mut conn = harness();
        let now = Instant::now();
        conn.open(now).unwrap();
        deliver_aare(&mut conn, 0x4001, now);
        assert_eq!(conn.state(), State::WaitingForConfig);

        let get = Apdu::Prst(DataApdu {
            invoke_id: 9,
            message: DataApduMessage::RoivGet(GetArgs {
                obj_handle: 0,
                attribute_ids: vec![],
            }),
        });
        conn.on_bytes_received(&get.encode(64).unwrap(), now).unwrap();
        assert_eq!(conn.state(), State::WaitingForConfig);

        let sent = conn.transport.sent.last().unwrap();
        let decoded = Apdu::decode(sent).unwrap();
        match decoded {
            Apdu::Prst(DataApdu {
                message: DataApduMessage::Roer { error_value, .. },
                ..
            }) => assert_eq!(error_value, error_value::NO_SUCH_OBJECT_INSTANCE),
            other => panic!("expected ROER, got {other:?}"),
        }
    }
}
