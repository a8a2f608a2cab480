//! Service layer (§4.4): outstanding-invocation table, invoke-id
//! allocation, timeout scheduling, response correlation.

use crate::codec::{DataApdu, DataApduMessage};
use crate::error::ServiceError;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Which `RORS-*` shape a pending invocation expects back (§3 "Pending
/// request": "expected result choice").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    ConfirmedEventReport,
    Get,
    Set,
    Action,
}

impl ResponseKind {
    fn matches(self, message: &DataApduMessage) -> bool {
        matches!(
            (self, message),
            (ResponseKind::ConfirmedEventReport, DataApduMessage::RorsConfirmedEventReport(_))
                | (ResponseKind::Get, DataApduMessage::RorsGet(_))
                | (ResponseKind::Set, DataApduMessage::RorsConfirmedSet(_))
                | (ResponseKind::Action, DataApduMessage::RorsConfirmedAction(_))
        )
    }
}

/// Outcome delivered to a pending request's callback exactly once (§4.4
/// invariant I3).
pub type ServiceResult = Result<DataApduMessage, ServiceError>;

type Callback = Box<dyn FnOnce(ServiceResult)>;

/// Sentinel for "never times out" (§4.4 `send_remote_operation`).
pub const NO_TIMEOUT: Option<Duration> = None;

struct PendingRequest {
    expected: ResponseKind,
    deadline: Option<Instant>,
    debug_label: String,
    callback: Callback,
}

/// Outstanding-request table keyed by invoke-id (§4.4).
#[derive(Default)]
pub struct Service {
    pending: HashMap<u16, PendingRequest>,
    next_invoke_id: u16,
}

impl Service {
    pub fn new() -> Self {
        Service {
            pending: HashMap::new(),
            next_invoke_id: 1,
        }
    }

    /// Rotating counter, monotonic modulo 2^16, skipping 0 (§3 "Pending
    /// request").
    fn allocate_invoke_id(&mut self) -> u16 {
        loop {
            let id = self.next_invoke_id;
            self.next_invoke_id = self.next_invoke_id.wrapping_add(1);
            if id != 0 && !self.pending.contains_key(&id) {
                return id;
            }
            if id == 0 {
                self.next_invoke_id = 1;
            }
        }
    }

    /// §4.4 `send_remote_operation`: allocates a fresh invoke-id, enqueues
    /// a pending entry with `deadline = now + timeout` (or no deadline if
    /// `timeout` is `NO_TIMEOUT`), and returns the invoke-id the caller
    /// must patch into the outbound APDU before handing it to the
    /// transport. Registering and sending are split because the service
    /// layer never touches the transport directly (§4.4: it is a
    /// bookkeeping layer, not a sender).
    pub fn send_remote_operation(
        &mut self,
        expected: ResponseKind,
        timeout: Option<Duration>,
        now: Instant,
        debug_label: impl Into<String>,
        callback: Callback,
    ) -> u16 {
        let invoke_id = self.allocate_invoke_id();
        self.pending.insert(
            invoke_id,
            PendingRequest {
                expected,
                deadline: timeout.map(|t| now + t),
                debug_label: debug_label.into(),
                callback,
            },
        );
        invoke_id
    }

    /// §4.4 `check_known_invoke_id`: true if a pending entry exists for
    /// this invoke-id whose expected family matches the received form, or
    /// if the response is a generic `ROER`/`RORJ` (those carry no
    /// type-specific shape to match against).
    pub fn check_known_invoke_id(&self, data_apdu: &DataApdu) -> bool {
        match self.pending.get(&data_apdu.invoke_id) {
            Some(entry) => {
                data_apdu.message.is_roer() || data_apdu.message.is_rorj() || entry.expected.matches(&data_apdu.message)
            }
            None => false,
        }
    }

    /// §4.4 `request_retired`: removes the matching entry and invokes its
    /// callback with the decoded response (or the appropriate
    /// `ServiceError` for `ROER`/`RORJ`). A response whose invoke-id is
    /// not in the table, or whose shape doesn't match, is a no-op (§3
    /// "silently dropped after a reject is considered").
    pub fn request_retired(&mut self, data_apdu: DataApdu) -> bool {
        if !self.check_known_invoke_id(&data_apdu) {
            return false;
        }
        if let Some(entry) = self.pending.remove(&data_apdu.invoke_id) {
            log::debug!(
                "service: retiring invoke_id {} ({})",
                data_apdu.invoke_id,
                entry.debug_label
            );
            let outcome = match data_apdu.message {
                DataApduMessage::Roer { error_value, .. } => Err(ServiceError::RemoteError(error_value)),
                DataApduMessage::Rorj(reject) => Err(ServiceError::RemoteReject(reject)),
                other => Ok(other),
            };
            (entry.callback)(outcome);
            true
        } else {
            false
        }
    }

    /// §4.4 `on_timer_tick`: removes and retires every pending entry whose
    /// deadline has passed, invoking each callback with `Timeout`.
    pub fn on_timer_tick(&mut self, now: Instant) {
        let expired: Vec<u16> = self
            .pending
            .iter()
            .filter_map(|(id, entry)| match entry.deadline {
                Some(deadline) if deadline <= now => Some(*id),
                _ => None,
            })
            .collect();
        for id in expired {
            if let Some(entry) = self.pending.remove(&id) {
                log::debug!("service: invoke_id {} timed out ({})", id, entry.debug_label);
                (entry.callback)(Err(ServiceError::Timeout));
            }
        }
    }

    /// Drains every pending entry with the given terminal outcome (§5
    /// "Cancellation": abort/link-down fail all pending requests). Used
    /// instead of a bare `clear()` so invariant I3 (exactly one callback
    /// per entry) holds even on teardown.
    pub fn drain_all(&mut self, outcome: impl Fn() -> ServiceError) {
        for (_, entry) in self.pending.drain() {
            (entry.callback)(Err(outcome()));
        }
    }

    /// §4.4 `init`: clears the table when (re-)entering Operating. Any
    /// leftover entries (a stale table from a prior association on this
    /// same context) are retired as aborted first, never silently
    /// dropped.
    pub fn init(&mut self) {
        self.drain_all(|| ServiceError::Aborted);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Removes a just-allocated entry without sending its response through
    /// the usual decode path — used when the transport send for a freshly
    /// registered invocation fails outright, so the entry doesn't sit
    /// around waiting for a reply that was never transmitted (§4.4 I2:
    /// every entry retires, never leaks).
    pub fn cancel(&mut self, invoke_id: u16, outcome: ServiceError) {
        if let Some(entry) = self.pending.remove(&invoke_id) {
            (entry.callback)(Err(outcome));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn data_apdu_rors_get(invoke_id: u16) -> DataApdu {
        DataApdu {
            invoke_id,
            message: DataApduMessage::RorsGet(crate::codec::GetResult {
                obj_handle: 0,
                attributes: vec![],
            }),
        }
    }

    #[test]
    fn invoke_ids_are_unique_while_pending() {
        let mut svc = Service::new();
        let now = Instant::now();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..10 {
            let id = svc.send_remote_operation(ResponseKind::Get, None, now, "t", Box::new(|_| {}));
            assert!(ids.insert(id));
        }
    }

    #[test]
    fn invoke_id_zero_is_never_allocated() {
        let mut svc = Service::new();
        svc.next_invoke_id = 0;
        let now = Instant::now();
        let id = svc.send_remote_operation(ResponseKind::Get, None, now, "t", Box::new(|_| {}));
        assert_ne!(id, 0);
    }

    #[test]
    fn matching_response_retires_and_invokes_callback_once() {
        let mut svc = Service::new();
        let now = Instant::now();
        let calls = Rc::new(RefCell::new(0));
        let calls2 = calls.clone();
        let id = svc.send_remote_operation(
            ResponseKind::Get,
            None,
            now,
            "get mds",
            Box::new(move |result| {
                *calls2.borrow_mut() += 1;
                assert!(result.is_ok());
            }),
        );
        assert!(svc.check_known_invoke_id(&data_apdu_rors_get(id)));
        assert!(svc.request_retired(data_apdu_rors_get(id)));
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(svc.pending_count(), 0);
    }

    #[test]
    fn unknown_invoke_id_is_dropped_silently() {
        let mut svc = Service::new();
        assert!(!svc.check_known_invoke_id(&data_apdu_rors_get(99)));
        assert!(!svc.request_retired(data_apdu_rors_get(99)));
    }

    #[test]
    fn mismatched_shape_is_not_retired() {
        let mut svc = Service::new();
        let now = Instant::now();
        let id = svc.send_remote_operation(ResponseKind::Action, None, now, "action", Box::new(|_| {}));
        // A GET response arrives for an invoke-id expecting an Action result.
        assert!(!svc.check_known_invoke_id(&data_apdu_rors_get(id)));
        assert_eq!(svc.pending_count(), 1);
    }

    #[test]
    fn roer_and_rorj_retire_regardless_of_expected_shape() {
        let mut svc = Service::new();
        let now = Instant::now();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let c1 = calls.clone();
        let id = svc.send_remote_operation(
            ResponseKind::Get,
            None,
            now,
            "get",
            Box::new(move |r| c1.borrow_mut().push(r)),
        );
        let roer = DataApdu {
            invoke_id: id,
            message: DataApduMessage::Roer {
                error_value: 7,
                parameter: vec![],
            },
        };
        assert!(svc.check_known_invoke_id(&roer));
        assert!(svc.request_retired(roer));
        assert!(matches!(calls.borrow()[0], Err(ServiceError::RemoteError(7))));
    }

    #[test]
    fn timeout_retires_expired_entries_only() {
        let mut svc = Service::new();
        let now = Instant::now();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let c1 = calls.clone();
        svc.send_remote_operation(
            ResponseKind::Get,
            Some(Duration::from_secs(1)),
            now,
            "short",
            Box::new(move |r| c1.borrow_mut().push(r)),
        );
        let c2 = calls.clone();
        svc.send_remote_operation(
            ResponseKind::Get,
            Some(Duration::from_secs(100)),
            now,
            "long",
            Box::new(move |r| c2.borrow_mut().push(r)),
        );
        svc.on_timer_tick(now + Duration::from_secs(2));
        assert_eq!(svc.pending_count(), 1);
        assert_eq!(calls.borrow().len(), 1);
        assert!(matches!(calls.borrow()[0], Err(ServiceError::Timeout)));
    }

    #[test]
    fn no_timeout_entries_never_expire() {
        let mut svc = Service::new();
        let now = Instant::now();
        svc.send_remote_operation(ResponseKind::Get, NO_TIMEOUT, now, "no-timeout", Box::new(|_| {}));
        svc.on_timer_tick(now + Duration::from_secs(1_000_000));
        assert_eq!(svc.pending_count(), 1);
    }

    #[test]
    fn drain_all_invokes_every_callback_exactly_once() {
        let mut svc = Service::new();
        let now = Instant::now();
        let calls = Rc::new(RefCell::new(0));
        for _ in 0..3 {
            let c = calls.clone();
            svc.send_remote_operation(
                ResponseKind::Get,
                None,
                now,
                "x",
                Box::new(move |r| {
                    assert!(matches!(r, Err(ServiceError::Aborted)));
                    *c.borrow_mut() += 1;
                }),
            );
        }
        svc.init();
        assert_eq!(*calls.borrow(), 3);
        assert_eq!(svc.pending_count(), 0);
    }

    #[test]
    fn cancel_invokes_callback_with_given_outcome() {
        let mut svc = Service::new();
        let now = Instant::now();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let c1 = calls.clone();
        let id = svc.send_remote_operation(
            ResponseKind::Get,
            None,
            now,
            "x",
            Box::new(move |r| c1.borrow_mut().push(r)),
        );
        svc.cancel(id, ServiceError::Aborted);
        assert_eq!(svc.pending_count(), 0);
        assert!(matches!(calls.borrow()[0], Err(ServiceError::Aborted)));
    }
}
