//! Extended-configuration persistence (§6 "Persistence of extended
//! configurations", §9 "Global catalogues": "an injected interface ...
//! not process-global state").

use crate::codec::ConfigObject;
use std::collections::HashMap;

/// Addressed by `(system_id, config_report_id)`. An external collaborator
/// per §1 — the core only calls `register`/`lookup`; it never owns
/// persistence itself. Implementations covering real storage (a file, a
/// database) live outside this crate; `InMemoryRegistry` below is the
/// reference implementation used by tests.
pub trait ExtendedConfigRegistry {
    fn register(&mut self, system_id: &[u8], config_report_id: u16, objects: Vec<ConfigObject>);
    fn lookup(&self, system_id: &[u8], config_report_id: u16) -> Option<Vec<ConfigObject>>;
}

/// A process-local, non-persistent reference implementation. Good enough
/// for tests and single-run hosts; anything that needs configurations to
/// survive a restart should provide its own implementation (e.g. backed
/// by a file or embedded database), per §5 "must provide its own
/// thread-safety" if shared across contexts.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    entries: HashMap<(Vec<u8>, u16), Vec<ConfigObject>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        InMemoryRegistry::default()
    }
}

impl ExtendedConfigRegistry for InMemoryRegistry {
    fn register(&mut self, system_id: &[u8], config_report_id: u16, objects: Vec<ConfigObject>) {
        self.entries.insert((system_id.to_vec(), config_report_id), objects);
    }

    fn lookup(&self, system_id: &[u8], config_report_id: u16) -> Option<Vec<ConfigObject>> {
        self.entries.get(&(system_id.to_vec(), config_report_id)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::nomenclature::object_class::MDC_MOC_VMO_METRIC_NU;

    fn sample_objects() -> Vec<ConfigObject> {
        vec![ConfigObject {
            obj_class: MDC_MOC_VMO_METRIC_NU,
            obj_handle: 1,
            attributes: vec![],
        }]
    }

    #[test]
    fn lookup_before_register_is_none() {
        let reg = InMemoryRegistry::new();
        assert!(reg.lookup(b"sys-1", 0x4001).is_none());
    }

    #[test]
    fn register_then_lookup_round_trips() {
        let mut reg = InMemoryRegistry::new();
        reg.register(b"sys-1", 0x4001, sample_objects());
        assert_eq!(reg.lookup(b"sys-1", 0x4001), Some(sample_objects()));
    }

    #[test]
    fn entries_are_scoped_by_both_system_id_and_config_id() {
        let mut reg = InMemoryRegistry::new();
        reg.register(b"sys-1", 0x4001, sample_objects());
        assert!(reg.lookup(b"sys-2", 0x4001).is_none());
        assert!(reg.lookup(b"sys-1", 0x4002).is_none());
    }
}
