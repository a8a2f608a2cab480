//! A `toml`-backed `ExtendedConfigRegistry`, in the spirit of the teacher's
//! `config.toml` / `toml::from_str` loading pattern. Persistence is an
//! external collaborator the core never owns, so this lives here rather
//! than in the library itself — run with `cargo run --example toml_registry`.

use phd_manager::codec::ConfigObject;
use phd_manager::registry::ExtendedConfigRegistry;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Default, serde::Serialize, serde::Deserialize)]
struct TomlRegistry {
    entries: HashMap<String, Vec<ConfigObject>>,
}

struct FileBackedRegistry {
    path: PathBuf,
    data: TomlRegistry,
}

fn key(system_id: &[u8], config_report_id: u16) -> String {
    format!("{}:{:04x}", hex(system_id), config_report_id)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl FileBackedRegistry {
    fn open(path: PathBuf) -> Self {
        let data = fs::read_to_string(&path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default();
        FileBackedRegistry { path, data }
    }

    fn flush(&self) {
        if let Ok(s) = toml::to_string_pretty(&self.data) {
            let _ = fs::write(&self.path, s);
        }
    }
}

impl ExtendedConfigRegistry for FileBackedRegistry {
    fn register(&mut self, system_id: &[u8], config_report_id: u16, objects: Vec<ConfigObject>) {
        self.data.entries.insert(key(system_id, config_report_id), objects);
        self.flush();
    }

    fn lookup(&self, system_id: &[u8], config_report_id: u16) -> Option<Vec<ConfigObject>> {
        self.data.entries.get(&key(system_id, config_report_id)).cloned()
    }
}

fn main() {
    phd_manager::logging::init();

    let path = std::env::temp_dir().join("phd_manager_registry_demo.toml");
    let mut registry = FileBackedRegistry::open(path.clone());

    let system_id = [0xAA, 0xBB, 0xCC, 0xDD];
    let config_report_id = 0x4001;

    if registry.lookup(&system_id, config_report_id).is_some() {
        log::info!("found a cached extended config at {}", path.display());
    } else {
        log::info!("no cached extended config, registering one at {}", path.display());
        registry.register(
            &system_id,
            config_report_id,
            vec![ConfigObject {
                obj_class: 4,
                obj_handle: 1,
                attributes: vec![],
            }],
        );
    }

    let _ = fs::remove_file(&path);
}
