//! Shared helpers for the integration tests.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sl::{Config, HandlerKind, Writer};

/// Serializes tests that install or read the process default logger.
static DEFAULT_LOCK: Mutex<()> = Mutex::new(());

#[allow(dead_code)]
pub fn default_guard() -> MutexGuard<'static, ()> {
    DEFAULT_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A JSON file logger config writing under `dir`, not installed as default.
#[allow(dead_code)]
pub fn file_config(dir: &Path, kind: HandlerKind) -> Config {
    Config {
        level: "debug".into(),
        add_source: false,
        is_json: true,
        writer: Writer::File,
        out_path: dir.to_string_lossy().into_owned(),
        set_default: false,
        kind,
        replace_attr: None,
    }
}

/// Parse every line of `<dir>/all.log` as JSON.
#[allow(dead_code)]
pub fn read_json_lines(dir: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(dir.join("all.log"))
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}
