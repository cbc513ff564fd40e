//! Startup wiring: settings file, journal file, session

use crate::ConsoleError;
use services_settings::{create_default_registry, load_overrides_safe, SessionConfig};
use services_storage::JournaledStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Console startup options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Journal file; `None` keeps everything in memory
    pub store_path: Option<PathBuf>,
    /// Settings overrides file
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
}

/// Builds the session config from defaults plus the optional overrides file
///
/// An unreadable overrides file falls back to defaults. Overrides that
/// parse but are invalid (wrong type, bad value) are an error.
pub fn load_session_config(path: Option<&Path>) -> Result<SessionConfig, ConsoleError> {
    let mut registry = create_default_registry();
    if let Some(path) = path {
        let bytes = fs::read(path)?;
        let data = load_overrides_safe(&bytes);
        data.apply_to(&mut registry)?;
        info!(path = %path.display(), overrides = data.overrides.len(), "loaded settings");
    }
    Ok(SessionConfig::from_registry(&registry)?)
}

/// Loads the journal at `path`
///
/// A missing file is a fresh store. A file that is not a journal is left
/// alone and the session starts empty; the next save overwrites it.
pub fn load_journal(path: &Path) -> Result<JournaledStore, ConsoleError> {
    match fs::read_to_string(path) {
        Ok(json) => match JournaledStore::from_json(&json) {
            Ok(store) => Ok(store),
            Err(err) => {
                warn!(path = %path.display(), %err, "journal unreadable; starting empty");
                Ok(JournaledStore::new())
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(JournaledStore::new()),
        Err(err) => Err(err.into()),
    }
}

/// Writes the journal next to `path` and moves it into place
pub fn save_journal(store: &JournaledStore, path: &Path) -> Result<(), ConsoleError> {
    let json = store.to_json()?;
    let staging = path.with_extension("tmp");
    fs::write(&staging, json)?;
    fs::rename(&staging, path)?;
    Ok(())
}
