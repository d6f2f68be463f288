//! Process-wide named registry of owner handles.
//!
//! Lets unrelated call sites retrieve an owner registered at bind time by
//! its key. The map starts empty, `register` overwrites (last writer wins),
//! and `unregister` is the optional teardown hook. Lookups never route
//! patches; they only hand out the owner handle.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use thiserror::Error;

use crate::batch::Owner;

/// Registry lookup failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The key was never registered (or was unregistered since).
    #[error("unknown registry key: {0}")]
    UnknownKey(String),
}

fn entries() -> &'static Mutex<HashMap<String, Owner>> {
    static ENTRIES: OnceLock<Mutex<HashMap<String, Owner>>> = OnceLock::new();
    ENTRIES.get_or_init(Default::default)
}

/// Register an owner handle under `key`, replacing any prior entry.
pub fn register(key: impl Into<String>, owner: Owner) {
    entries()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key.into(), owner);
}

/// Look up the owner registered under `key`.
pub fn get(key: &str) -> Result<Owner, RegistryError> {
    entries()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()
        .ok_or_else(|| RegistryError::UnknownKey(key.to_owned()))
}

/// Remove the entry for `key`, returning the owner if one was registered.
pub fn unregister(key: &str) -> Option<Owner> {
    entries()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(key)
}
