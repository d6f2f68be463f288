//! Patch application with structural sharing.
//!
//! All operations share one path-walk: starting at the root, descend step by
//! step, cloning each visited container so that only the spine from the root
//! to the target differs from the input. The walk runs on `Arc::make_mut`,
//! which copies a container exactly when it is shared (and the caller's
//! snapshot always shares it), so siblings off the spine stay
//! pointer-identical across the two states.

use std::sync::Arc;

use treepatch_path::{Path, Step};

use super::types::{Command, PatchError};
use crate::value::{Map, Value};

/// Apply one command to a state, returning the new state.
///
/// The input is untouched; unaffected branches of the result are shared with
/// it by reference.
pub fn apply(state: &Value, command: &Command) -> Result<Value, PatchError> {
    let mut next = state.clone();
    apply_mut(&mut next, command)?;
    Ok(next)
}

/// Apply commands left-to-right against one evolving state.
///
/// A later command observes the state produced by all earlier ones. On error
/// the partially-patched state is discarded; callers that need to keep it
/// (the batch coordinator) drive [`apply_mut`] themselves.
pub fn apply_all(state: &Value, commands: &[Command]) -> Result<Value, PatchError> {
    let mut next = state.clone();
    for command in commands {
        apply_mut(&mut next, command)?;
    }
    Ok(next)
}

/// In-place form of [`apply`]; `state` must be a snapshot the caller owns.
pub fn apply_mut(state: &mut Value, command: &Command) -> Result<(), PatchError> {
    match command {
        Command::Set { path, value } => {
            set_value(state, path, value.clone());
            Ok(())
        }
        Command::SetMany { entries } => {
            for (path, value) in entries {
                set_value(state, path, value.clone());
            }
            Ok(())
        }
        Command::Push { path, value } => {
            let target = sequence_mut(slot_mut(state, path.steps()), path)?;
            target.push(value.clone());
            Ok(())
        }
        Command::Splice {
            path,
            start,
            delete_count,
            items,
        } => {
            let target = sequence_mut(slot_mut(state, path.steps()), path)?;
            let len = target.len();
            let start = (*start).min(len);
            let removable = len - start;
            let delete = delete_count.map_or(removable, |count| count.min(removable));
            let mut next = Vec::with_capacity(len - delete + items.len());
            next.extend_from_slice(&target[..start]);
            next.extend(items.iter().cloned());
            next.extend_from_slice(&target[start + delete..]);
            *target = next;
            Ok(())
        }
    }
}

/// The narrow/full result view for one call's worth of commands.
///
/// When every command targets the same top-level key, the view is the
/// sub-tree at that key; otherwise it is the full state. The view is a cheap
/// clone; it shares all containers with the state it was cut from.
pub fn narrow_view(state: &Value, commands: &[Command]) -> Value {
    match shared_first_step(commands) {
        Some(step) => state.get_step(step).cloned().unwrap_or(Value::Null),
        None => state.clone(),
    }
}

fn set_value(state: &mut Value, path: &Path, value: Value) {
    if path.is_empty() {
        // whole-state replacement, internal callers only
        *state = value;
    } else {
        *slot_mut(state, path.steps()) = value;
    }
}

/// Walk to the slot addressed by `steps`, vivifying missing intermediates.
///
/// A missing (or scalar) node becomes an empty mapping under a key step and
/// an empty sequence under an index step; sequences are padded with nulls up
/// to a written index.
fn slot_mut<'a>(state: &'a mut Value, steps: &[Step]) -> &'a mut Value {
    let mut current = state;
    for step in steps {
        current = match step {
            Step::Key(key) => object_mut(current)
                .entry(key.clone())
                .or_insert(Value::Null),
            Step::Index(index) => {
                let items = array_mut(current);
                if items.len() <= *index {
                    items.resize(*index + 1, Value::Null);
                }
                &mut items[*index]
            }
        };
    }
    current
}

fn object_mut(slot: &mut Value) -> &mut Map {
    if !slot.is_object() {
        *slot = Value::empty_object();
    }
    match slot {
        Value::Object(map) => Arc::make_mut(map),
        _ => unreachable!("slot was just vivified to a mapping"),
    }
}

fn array_mut(slot: &mut Value) -> &mut Vec<Value> {
    if !slot.is_array() {
        *slot = Value::empty_array();
    }
    match slot {
        Value::Array(items) => Arc::make_mut(items),
        _ => unreachable!("slot was just vivified to a sequence"),
    }
}

/// Sequence-only target resolution for `push`/`splice`: absent targets
/// default to an empty sequence, present non-sequences are an error.
fn sequence_mut<'a>(slot: &'a mut Value, path: &Path) -> Result<&'a mut Vec<Value>, PatchError> {
    match slot {
        Value::Null => *slot = Value::empty_array(),
        Value::Array(_) => {}
        other => {
            return Err(PatchError::NotASequence {
                path: path.clone(),
                found: other.type_name(),
            })
        }
    }
    match slot {
        Value::Array(items) => Ok(Arc::make_mut(items)),
        _ => unreachable!("slot was just vivified to a sequence"),
    }
}

fn shared_first_step(commands: &[Command]) -> Option<&Step> {
    let mut shared: Option<&Step> = None;
    for command in commands {
        let paths: Vec<&Path> = match command {
            Command::SetMany { entries } => entries.iter().map(|(path, _)| path).collect(),
            Command::Set { path, .. }
            | Command::Push { path, .. }
            | Command::Splice { path, .. } => vec![path],
        };
        for path in paths {
            let step = path.first()?;
            match shared {
                None => shared = Some(step),
                Some(prev) if prev == step => {}
                Some(_) => return None,
            }
        }
    }
    shared
}
