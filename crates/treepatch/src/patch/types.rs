//! Core types for the patch module.

use thiserror::Error;
use treepatch_path::{Path, PathError};

use crate::value::Value;

/// Errors raised while decoding or applying commands.
#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    /// Operation kind not one of `set`, `push`, `splice`.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
    /// A recognized operation with the wrong argument shape.
    #[error("malformed command: {0}")]
    MalformedCommand(String),
    /// `push`/`splice` target exists but is not a sequence.
    #[error("target at {path} is not a sequence (found {found})")]
    NotASequence {
        path: Path,
        found: &'static str,
    },
    #[error(transparent)]
    InvalidPath(#[from] PathError),
}

/// A single patch command.
///
/// Paths inside a command are already normalized; every dynamic input form
/// (expression strings, key arrays, the batch mapping) goes through the
/// resolver at the decode boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the leaf at `path` with `value`, vivifying missing
    /// intermediate containers.
    Set { path: Path, value: Value },
    /// The batch-object form of `set`: each entry is an independent
    /// path/value pair, applied in order against the same evolving state.
    SetMany { entries: Vec<(Path, Value)> },
    /// Append `value` to the sequence at `path` (created empty if absent).
    Push { path: Path, value: Value },
    /// Remove `delete_count` elements of the sequence at `path` starting at
    /// `start` (everything from `start` when omitted), then insert `items`
    /// there.
    Splice {
        path: Path,
        start: usize,
        delete_count: Option<usize>,
        items: Vec<Value>,
    },
}

impl Command {
    /// Create a `Set` command.
    #[inline]
    pub fn set(path: Path, value: impl Into<Value>) -> Self {
        Command::Set {
            path,
            value: value.into(),
        }
    }

    /// Create a `SetMany` command.
    #[inline]
    pub fn set_many(entries: Vec<(Path, Value)>) -> Self {
        Command::SetMany { entries }
    }

    /// Create a `Push` command.
    #[inline]
    pub fn push(path: Path, value: impl Into<Value>) -> Self {
        Command::Push {
            path,
            value: value.into(),
        }
    }

    /// Create a `Splice` command.
    #[inline]
    pub fn splice(path: Path, start: usize, delete_count: Option<usize>, items: Vec<Value>) -> Self {
        Command::Splice {
            path,
            start,
            delete_count,
            items,
        }
    }

    /// The operation name string.
    pub fn op_name(&self) -> &'static str {
        match self {
            Command::Set { .. } | Command::SetMany { .. } => "set",
            Command::Push { .. } => "push",
            Command::Splice { .. } => "splice",
        }
    }

    /// The target path of a single-target command; `None` for `SetMany`.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Command::Set { path, .. } => Some(path),
            Command::SetMany { .. } => None,
            Command::Push { path, .. } => Some(path),
            Command::Splice { path, .. } => Some(path),
        }
    }
}
