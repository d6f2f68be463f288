//! treepatch — path-addressed patch engine for tree-shaped state.
//!
//! Given a current state and one or more commands (`set`, `push`, `splice`,
//! or the batch-object form of `set`) addressed by dot/bracket paths, the
//! engine produces a new state with structural sharing: only the spine from
//! the root to each target is rebuilt, every other branch is reused by
//! reference. A per-owner coordinator accumulates repeated calls onto one
//! evolving state and commits each result to the host exactly once, and a
//! process-wide registry hands out owner handles by name.
//!
//! # Example
//!
//! ```
//! use treepatch::{patch, Command, Value};
//! use treepatch::path;
//! use serde_json::json;
//!
//! let state = Value::from(json!({"x": {"y": 0}, "list": [0]}));
//! let next = patch::apply_all(
//!     &state,
//!     &[
//!         Command::set(path!("x", "y"), 1i64),
//!         Command::push(path!("list"), 1i64),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(next, json!({"x": {"y": 1}, "list": [0, 1]}));
//! ```

pub mod batch;
pub mod cli;
pub mod patch;
pub mod registry;
pub mod value;

pub use batch::{bind, Owner, OwnerId, StateHolder, UpdateError, Updater};
pub use patch::{Command, PatchError};
pub use registry::RegistryError;
pub use value::{Map, Value};

pub use treepatch_path::{parse as parse_path, path, Path, PathError, Step};
