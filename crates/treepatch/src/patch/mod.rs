//! The patch engine: commands, application, and the tuple codec.
//!
//! # Operations
//!
//! - `set` — replace the leaf at a path, vivifying missing intermediates;
//!   also accepts a mapping of path expressions to values (batch form).
//! - `push` — append to the sequence at a path (created empty if absent).
//! - `splice` — remove/insert elements of the sequence at a path; the delete
//!   count defaults to everything from the start index.
//!
//! Application is pure and structurally sharing: only the spine from the
//! root to each target is cloned, all other branches are reused by
//! reference.

pub mod apply;
pub mod codec;
pub mod types;

pub use apply::{apply, apply_all, apply_mut, narrow_view};
pub use codec::{decode_command, decode_commands, encode_command};
pub use types::{Command, PatchError};
