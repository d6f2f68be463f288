//! Core logic for the `tree-patch` binary.
//!
//! Kept out of `src/bin/` so it can be tested without spawning a process.

use thiserror::Error;

use crate::patch::{self, PatchError};
use crate::value::Value;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Apply command tuples to a document, both given as JSON text.
///
/// `commands` is one `[op, path, ...args]` tuple or an array of them; the
/// result is the patched document as JSON text.
pub fn apply_command_tuples(doc: &str, commands: &str) -> Result<String, CliError> {
    let doc: serde_json::Value = serde_json::from_str(doc)?;
    let tuples: serde_json::Value = serde_json::from_str(commands)?;
    let commands = patch::decode_commands(&tuples)?;
    let next = patch::apply_all(&Value::from(doc), &commands)?;
    Ok(serde_json::to_string(&next)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_a_tuple_list() {
        let out = apply_command_tuples("{}", r#"[["set","a.b",1],["push","list",2]]"#).unwrap();
        assert_eq!(out, r#"{"a":{"b":1},"list":[2]}"#);
    }

    #[test]
    fn applies_a_single_tuple() {
        let out = apply_command_tuples(r#"{"list":[1,2,3]}"#, r#"["splice","list",0]"#).unwrap();
        assert_eq!(out, r#"{"list":[]}"#);
    }

    #[test]
    fn reports_patch_errors() {
        let err = apply_command_tuples(r#"{"n":1}"#, r#"["push","n",2]"#).unwrap_err();
        assert!(matches!(err, CliError::Patch(PatchError::NotASequence { .. })));
    }

    #[test]
    fn reports_json_errors() {
        assert!(matches!(
            apply_command_tuples("not json", "[]").unwrap_err(),
            CliError::Json(_)
        ));
    }
}
