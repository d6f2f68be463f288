//! Compact tuple codec for patch commands.
//!
//! Each command is a JSON array `[op, path, ...args]` where `op` is the
//! operation name, and `path` is either a dot/bracket expression string or an
//! array of keys:
//!
//! ```text
//! ["set", "x.y", 1]
//! ["set", ["x", "y"], 1]
//! ["set", {"x.y": 1, "list": []}]
//! ["push", "list", 1]
//! ["splice", "list", 0]
//! ["splice", "list", 1, 2, "a", "b"]
//! ```
//!
//! This is the wire form of the updater's dynamic call shapes, and what the
//! `tree-patch` binary accepts.

use serde_json::Value as Json;

use treepatch_path::Path;

use super::types::{Command, PatchError};
use crate::value::Value;

/// Decode a single `[op, path, ...args]` tuple.
pub fn decode_command(tuple: &Json) -> Result<Command, PatchError> {
    let parts = tuple
        .as_array()
        .ok_or_else(|| PatchError::MalformedCommand("command must be an array".into()))?;
    let (op, args) = parts
        .split_first()
        .ok_or_else(|| PatchError::MalformedCommand("command is empty".into()))?;
    let op = op
        .as_str()
        .ok_or_else(|| PatchError::MalformedCommand("operation kind must be a string".into()))?;
    match op {
        "set" => decode_set(args),
        "push" => decode_push(args),
        "splice" => decode_splice(args),
        other => Err(PatchError::UnknownOperation(other.to_owned())),
    }
}

/// Decode either one command tuple or an array of them.
///
/// A leading string marks a single tuple (`["set", "a", 1]`); anything else
/// is treated as a list of tuples.
pub fn decode_commands(input: &Json) -> Result<Vec<Command>, PatchError> {
    let parts = input
        .as_array()
        .ok_or_else(|| PatchError::MalformedCommand("commands must be an array".into()))?;
    if parts.first().is_some_and(Json::is_string) {
        return Ok(vec![decode_command(input)?]);
    }
    parts.iter().map(decode_command).collect()
}

/// Encode a command back into its tuple form (paths as expression strings).
pub fn encode_command(command: &Command) -> Json {
    match command {
        Command::Set { path, value } => Json::Array(vec![
            Json::from("set"),
            Json::from(path.to_string()),
            Json::from(value.clone()),
        ]),
        Command::SetMany { entries } => {
            let map: serde_json::Map<String, Json> = entries
                .iter()
                .map(|(path, value)| (path.to_string(), Json::from(value.clone())))
                .collect();
            Json::Array(vec![Json::from("set"), Json::Object(map)])
        }
        Command::Push { path, value } => Json::Array(vec![
            Json::from("push"),
            Json::from(path.to_string()),
            Json::from(value.clone()),
        ]),
        Command::Splice {
            path,
            start,
            delete_count,
            items,
        } => {
            let mut parts = vec![
                Json::from("splice"),
                Json::from(path.to_string()),
                Json::from(*start as u64),
            ];
            // items require an explicit count; absent-count splices carry none
            if let Some(count) = delete_count {
                parts.push(Json::from(*count as u64));
                parts.extend(items.iter().cloned().map(Json::from));
            }
            Json::Array(parts)
        }
    }
}

fn decode_path(input: &Json) -> Result<Path, PatchError> {
    match input {
        Json::String(expr) => Ok(treepatch_path::parse(expr)?),
        Json::Array(_) => Ok(Path::try_from(input)?),
        _ => Err(PatchError::MalformedCommand(
            "path must be an expression string or an array of keys".into(),
        )),
    }
}

fn decode_set(args: &[Json]) -> Result<Command, PatchError> {
    match args {
        [Json::Object(map)] => {
            let mut entries = Vec::with_capacity(map.len());
            for (expr, value) in map {
                entries.push((treepatch_path::parse(expr)?, Value::from(value.clone())));
            }
            Ok(Command::SetMany { entries })
        }
        [path, value] => Ok(Command::Set {
            path: decode_path(path)?,
            value: Value::from(value.clone()),
        }),
        _ => Err(PatchError::MalformedCommand(
            "set expects a path and a value, or a single mapping".into(),
        )),
    }
}

fn decode_push(args: &[Json]) -> Result<Command, PatchError> {
    match args {
        [path, value] => Ok(Command::Push {
            path: decode_path(path)?,
            value: Value::from(value.clone()),
        }),
        _ => Err(PatchError::MalformedCommand(
            "push expects a path and a value".into(),
        )),
    }
}

fn decode_splice(args: &[Json]) -> Result<Command, PatchError> {
    let [path, start, rest @ ..] = args else {
        return Err(PatchError::MalformedCommand(
            "splice expects a path and a start index".into(),
        ));
    };
    let path = decode_path(path)?;
    let start = start.as_u64().ok_or_else(|| {
        PatchError::MalformedCommand("splice start must be a non-negative integer".into())
    })? as usize;
    let (delete_count, items) = match rest.split_first() {
        None => (None, Vec::new()),
        Some((count, items)) => {
            let count = count.as_u64().ok_or_else(|| {
                PatchError::MalformedCommand("splice delete count must be a non-negative integer".into())
            })? as usize;
            (Some(count), items.iter().cloned().map(Value::from).collect())
        }
    };
    Ok(Command::Splice {
        path,
        start,
        delete_count,
        items,
    })
}
