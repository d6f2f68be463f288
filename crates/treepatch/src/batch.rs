//! Per-owner batch coordination.
//!
//! An [`Owner`] is one independent unit of state: an opaque id, the
//! current-state cell, and the host's [`StateHolder`]. [`bind`] creates the
//! owner and hands back an [`Updater`], the call-site entry point. Repeated
//! updater calls accumulate onto the owner's evolving state: each call
//! applies against the result of the previous one, and every call commits
//! the full new state to the holder exactly once.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use treepatch_path::PathError;

use crate::patch::{self, Command, PatchError};
use crate::registry;
use crate::value::Value;

/// The host state holder: the excluded collaborator that owns rendering and
/// lifecycle. The engine reads its state once at bind time and hands every
/// newly computed state to [`StateHolder::assign`]; it never inspects the
/// result of either.
pub trait StateHolder: Send + Sync {
    /// The holder's current state, used to seed the owner at bind time.
    fn state(&self) -> Value;

    /// Assignment entry point; called exactly once per updater call with the
    /// full new state.
    fn assign(&self, state: Value);
}

/// Errors surfaced by updater calls.
#[derive(Debug, Error, PartialEq)]
pub enum UpdateError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Opaque owner identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        OwnerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

struct OwnerInner {
    id: OwnerId,
    holder: Box<dyn StateHolder>,
    state: Mutex<Value>,
}

/// Handle to one owner: cheap to clone, safe to stash in the registry.
#[derive(Clone)]
pub struct Owner {
    inner: Arc<OwnerInner>,
}

impl Owner {
    fn new(holder: Box<dyn StateHolder>) -> Self {
        let state = holder.state();
        Owner {
            inner: Arc::new(OwnerInner {
                id: OwnerId::next(),
                holder,
                state: Mutex::new(state),
            }),
        }
    }

    /// The owner's opaque identity.
    pub fn id(&self) -> OwnerId {
        self.inner.id
    }

    /// Snapshot of the owner's current state. Cheap: containers are shared.
    pub fn state(&self) -> Value {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// An updater bound to this owner.
    pub fn updater(&self) -> Updater {
        Updater {
            owner: self.clone(),
        }
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owner").field("id", &self.inner.id).finish()
    }
}

/// Two handles are equal when they refer to the same owner identity.
impl PartialEq for Owner {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

/// Bind an updater to a host state holder.
///
/// Seeds the owner's state cell from `holder.state()`. When `key` is given,
/// the owner handle is registered under it before the call returns, so any
/// later [`registry::get`] sees it.
pub fn bind(holder: impl StateHolder + 'static, key: Option<&str>) -> Updater {
    let owner = Owner::new(Box::new(holder));
    if let Some(key) = key {
        registry::register(key, owner.clone());
    }
    owner.updater()
}

/// The bound update entry point for one owner.
///
/// Each call resolves its input into commands, applies them in order against
/// the owner's current state, stores the result as the new current state,
/// commits it to the holder, and returns the result view: the sub-tree at
/// the shared top-level key when every command in the call targets the same
/// one, the full state otherwise.
///
/// There is no rollback. When a command in a multi-command call fails, the
/// owner's state keeps everything the preceding commands produced, the
/// holder receives that partial state, and the error propagates to the
/// caller. Callers needing atomicity must pre-validate.
pub struct Updater {
    owner: Owner,
}

impl Updater {
    /// The owner this updater is bound to.
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// `set` with a dot/bracket path expression.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<Value, UpdateError> {
        let path = treepatch_path::parse(path)?;
        self.invoke(&[Command::set(path, value)])
    }

    /// The batch-object form of `set`: each entry's key is an independent
    /// path expression, applied in the given order against one base state.
    pub fn set_many<'k, I>(&self, entries: I) -> Result<Value, UpdateError>
    where
        I: IntoIterator<Item = (&'k str, Value)>,
    {
        let entries = entries
            .into_iter()
            .map(|(expr, value)| Ok((treepatch_path::parse(expr)?, value)))
            .collect::<Result<Vec<_>, PathError>>()?;
        self.invoke(&[Command::SetMany { entries }])
    }

    /// `push` with a dot/bracket path expression.
    pub fn push(&self, path: &str, value: impl Into<Value>) -> Result<Value, UpdateError> {
        let path = treepatch_path::parse(path)?;
        self.invoke(&[Command::push(path, value)])
    }

    /// `splice` with a dot/bracket path expression. `delete_count` of `None`
    /// removes everything from `start` on.
    pub fn splice(
        &self,
        path: &str,
        start: usize,
        delete_count: Option<usize>,
        items: Vec<Value>,
    ) -> Result<Value, UpdateError> {
        let path = treepatch_path::parse(path)?;
        self.invoke(&[Command::splice(path, start, delete_count, items)])
    }

    /// Apply pre-built commands in one call.
    pub fn invoke(&self, commands: &[Command]) -> Result<Value, UpdateError> {
        let inner = &self.owner.inner;
        let mut state = inner.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut failure = None;
        for command in commands {
            match patch::apply(&state, command) {
                Ok(next) => *state = next,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        let snapshot = state.clone();
        drop(state);
        // one commit per call, success or failure
        inner.holder.assign(snapshot.clone());
        match failure {
            None => Ok(patch::narrow_view(&snapshot, commands)),
            Some(err) => Err(err.into()),
        }
    }

    /// The dynamic call shape: one `[op, path, ...args]` tuple or an array
    /// of them, as JSON.
    pub fn invoke_json(&self, input: &serde_json::Value) -> Result<Value, UpdateError> {
        let commands = patch::decode_commands(input)?;
        self.invoke(&commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use treepatch_path::path;

    /// Test holder recording every committed state.
    struct Recorder {
        initial: Value,
        assigned: Mutex<Vec<Value>>,
    }

    impl Recorder {
        fn new(initial: serde_json::Value) -> Arc<Self> {
            Arc::new(Recorder {
                initial: Value::from(initial),
                assigned: Mutex::new(Vec::new()),
            })
        }

        fn assigned(&self) -> Vec<Value> {
            self.assigned.lock().unwrap().clone()
        }
    }

    impl StateHolder for Arc<Recorder> {
        fn state(&self) -> Value {
            self.initial.clone()
        }

        fn assign(&self, state: Value) {
            self.assigned.lock().unwrap().push(state);
        }
    }

    #[test]
    fn sequential_calls_accumulate() {
        let holder = Recorder::new(json!({"x": {"y": 0}, "list": [0]}));
        let updater = bind(holder.clone(), None);

        updater.set("x.y", 1i64).unwrap();
        updater.set("x.z", 1i64).unwrap();
        updater.push("list", 1i64).unwrap();

        let state = updater.owner().state();
        assert_eq!(state, json!({"x": {"y": 1, "z": 1}, "list": [0, 1]}));
    }

    #[test]
    fn one_commit_per_call() {
        let holder = Recorder::new(json!({"x": 0}));
        let updater = bind(holder.clone(), None);

        updater.set("x", 1i64).unwrap();
        updater.set("x", 2i64).unwrap();

        let assigned = holder.assigned();
        assert_eq!(assigned.len(), 2);
        assert_eq!(assigned[0], json!({"x": 1}));
        assert_eq!(assigned[1], json!({"x": 2}));
    }

    #[test]
    fn single_call_returns_top_level_subtree() {
        let holder = Recorder::new(json!({"x": {"y": 0}}));
        let updater = bind(holder, None);

        let view = updater.set("x.y", 1i64).unwrap();
        assert_eq!(view, json!({"y": 1}));

        let view = updater.push("list", 1i64).unwrap();
        assert_eq!(view, json!([1]));
    }

    #[test]
    fn multi_command_call_returns_full_state() {
        let holder = Recorder::new(json!({"x": {"y": 0}, "list": [0]}));
        let updater = bind(holder, None);

        let view = updater
            .invoke(&[
                Command::set(path!("x", "y"), 1i64),
                Command::push(path!("list"), 1i64),
            ])
            .unwrap();
        assert_eq!(view, json!({"x": {"y": 1}, "list": [0, 1]}));
    }

    #[test]
    fn multi_command_call_narrows_when_top_key_is_shared() {
        let holder = Recorder::new(json!({"x": {"y": 0}}));
        let updater = bind(holder, None);

        let view = updater
            .invoke(&[
                Command::set(path!("x", "y"), 1i64),
                Command::set(path!("x", "z"), 1i64),
            ])
            .unwrap();
        assert_eq!(view, json!({"y": 1, "z": 1}));
    }

    #[test]
    fn set_many_mapping_returns_full_state() {
        let holder = Recorder::new(json!({"x": {}, "list": [0]}));
        let updater = bind(holder, None);

        let view = updater
            .set_many([
                ("x.y", Value::from(1i64)),
                ("x.z", Value::from(1i64)),
                ("list", Value::from(1i64)),
            ])
            .unwrap();
        assert_eq!(view, json!({"x": {"y": 1, "z": 1}, "list": 1}));
    }

    #[test]
    fn invoke_json_accepts_tuple_and_list_shapes() {
        let holder = Recorder::new(json!({"x": {"y": 0}, "list": [0]}));
        let updater = bind(holder, None);

        let view = updater.invoke_json(&json!(["set", "x.y", 1])).unwrap();
        assert_eq!(view, json!({"y": 1}));

        let view = updater
            .invoke_json(&json!([["set", ["x", "z"], 2], ["push", "list", 1]]))
            .unwrap();
        assert_eq!(view, json!({"x": {"y": 1, "z": 2}, "list": [0, 1]}));
    }

    #[test]
    fn failed_command_keeps_partial_state_and_still_commits() {
        let holder = Recorder::new(json!({"x": 0, "n": 3}));
        let updater = bind(holder.clone(), None);

        let err = updater
            .invoke(&[
                Command::set(path!("x"), 1i64),
                Command::push(path!("n"), 1i64), // fails: n is a number
                Command::set(path!("x"), 9i64),
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            UpdateError::Patch(PatchError::NotASequence { .. })
        ));

        // first command survived, third never ran
        let state = updater.owner().state();
        assert_eq!(state, json!({"x": 1, "n": 3}));
        // the partial state was still committed exactly once
        let assigned = holder.assigned();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0], json!({"x": 1, "n": 3}));
    }

    #[test]
    fn bad_path_expression_fails_before_any_commit() {
        let holder = Recorder::new(json!({}));
        let updater = bind(holder.clone(), None);

        let err = updater.set("a[", 1i64).unwrap_err();
        assert_eq!(err, UpdateError::Path(PathError::UnmatchedBracket));
        assert!(holder.assigned().is_empty());
    }

    #[test]
    fn owners_are_independent() {
        let updater_a = bind(Recorder::new(json!({"n": 0})), None);
        let updater_b = bind(Recorder::new(json!({"n": 0})), None);

        updater_a.set("n", 1i64).unwrap();
        assert_eq!(updater_a.owner().state(), json!({"n": 1}));
        assert_eq!(updater_b.owner().state(), json!({"n": 0}));
        assert_ne!(updater_a.owner().id(), updater_b.owner().id());
    }

    #[test]
    fn committed_states_share_unrelated_branches() {
        let holder = Recorder::new(json!({"a": {"b": 0}, "keep": {"big": [1, 2, 3]}}));
        let updater = bind(holder.clone(), None);

        updater.set("a.b", 1i64).unwrap();
        updater.set("a.b", 2i64).unwrap();

        let assigned = holder.assigned();
        assert!(assigned[0]
            .get_key("keep")
            .unwrap()
            .ptr_eq(assigned[1].get_key("keep").unwrap()));
    }
}
