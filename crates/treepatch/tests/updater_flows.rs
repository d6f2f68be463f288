//! End-to-end flows through bind/updater/registry against a host holder.

use std::sync::{Arc, Mutex};

use serde_json::json;
use treepatch::{bind, path, registry, Command, StateHolder, Value};

/// Minimal host: a state cell plus an assignment counter standing in for the
/// host's update cycle.
#[derive(Clone)]
struct Host {
    inner: Arc<HostInner>,
}

struct HostInner {
    state: Mutex<Value>,
    assigns: Mutex<u32>,
}

impl Host {
    fn new(initial: serde_json::Value) -> Host {
        Host {
            inner: Arc::new(HostInner {
                state: Mutex::new(Value::from(initial)),
                assigns: Mutex::new(0),
            }),
        }
    }

    fn assigns(&self) -> u32 {
        *self.inner.assigns.lock().unwrap()
    }
}

impl StateHolder for Host {
    fn state(&self) -> Value {
        self.inner.state.lock().unwrap().clone()
    }

    fn assign(&self, state: Value) {
        *self.inner.state.lock().unwrap() = state;
        *self.inner.assigns.lock().unwrap() += 1;
    }
}

fn host() -> Host {
    Host::new(json!({"x": {"y": 0}, "list": [0]}))
}

#[test]
fn expression_and_key_array_paths_address_the_same_tree() {
    let host = host();
    let update = bind(host.clone(), None);

    update.set("x.y", 1i64).unwrap();
    update.set("list[0]", 1i64).unwrap();
    update.invoke(&[Command::set(path!("x", "z"), 2i64)]).unwrap();

    assert_eq!(host.state(), json!({"x": {"y": 1, "z": 2}, "list": [1]}));
}

#[test]
fn set_writes_root_and_nested_keys() {
    let host = host();
    let update = bind(host.clone(), None);

    update.set("a", 1i64).unwrap();
    update.invoke(&[Command::set(path!("x", "y"), 1i64)]).unwrap();

    let state = host.state();
    assert_eq!(state.get_key("a").unwrap().as_i64(), Some(1));
    assert_eq!(state.get_path(path!("x", "y").steps()).unwrap().as_i64(), Some(1));
}

#[test]
fn push_appends_to_the_list() {
    let host = host();
    let update = bind(host.clone(), None);

    update.push("list", 1i64).unwrap();

    assert_eq!(host.state().get_key("list").unwrap(), &json!([0, 1]));
}

#[test]
fn splice_from_zero_empties_the_list() {
    let host = host();
    let update = bind(host.clone(), None);

    update.splice("list", 0, None, vec![]).unwrap();

    assert_eq!(host.state().get_key("list").unwrap(), &json!([]));
}

#[test]
fn one_call_with_several_commands() {
    let host = host();
    let update = bind(host.clone(), None);

    update
        .invoke(&[
            Command::set(path!("x", "y"), 1i64),
            Command::push(path!("list"), 1i64),
        ])
        .unwrap();

    assert_eq!(host.state(), json!({"x": {"y": 1}, "list": [0, 1]}));
    assert_eq!(host.assigns(), 1);
}

#[test]
fn repeated_calls_accumulate_onto_one_state() {
    let host = host();
    let update = bind(host.clone(), None);

    update.invoke(&[Command::set(path!("x", "y"), 1i64)]).unwrap();
    update.invoke(&[Command::set(path!("x", "z"), 1i64)]).unwrap();
    update.push("list", 1i64).unwrap();
    update.push("list", 1i64).unwrap();

    assert_eq!(
        host.state(),
        json!({"x": {"y": 1, "z": 1}, "list": [0, 1, 1]})
    );
    assert_eq!(host.assigns(), 4);
}

#[test]
fn single_command_returns_the_top_level_subtree() {
    let update = bind(host(), None);

    let x = update.invoke(&[Command::set(path!("x", "y"), 1i64)]).unwrap();
    assert_eq!(x.get_key("y").unwrap().as_i64(), Some(1));
}

#[test]
fn multi_command_return_spans_all_targets() {
    let update = bind(host(), None);

    let result = update
        .invoke(&[
            Command::set(path!("x", "y"), 1i64),
            Command::push(path!("list"), 1i64),
        ])
        .unwrap();
    assert_eq!(result.get_path(path!("x", "y").steps()).unwrap().as_i64(), Some(1));
    assert_eq!(result.get_path(path!("list", 1).steps()).unwrap().as_i64(), Some(1));
}

#[test]
fn multi_command_return_narrows_to_a_shared_target() {
    let update = bind(host(), None);

    let x = update
        .invoke(&[
            Command::set(path!("x", "y"), 1i64),
            Command::set(path!("x", "z"), 1i64),
        ])
        .unwrap();
    assert_eq!(x.get_key("y").unwrap().as_i64(), Some(1));
    assert_eq!(x.get_key("z").unwrap().as_i64(), Some(1));
}

#[test]
fn returns_reflect_earlier_calls_on_the_same_target() {
    let update = bind(host(), None);

    update.invoke(&[Command::set(path!("x", "y"), 1i64)]).unwrap();
    let x = update.invoke(&[Command::set(path!("x", "z"), 1i64)]).unwrap();
    assert_eq!(x.get_key("y").unwrap().as_i64(), Some(1));
    assert_eq!(x.get_key("z").unwrap().as_i64(), Some(1));

    update.push("list", 1i64).unwrap();
    let list = update.push("list", 1i64).unwrap();
    assert_eq!(list.get_index(1).unwrap().as_i64(), Some(1));
    assert_eq!(list.get_index(2).unwrap().as_i64(), Some(1));
}

#[test]
fn set_with_a_mapping_patches_every_entry() {
    let update = bind(host(), None);

    let result = update
        .set_many([
            ("x.y", Value::from(1i64)),
            ("x.z", Value::from(1i64)),
            ("list", Value::from(1i64)),
        ])
        .unwrap();
    assert_eq!(result.get_path(path!("x", "y").steps()).unwrap().as_i64(), Some(1));
    assert_eq!(result.get_path(path!("x", "z").steps()).unwrap().as_i64(), Some(1));
    assert_eq!(result.get_key("list").unwrap().as_i64(), Some(1));
}

#[test]
fn registry_hands_back_the_bound_owner() {
    let host = host();
    let update = bind(host.clone(), Some("flows-parent"));

    let owner = registry::get("flows-parent").unwrap();
    assert_eq!(owner.id(), update.owner().id());

    // the handle observes patches made through the bound updater
    update.set("x.y", 7i64).unwrap();
    assert_eq!(
        owner.state().get_path(path!("x", "y").steps()).unwrap().as_i64(),
        Some(7)
    );
}

#[test]
fn registry_miss_is_an_error() {
    assert!(registry::get("flows-unbound").is_err());
}

#[test]
fn unrelated_branches_survive_a_patch_untouched() {
    // The host skips re-rendering children whose inputs are identical; that
    // only works if a patch leaves unrelated branches reference-equal.
    let host = Host::new(json!({"x": 0, "a": {"b": 1}}));
    let update = bind(host.clone(), None);

    let before = host.state();
    update.set("x", 1i64).unwrap();
    let after = host.state();

    assert!(before.get_key("a").unwrap().ptr_eq(after.get_key("a").unwrap()));
    assert_eq!(after.get_key("x").unwrap().as_i64(), Some(1));
}
