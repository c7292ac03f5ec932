//! Attribute map algebra.
//!
//! Attributes are a flat `name -> value` map attached to inserts and retains.
//! `Value::Null` is the removal marker: inside a retain it means "unset this
//! attribute", and it never survives into a document built from inserts.
//!
//! Every function takes and returns `Option<&AttributeMap>`; an empty map is
//! always reported as `None` so that "no attributes" has a single
//! representation.

use serde_json::{Map, Value};

pub type AttributeMap = Map<String, Value>;

fn non_empty(attributes: AttributeMap) -> Option<AttributeMap> {
    if attributes.is_empty() {
        None
    } else {
        Some(attributes)
    }
}

/// Collapse `Some(empty)` into `None`.
pub fn normalize(attributes: Option<AttributeMap>) -> Option<AttributeMap> {
    attributes.and_then(non_empty)
}

/// Apply `b` on top of `a`.
///
/// With `keep_null` unset, removal markers in `b` are resolved: the key is
/// dropped from the result. With `keep_null` set they are carried so that a
/// later composition still knows the key was cleared.
pub fn compose(
    a: Option<&AttributeMap>,
    b: Option<&AttributeMap>,
    keep_null: bool,
) -> Option<AttributeMap> {
    let mut attributes = AttributeMap::new();
    if let Some(b) = b {
        for (key, value) in b {
            if keep_null || !value.is_null() {
                attributes.insert(key.clone(), value.clone());
            }
        }
    }
    if let Some(a) = a {
        for (key, value) in a {
            if !b.is_some_and(|b| b.contains_key(key)) {
                attributes.insert(key.clone(), value.clone());
            }
        }
    }
    non_empty(attributes)
}

/// The attribute change that turns `a` into `b`.
pub fn diff(a: Option<&AttributeMap>, b: Option<&AttributeMap>) -> Option<AttributeMap> {
    let empty = AttributeMap::new();
    let a = a.unwrap_or(&empty);
    let b = b.unwrap_or(&empty);
    let mut attributes = AttributeMap::new();
    for key in a.keys().chain(b.keys()) {
        if attributes.contains_key(key) || a.get(key) == b.get(key) {
            continue;
        }
        attributes.insert(key.clone(), b.get(key).cloned().unwrap_or(Value::Null));
    }
    non_empty(attributes)
}

/// The attribute change that undoes `attributes` when they were applied
/// over content formatted with `base`.
pub fn invert(
    attributes: Option<&AttributeMap>,
    base: Option<&AttributeMap>,
) -> Option<AttributeMap> {
    let empty = AttributeMap::new();
    let attributes = attributes.unwrap_or(&empty);
    let base = base.unwrap_or(&empty);
    let mut inverted = AttributeMap::new();
    for (key, base_value) in base {
        if attributes.get(key).is_some_and(|value| value != base_value) {
            inverted.insert(key.clone(), base_value.clone());
        }
    }
    for key in attributes.keys() {
        if !base.contains_key(key) {
            inverted.insert(key.clone(), Value::Null);
        }
    }
    non_empty(inverted)
}

/// Rewrite `b` so it can be applied after the concurrent `a`.
///
/// When `priority` is set, `a` is considered to have happened first and
/// wins every key both sides touch.
pub fn transform(
    a: Option<&AttributeMap>,
    b: Option<&AttributeMap>,
    priority: bool,
) -> Option<AttributeMap> {
    let Some(a) = a else {
        return b.cloned();
    };
    let b = b?;
    if !priority {
        return Some(b.clone());
    }
    let attributes = b
        .iter()
        .filter(|(key, _)| !a.contains_key(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    non_empty(attributes)
}
