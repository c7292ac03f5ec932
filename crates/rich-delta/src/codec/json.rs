//! JSON codec for changes.
//!
//! A change is an array of records, each exactly one of:
//! - `{"insert": "text" | {kind: data}, "attributes"?: {...}}`
//! - `{"delete": n}`
//! - `{"retain": n | {kind: data}, "attributes"?: {...}}`
//!
//! `{"ops": [...]}` is accepted on input as well. Decoding goes through the
//! canonicalizing builder, so adjacent mergeable records come out merged.

use serde_json::{Map, Value};

use crate::attributes::AttributeMap;
use crate::delta::Delta;
use crate::error::{DeltaError, Result};
use crate::iterator::INFINITY;
use crate::op::{Embed, Insert, Op, Retain};

fn malformed(msg: impl Into<String>) -> DeltaError {
    DeltaError::MalformedOp(msg.into())
}

// ── Encoding ──────────────────────────────────────────────────────────────

pub fn embed_to_json(embed: &Embed) -> Value {
    let mut m = Map::new();
    m.insert(embed.kind.clone(), embed.data.clone());
    Value::Object(m)
}

/// Serialize one operation to its wire record.
pub fn op_to_json(op: &Op) -> Value {
    let mut m = Map::new();
    match op {
        Op::Insert { insert, attributes } => {
            let insert = match insert {
                Insert::Text(text) => Value::String(text.clone()),
                Insert::Embed(embed) => embed_to_json(embed),
            };
            m.insert("insert".into(), insert);
            if let Some(attributes) = attributes {
                m.insert("attributes".into(), Value::Object(attributes.clone()));
            }
        }
        Op::Delete(n) => {
            m.insert("delete".into(), Value::from(*n));
        }
        Op::Retain { retain, attributes } => {
            let retain = match retain {
                Retain::Len(n) => Value::from(*n),
                Retain::Embed(embed) => embed_to_json(embed),
            };
            m.insert("retain".into(), retain);
            if let Some(attributes) = attributes {
                m.insert("attributes".into(), Value::Object(attributes.clone()));
            }
        }
    }
    Value::Object(m)
}

/// Serialize a change to a JSON array of records.
pub fn to_json(delta: &Delta) -> Value {
    Value::Array(delta.ops().iter().map(op_to_json).collect())
}

// ── Decoding ──────────────────────────────────────────────────────────────

/// Parse a `{kind: data}` object with exactly one key.
pub fn embed_from_json(v: &Value) -> Result<Embed> {
    let obj = v
        .as_object()
        .ok_or_else(|| malformed("embed must be an object"))?;
    let mut entries = obj.iter();
    match (entries.next(), entries.next()) {
        (Some((kind, data)), None) => Ok(Embed::new(kind.clone(), data.clone())),
        _ => Err(malformed(format!(
            "embed must have exactly one key, found {}",
            obj.len()
        ))),
    }
}

fn decode_length(v: &Value, field: &str) -> Result<usize> {
    let n = v
        .as_u64()
        .ok_or_else(|| malformed(format!("{field} must be a positive integer")))?;
    if n == 0 {
        return Err(malformed(format!("{field} must be a positive integer")));
    }
    match usize::try_from(n) {
        Ok(n) if n < INFINITY => Ok(n),
        _ => Err(malformed(format!("{field} is out of range"))),
    }
}

fn decode_attributes(obj: &Map<String, Value>) -> Result<Option<AttributeMap>> {
    match obj.get("attributes") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(m)) if m.is_empty() => Ok(None),
        Some(Value::Object(m)) => Ok(Some(m.clone())),
        Some(_) => Err(malformed("attributes must be an object")),
    }
}

/// Parse one wire record.
pub fn op_from_json(v: &Value) -> Result<Op> {
    let obj = v
        .as_object()
        .ok_or_else(|| malformed("operation must be an object"))?;
    let kinds = ["insert", "delete", "retain"]
        .iter()
        .filter(|k| obj.contains_key(**k))
        .count();
    if kinds != 1 {
        return Err(malformed(
            "operation must have exactly one of insert, delete, retain",
        ));
    }
    if let Some(insert) = obj.get("insert") {
        let insert = match insert {
            Value::String(text) if text.is_empty() => {
                return Err(malformed("insert must not be empty"));
            }
            Value::String(text) => Insert::Text(text.clone()),
            Value::Object(_) => Insert::Embed(embed_from_json(insert)?),
            _ => return Err(malformed("insert must be a string or an embed")),
        };
        return Ok(Op::Insert {
            insert,
            attributes: decode_attributes(obj)?,
        });
    }
    if let Some(delete) = obj.get("delete") {
        if obj.contains_key("attributes") {
            return Err(malformed("delete cannot carry attributes"));
        }
        return Ok(Op::Delete(decode_length(delete, "delete")?));
    }
    let retain = &obj["retain"];
    let retain = match retain {
        Value::Object(_) => Retain::Embed(embed_from_json(retain)?),
        _ => Retain::Len(decode_length(retain, "retain")?),
    };
    Ok(Op::Retain {
        retain,
        attributes: decode_attributes(obj)?,
    })
}

/// Parse a change from an array of records or an `{"ops": [...]}` object.
pub fn from_json(v: &Value) -> Result<Delta> {
    let records = match v {
        Value::Array(records) => records,
        Value::Object(obj) => obj
            .get("ops")
            .and_then(Value::as_array)
            .ok_or_else(|| malformed("expected an \"ops\" array"))?,
        _ => return Err(malformed("change must be an array of operations")),
    };
    let mut delta = Delta::new();
    for record in records {
        delta.push(op_from_json(record)?);
    }
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_all_kinds() {
        let delta = Delta::new()
            .insert_with("a", json!({"bold": true}).as_object().cloned().unwrap())
            .insert(Embed::new("image", json!("x.png")))
            .retain(2)
            .retain(Embed::new("delta", json!([{"insert": "b"}])))
            .delete(3);
        assert_eq!(
            to_json(&delta),
            json!([
                {"insert": "a", "attributes": {"bold": true}},
                {"insert": {"image": "x.png"}},
                {"retain": 2},
                {"retain": {"delta": [{"insert": "b"}]}},
                {"delete": 3}
            ])
        );
    }

    #[test]
    fn decodes_and_canonicalizes() {
        let delta = from_json(&json!([
            {"insert": "ab"},
            {"insert": "c", "attributes": {}},
            {"delete": 1},
            {"insert": "d"},
            {"retain": 1, "attributes": null}
        ]))
        .unwrap();
        assert_eq!(delta, Delta::new().insert("abcd").delete(1).retain(1));
    }

    #[test]
    fn decodes_ops_wrapper() {
        let delta = from_json(&json!({"ops": [{"retain": 1}, {"delete": 2}]})).unwrap();
        assert_eq!(delta, Delta::new().retain(1).delete(2));
    }

    #[test]
    fn rejects_malformed_records() {
        let cases = [
            json!([{"delete": 0}]),
            json!([{"delete": -1}]),
            json!([{"retain": 1.5}]),
            json!([{"insert": ""}]),
            json!([{"insert": 3}]),
            json!([{"insert": {}}]),
            json!([{"insert": {"a": 1, "b": 2}}]),
            json!([{"insert": "a", "delete": 1}]),
            json!([{"delete": 1, "attributes": {"bold": true}}]),
            json!([{"retain": 1, "attributes": [1]}]),
            json!([{}]),
            json!([1]),
            json!("abc"),
        ];
        for case in cases {
            assert!(
                matches!(from_json(&case), Err(DeltaError::MalformedOp(_))),
                "expected malformed: {case}"
            );
        }
    }

    #[test]
    fn rejects_lengths_at_the_iterator_sentinel() {
        assert!(matches!(
            from_json(&json!([{"retain": u64::MAX}, {"retain": 1}])),
            Err(DeltaError::MalformedOp(_))
        ));
        assert!(matches!(
            from_json(&json!([{"delete": u64::MAX}])),
            Err(DeltaError::MalformedOp(_))
        ));

        let big = (INFINITY - 1) as u64;
        let delta = from_json(&json!([{"retain": big}, {"retain": 1}])).unwrap();
        assert_eq!(
            delta.into_ops(),
            vec![Op::retain(INFINITY - 1, None), Op::retain(1, None)]
        );
    }
}
