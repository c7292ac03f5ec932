//! Concurrent reconciliation.
//!
//! `a.transform(b, priority)` rewrites `b`, which was made against the same
//! document as `a`, so that it can be applied after `a`. With `priority`
//! set, `a` is treated as having happened first: its inserts win ties and
//! its attribute choices win conflicts. Then
//! `a.compose(a.transform(b, true)) == b.compose(b.transform(a, false))`.

use tracing::{debug, trace};

use super::Delta;
use crate::attributes;
use crate::embed::EmbedRegistry;
use crate::error::{DeltaError, Result};
use crate::iterator::{OpIterator, INFINITY};
use crate::op::{Embed, Op, OpKind, Retain};

impl Delta {
    pub fn transform(&self, other: &Delta, priority: bool) -> Result<Delta> {
        self.transform_with(other, priority, &EmbedRegistry::new())
    }

    pub fn transform_with(
        &self,
        other: &Delta,
        priority: bool,
        embeds: &EmbedRegistry,
    ) -> Result<Delta> {
        trace!(left = self.ops.len(), right = other.ops.len(), priority, "transform");
        let mut this_iter = OpIterator::new(&self.ops);
        let mut other_iter = OpIterator::new(&other.ops);
        let mut delta = Delta::new();

        while this_iter.has_next() || other_iter.has_next() {
            if this_iter.peek_kind() == OpKind::Insert
                && (priority || other_iter.peek_kind() != OpKind::Insert)
            {
                let skipped = this_iter.next(INFINITY).len();
                delta.push(Op::retain(skipped, None));
                continue;
            }
            if other_iter.peek_kind() == OpKind::Insert {
                delta.push(other_iter.next(INFINITY));
                continue;
            }

            let length = this_iter.peek_length().min(other_iter.peek_length());
            let this_op = this_iter.next(length);
            let other_op = other_iter.next(length);
            if this_op.is_delete() {
                // Already gone; whatever `other` did to these units is moot.
                continue;
            }
            if other_op.is_delete() {
                delta.push(other_op);
                continue;
            }

            let attributes =
                attributes::transform(this_op.attributes(), other_op.attributes(), priority);
            let retain = match (&this_op, &other_op) {
                (
                    Op::Retain {
                        retain: Retain::Embed(this_embed),
                        ..
                    },
                    Op::Retain {
                        retain: Retain::Embed(other_embed),
                        ..
                    },
                ) if this_embed.kind == other_embed.kind => Retain::Embed(transform_embed(
                    this_embed,
                    other_embed,
                    priority,
                    embeds,
                )?),
                (
                    _,
                    Op::Retain {
                        retain: Retain::Embed(other_embed),
                        ..
                    },
                ) => Retain::Embed(other_embed.clone()),
                _ => Retain::Len(length),
            };
            delta.push(Op::Retain { retain, attributes });
        }
        Ok(delta.chop())
    }

    /// Like `transform`, but first checks that both changes fit `base`,
    /// the document they were made against.
    pub fn transform_on(&self, base: &Delta, other: &Delta, priority: bool) -> Result<Delta> {
        self.transform_on_with(base, other, priority, &EmbedRegistry::new())
    }

    pub fn transform_on_with(
        &self,
        base: &Delta,
        other: &Delta,
        priority: bool,
        embeds: &EmbedRegistry,
    ) -> Result<Delta> {
        if !base.is_document() {
            return Err(DeltaError::NotADocument(
                "transform_on() called with non-document base",
            ));
        }
        let expected = base.length();
        for change in [self, other] {
            let actual = change.base_length();
            if actual > expected {
                return Err(DeltaError::LengthMismatch { expected, actual });
            }
        }
        self.transform_with(other, priority, embeds)
    }
}

fn transform_embed(
    this_embed: &Embed,
    other_embed: &Embed,
    priority: bool,
    embeds: &EmbedRegistry,
) -> Result<Embed> {
    let Some(handler) = embeds.get(&this_embed.kind) else {
        debug!(kind = %this_embed.kind, "no embed handler; keeping sub-change unchanged");
        return Ok(other_embed.clone());
    };
    let data = handler.transform(&this_embed.data, &other_embed.data, priority, embeds)?;
    Ok(Embed::new(this_embed.kind.clone(), data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use serde_json::{json, Value};

    fn attrs(v: Value) -> AttributeMap {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn insert_against_insert() {
        let a1 = Delta::new().insert("A");
        let b1 = Delta::new().insert("B");
        let a2 = a1.clone();
        let b2 = b1.clone();
        assert_eq!(
            a1.transform(&b1, true).unwrap(),
            Delta::new().retain(1).insert("B")
        );
        assert_eq!(a2.transform(&b2, false).unwrap(), Delta::new().insert("B"));
    }

    #[test]
    fn insert_against_retain() {
        let a = Delta::new().insert("A");
        let b = Delta::new().retain_with(1, attrs(json!({"bold": true, "color": "red"})));
        assert_eq!(
            a.transform(&b, true).unwrap(),
            Delta::new()
                .retain(1)
                .retain_with(1, attrs(json!({"bold": true, "color": "red"})))
        );
    }

    #[test]
    fn insert_against_delete() {
        let a = Delta::new().insert("A");
        let b = Delta::new().delete(1);
        assert_eq!(
            a.transform(&b, true).unwrap(),
            Delta::new().retain(1).delete(1)
        );
    }

    #[test]
    fn delete_against_insert() {
        let a = Delta::new().delete(1);
        let b = Delta::new().insert("B");
        assert_eq!(a.transform(&b, true).unwrap(), Delta::new().insert("B"));
    }

    #[test]
    fn delete_against_retain_and_delete() {
        let a = Delta::new().delete(1);
        let retain = Delta::new().retain_with(1, attrs(json!({"bold": true})));
        let delete = Delta::new().delete(1);
        assert_eq!(a.transform(&retain, true).unwrap(), Delta::new());
        assert_eq!(a.transform(&delete, true).unwrap(), Delta::new());
    }

    #[test]
    fn retain_against_insert() {
        let a = Delta::new().retain_with(1, attrs(json!({"color": "blue"})));
        let b = Delta::new().insert("B");
        assert_eq!(a.transform(&b, true).unwrap(), Delta::new().insert("B"));
    }

    #[test]
    fn retain_against_retain() {
        let a1 = Delta::new().retain_with(1, attrs(json!({"color": "blue"})));
        let b1 = Delta::new().retain_with(1, attrs(json!({"bold": true, "color": "red"})));
        assert_eq!(
            a1.transform(&b1, true).unwrap(),
            Delta::new().retain_with(1, attrs(json!({"bold": true})))
        );
        assert_eq!(b1.transform(&a1, true).unwrap(), Delta::new());
    }

    #[test]
    fn retain_against_retain_without_priority() {
        let a = Delta::new().retain_with(1, attrs(json!({"color": "blue"})));
        let b = Delta::new().retain_with(1, attrs(json!({"bold": true, "color": "red"})));
        assert_eq!(
            a.transform(&b, false).unwrap(),
            Delta::new().retain_with(1, attrs(json!({"bold": true, "color": "red"})))
        );
        assert_eq!(
            b.transform(&a, false).unwrap(),
            Delta::new().retain_with(1, attrs(json!({"color": "blue"})))
        );
    }

    #[test]
    fn alternating_edits() {
        let a1 = Delta::new().retain(2).insert("si").delete(5);
        let b1 = Delta::new().retain(1).insert("e").delete(5).retain(1).insert("ow");
        let a2 = a1.clone();
        let b2 = b1.clone();
        assert_eq!(
            a1.transform(&b1, false).unwrap(),
            Delta::new().retain(1).insert("e").delete(1).retain(2).insert("ow")
        );
        assert_eq!(
            b2.transform(&a2, false).unwrap(),
            Delta::new().retain(2).insert("si").delete(1)
        );
    }

    #[test]
    fn conflicting_appends() {
        let a1 = Delta::new().retain(3).insert("aa");
        let b1 = Delta::new().retain(3).insert("bb");
        let a2 = a1.clone();
        let b2 = b1.clone();
        assert_eq!(
            a1.transform(&b1, true).unwrap(),
            Delta::new().retain(5).insert("bb")
        );
        assert_eq!(
            b2.transform(&a2, false).unwrap(),
            Delta::new().retain(3).insert("aa")
        );
    }

    #[test]
    fn prepend_and_append() {
        let a1 = Delta::new().insert("aa");
        let b1 = Delta::new().retain(3).insert("bb");
        let expected1 = Delta::new().retain(5).insert("bb");
        let a2 = a1.clone();
        let b2 = b1.clone();
        let expected2 = Delta::new().insert("aa");
        assert_eq!(a1.transform(&b1, false).unwrap(), expected1);
        assert_eq!(b2.transform(&a2, false).unwrap(), expected2);
    }

    #[test]
    fn trailing_deletes_with_differing_lengths() {
        let a1 = Delta::new().retain(2).delete(1);
        let b1 = Delta::new().delete(3);
        let expected1 = Delta::new().delete(2);
        let a2 = a1.clone();
        let b2 = b1.clone();
        let expected2 = Delta::new();
        assert_eq!(a1.transform(&b1, false).unwrap(), expected1);
        assert_eq!(b2.transform(&a2, false).unwrap(), expected2);
    }

    #[test]
    fn transform_on_checks_both_sides_against_base() {
        let base = Delta::new().insert("abc");
        let a = Delta::new().retain(3).insert("x");
        let b = Delta::new().retain(1).delete(2);
        assert_eq!(
            a.transform_on(&base, &b, true).unwrap(),
            a.transform(&b, true).unwrap()
        );

        let too_long = Delta::new().retain(2).delete(2);
        assert_eq!(
            a.transform_on(&base, &too_long, true),
            Err(DeltaError::LengthMismatch {
                expected: 3,
                actual: 4
            })
        );
        assert_eq!(
            too_long.transform_on(&base, &a, false),
            Err(DeltaError::LengthMismatch {
                expected: 3,
                actual: 4
            })
        );
        assert!(matches!(
            a.transform_on(&Delta::new().retain(3), &b, true),
            Err(DeltaError::NotADocument(_))
        ));
    }

    #[test]
    fn embed_without_handler_keeps_other_sub_change() {
        let a = Delta::new().retain(Embed::new("delta", json!([{"insert": "a"}])));
        let b = Delta::new().retain(Embed::new("delta", json!([{"insert": "b"}])));
        assert_eq!(a.transform(&b, true).unwrap(), b);
    }

    #[test]
    fn embed_with_nested_handler() {
        let mut registry = EmbedRegistry::new();
        registry.register("delta", crate::embed::NestedDelta);
        let a = Delta::new().retain(Embed::new("delta", json!([{"insert": "a"}])));
        let b = Delta::new().retain(Embed::new("delta", json!([{"insert": "b"}])));
        assert_eq!(
            a.transform_with(&b, true, &registry).unwrap(),
            Delta::new().retain(Embed::new("delta", json!([{"retain": 1}, {"insert": "b"}])))
        );
        assert_eq!(
            a.transform_with(&b, false, &registry).unwrap(),
            Delta::new().retain(Embed::new("delta", json!([{"insert": "b"}])))
        );
    }

    #[test]
    fn plain_retain_against_embed_retain() {
        let a = Delta::new().retain_with(1, attrs(json!({"bold": true})));
        let b = Delta::new().retain(Embed::new("delta", json!([{"insert": "b"}])));
        assert_eq!(a.transform(&b, true).unwrap(), b);
    }
}
