//! Sequential composition: `a.compose(b)` is the single change with the
//! effect of applying `a` and then `b`.

use tracing::trace;

use super::Delta;
use crate::attributes;
use crate::embed::EmbedRegistry;
use crate::error::{DeltaError, Result};
use crate::iterator::{OpIterator, INFINITY};
use crate::op::{Embed, Insert, Op, OpKind, Retain};

impl Delta {
    /// Compose with no embed handlers; fails if two embeds meet.
    pub fn compose(&self, other: &Delta) -> Result<Delta> {
        self.compose_with(other, &EmbedRegistry::new())
    }

    pub fn compose_with(&self, other: &Delta, embeds: &EmbedRegistry) -> Result<Delta> {
        trace!(left = self.ops.len(), right = other.ops.len(), "compose");
        let mut this_iter = OpIterator::new(&self.ops);
        let mut other_iter = OpIterator::new(&other.ops);
        let mut delta = Delta::new();

        // A leading plain retain in `other` passes whole inserts of `self`
        // through untouched.
        if let Some(Op::Retain {
            retain: Retain::Len(first),
            attributes: None,
        }) = other_iter.peek()
        {
            let mut first_left = *first;
            while this_iter.peek_kind() == OpKind::Insert && this_iter.peek_length() <= first_left
            {
                first_left -= this_iter.peek_length();
                delta.ops.push(this_iter.next(INFINITY));
            }
            if *first > first_left {
                other_iter.next(first - first_left);
            }
        }

        while this_iter.has_next() || other_iter.has_next() {
            if other_iter.peek_kind() == OpKind::Insert {
                delta.push(other_iter.next(INFINITY));
                continue;
            }
            if this_iter.peek_kind() == OpKind::Delete {
                delta.push(this_iter.next(INFINITY));
                continue;
            }

            let length = this_iter.peek_length().min(other_iter.peek_length());
            let this_op = this_iter.next(length);
            let other_op = other_iter.next(length);
            match other_op {
                Op::Retain {
                    retain: other_retain,
                    attributes: other_attributes,
                } => {
                    // Removal markers only survive while the result is still a retain.
                    let keep_null = this_op.is_retain();
                    let attributes = attributes::compose(
                        this_op.attributes(),
                        other_attributes.as_ref(),
                        keep_null,
                    );
                    let new_op = match this_op {
                        Op::Retain {
                            retain: Retain::Embed(embed),
                            ..
                        } => {
                            let retain = match other_retain {
                                Retain::Len(_) => Retain::Embed(embed),
                                Retain::Embed(other_embed) => Retain::Embed(compose_embed(
                                    &embed,
                                    &other_embed,
                                    true,
                                    embeds,
                                )?),
                            };
                            Op::Retain { retain, attributes }
                        }
                        Op::Retain { .. } => {
                            let retain = match other_retain {
                                Retain::Len(_) => Retain::Len(length),
                                embed => embed,
                            };
                            Op::Retain { retain, attributes }
                        }
                        Op::Insert { insert, .. } => {
                            let insert = match (insert, other_retain) {
                                (insert, Retain::Len(_)) => insert,
                                (Insert::Embed(embed), Retain::Embed(other_embed)) => {
                                    Insert::Embed(compose_embed(
                                        &embed,
                                        &other_embed,
                                        false,
                                        embeds,
                                    )?)
                                }
                                (Insert::Text(_), Retain::Embed(other_embed)) => {
                                    return Err(DeltaError::EmbedMismatch {
                                        expected: other_embed.kind,
                                        found: "text".into(),
                                    });
                                }
                            };
                            Op::Insert { insert, attributes }
                        }
                        // Deletes from `self` were flushed above.
                        Op::Delete(n) => Op::Delete(n),
                    };
                    delta.push(new_op.clone());

                    // Once `other` is exhausted the rest of `self` is copied as is.
                    if !other_iter.has_next() && delta.ops.last() == Some(&new_op) {
                        let rest = Delta {
                            ops: this_iter.rest(),
                        };
                        return Ok(delta.concat(&rest).chop());
                    }
                }
                Op::Delete(_) if this_op.is_retain() => {
                    delta.push(other_op);
                }
                // An insert followed by a delete of the same units cancels out.
                _ => {}
            }
        }
        Ok(delta.chop())
    }

    /// Apply this change to `document`. Unlike `compose`, the change must
    /// fit: it may consume at most `document.length()` units.
    pub fn apply(&self, document: &Delta) -> Result<Delta> {
        self.apply_with(document, &EmbedRegistry::new())
    }

    pub fn apply_with(&self, document: &Delta, embeds: &EmbedRegistry) -> Result<Delta> {
        if !document.is_document() {
            return Err(DeltaError::NotADocument("apply() called with non-document"));
        }
        let expected = document.length();
        let actual = self.base_length();
        if actual > expected {
            return Err(DeltaError::LengthMismatch { expected, actual });
        }
        document.compose_with(self, embeds)
    }
}

fn compose_embed(
    left: &Embed,
    right: &Embed,
    keep_null: bool,
    embeds: &EmbedRegistry,
) -> Result<Embed> {
    if left.kind != right.kind {
        return Err(DeltaError::EmbedMismatch {
            expected: left.kind.clone(),
            found: right.kind.clone(),
        });
    }
    let handler = embeds.handler(&left.kind)?;
    let data = handler.compose(&left.data, &right.data, keep_null, embeds)?;
    Ok(Embed::new(left.kind.clone(), data))
}
