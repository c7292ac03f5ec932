//! Undo: `change.invert(base)` restores `base` when composed after
//! `base.compose(change)`.

use tracing::trace;

use super::Delta;
use crate::attributes;
use crate::embed::EmbedRegistry;
use crate::error::{DeltaError, Result};
use crate::op::{Embed, Insert, Op, Retain};

impl Delta {
    pub fn invert(&self, base: &Delta) -> Result<Delta> {
        self.invert_with(base, &EmbedRegistry::new())
    }

    /// `base` must be a document. Only the units this change consumes are
    /// read from it; inserts consume nothing.
    pub fn invert_with(&self, base: &Delta, embeds: &EmbedRegistry) -> Result<Delta> {
        trace!(ops = self.ops.len(), base = base.ops.len(), "invert");
        if !base.is_document() {
            return Err(DeltaError::BaseMismatch(
                "base must contain only inserts".into(),
            ));
        }
        let base_length = base.length();
        let mut inverted = Delta::new();
        let mut base_index = 0usize;

        for op in &self.ops {
            let consumed = if op.is_insert() { 0 } else { op.len() };
            let reach = base_index.saturating_add(consumed);
            if reach > base_length {
                return Err(DeltaError::BaseMismatch(format!(
                    "change reaches unit {reach} but base has {base_length}"
                )));
            }
            match op {
                Op::Insert { .. } => {
                    inverted.push(Op::Delete(op.len()));
                }
                Op::Retain {
                    retain: Retain::Len(n),
                    attributes: None,
                } => {
                    inverted.push(Op::retain(*n, None));
                }
                Op::Delete(n)
                | Op::Retain {
                    retain: Retain::Len(n),
                    ..
                } => {
                    for base_op in base.slice(base_index, base_index + n).into_ops() {
                        if op.is_delete() {
                            inverted.push(base_op);
                        } else {
                            inverted.push(Op::retain(
                                base_op.len(),
                                attributes::invert(op.attributes(), base_op.attributes()),
                            ));
                        }
                    }
                }
                Op::Retain {
                    retain: Retain::Embed(embed),
                    attributes,
                } => {
                    let slice = base.slice(base_index, base_index + 1);
                    let Some(Op::Insert {
                        insert: Insert::Embed(base_embed),
                        attributes: base_attributes,
                    }) = slice.ops.first()
                    else {
                        return Err(DeltaError::BaseMismatch(format!(
                            "embed \"{}\" retained at unit {base_index} over plain content",
                            embed.kind
                        )));
                    };
                    if base_embed.kind != embed.kind {
                        return Err(DeltaError::EmbedMismatch {
                            expected: embed.kind.clone(),
                            found: base_embed.kind.clone(),
                        });
                    }
                    let handler = embeds.handler(&embed.kind)?;
                    let data = handler.invert(&embed.data, &base_embed.data, embeds)?;
                    inverted.push(Op::Retain {
                        retain: Retain::Embed(Embed::new(embed.kind.clone(), data)),
                        attributes: attributes::invert(
                            attributes.as_ref(),
                            base_attributes.as_ref(),
                        ),
                    });
                }
            }
            base_index += consumed;
        }
        Ok(inverted.chop())
    }
}
