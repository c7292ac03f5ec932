//! Document diff: the change turning one document into another.

use tracing::trace;

use super::Delta;
use crate::attributes;
use crate::diff::{self, EditKind};
use crate::error::{DeltaError, Result};
use crate::iterator::OpIterator;
use crate::op::{Insert, Op};

/// A single document unit as seen by the sequence diff. Every embed
/// compares equal here; aligned embeds are told apart afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Char(char),
    Embed,
}

fn units(delta: &Delta) -> Result<Vec<Unit>> {
    let mut units = Vec::with_capacity(delta.length());
    for op in &delta.ops {
        match op {
            Op::Insert {
                insert: Insert::Text(text),
                ..
            } => units.extend(text.chars().map(Unit::Char)),
            Op::Insert {
                insert: Insert::Embed(_),
                ..
            } => units.push(Unit::Embed),
            _ => return Err(DeltaError::NotADocument("diff() called with non-document")),
        }
    }
    Ok(units)
}

impl Delta {
    /// Both sides must be documents. `self.compose(&self.diff(other)?)`
    /// equals `other`.
    pub fn diff(&self, other: &Delta) -> Result<Delta> {
        trace!(left = self.ops.len(), right = other.ops.len(), "diff");
        let src = units(self)?;
        let dst = units(other)?;
        if self == other {
            return Ok(Delta::new());
        }

        let mut this_iter = OpIterator::new(&self.ops);
        let mut other_iter = OpIterator::new(&other.ops);
        let mut delta = Delta::new();
        for (kind, mut length) in diff::diff(&src, &dst) {
            while length > 0 {
                let op_length = match kind {
                    EditKind::Insert => {
                        let op_length = other_iter.peek_length().min(length);
                        delta.push(other_iter.next(op_length));
                        op_length
                    }
                    EditKind::Delete => {
                        let op_length = this_iter.peek_length().min(length);
                        this_iter.next(op_length);
                        delta.push(Op::Delete(op_length));
                        op_length
                    }
                    EditKind::Equal => {
                        let op_length = this_iter
                            .peek_length()
                            .min(other_iter.peek_length())
                            .min(length);
                        let this_op = this_iter.next(op_length);
                        let other_op = other_iter.next(op_length);
                        match (&this_op, &other_op) {
                            (
                                Op::Insert { insert: a, .. },
                                Op::Insert { insert: b, .. },
                            ) if a == b => {
                                delta.push(Op::retain(
                                    op_length,
                                    attributes::diff(this_op.attributes(), other_op.attributes()),
                                ));
                            }
                            _ => {
                                delta.push(other_op);
                                delta.push(Op::Delete(op_length));
                            }
                        }
                        op_length
                    }
                };
                length -= op_length;
            }
        }
        Ok(delta.chop())
    }
}
