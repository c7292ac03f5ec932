//! `Delta`: an ordered sequence of operations describing a change, or a
//! whole document when it holds only inserts.
//!
//! Every append goes through [`Delta::push`], which keeps the sequence in
//! canonical form:
//! - zero-length operations are dropped;
//! - adjacent deletes merge, as do adjacent text inserts and adjacent
//!   numeric retains with equal attributes;
//! - an insert appended right after a delete is placed before it.
//!
//! The algebra lives in submodules: [`compose`](Delta::compose),
//! [`transform`](Delta::transform), [`invert`](Delta::invert) and
//! [`diff`](Delta::diff).

mod compose;
mod diff;
mod invert;
mod transform;

use std::fmt;

use serde_json::Value;

use crate::attributes::{self, AttributeMap};
use crate::codec;
use crate::error::Result;
use crate::iterator::{OpIterator, INFINITY};
use crate::op::{Insert, Op, Retain};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    ops: Vec<Op>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a change by pushing each operation in turn.
    pub fn from_ops(ops: impl IntoIterator<Item = Op>) -> Self {
        let mut delta = Self::new();
        for op in ops {
            delta.push(op);
        }
        delta
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    // ── Builder ───────────────────────────────────────────────────────────

    pub fn insert(mut self, content: impl Into<Insert>) -> Self {
        self.push(Op::insert(content, None));
        self
    }

    pub fn insert_with(mut self, content: impl Into<Insert>, attributes: AttributeMap) -> Self {
        self.push(Op::insert(content, Some(attributes)));
        self
    }

    pub fn delete(mut self, length: usize) -> Self {
        self.push(Op::Delete(length));
        self
    }

    pub fn retain(mut self, retain: impl Into<Retain>) -> Self {
        self.push(Op::retain(retain, None));
        self
    }

    pub fn retain_with(mut self, retain: impl Into<Retain>, attributes: AttributeMap) -> Self {
        self.push(Op::retain(retain, Some(attributes)));
        self
    }

    /// Append `op`, merging it into the tail where canonical form allows.
    pub fn push(&mut self, op: Op) -> &mut Self {
        if op.is_empty() {
            return self;
        }
        let op = match op {
            Op::Insert { insert, attributes } => Op::Insert {
                insert,
                attributes: attributes::normalize(attributes),
            },
            Op::Retain { retain, attributes } => Op::Retain {
                retain,
                attributes: attributes::normalize(attributes),
            },
            Op::Delete(n) => Op::Delete(n),
        };

        let mut index = self.ops.len();
        if let (Some(Op::Delete(last)), Op::Delete(n)) = (self.ops.last_mut(), &op) {
            if let Some(sum) = merged_length(*last, *n) {
                *last = sum;
                return self;
            }
        }
        if op.is_insert() && self.ops.last().is_some_and(Op::is_delete) {
            // Insert and delete at the same point commute; inserts go first.
            index -= 1;
        }
        if index == 0 {
            self.ops.insert(0, op);
            return self;
        }
        if merge_into(&mut self.ops[index - 1], &op) {
            return self;
        }
        self.ops.insert(index, op);
        self
    }

    /// Drop a trailing retain that neither formats nor carries an embed.
    pub fn chop(mut self) -> Self {
        if self.ops.last().is_some_and(Op::is_plain_retain) {
            self.ops.pop();
        }
        self
    }

    // ── Lengths ───────────────────────────────────────────────────────────

    /// Units produced: inserts plus retains. Saturates at `usize::MAX`.
    pub fn length(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| !op.is_delete())
            .map(Op::len)
            .fold(0, usize::saturating_add)
    }

    /// Units consumed from the prior document: retains plus deletes.
    /// Saturates at `usize::MAX`.
    pub fn base_length(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| !op.is_insert())
            .map(Op::len)
            .fold(0, usize::saturating_add)
    }

    /// Net growth of the document: inserts minus deletes.
    pub fn change_length(&self) -> i64 {
        let signed = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        self.ops
            .iter()
            .map(|op| match op {
                Op::Insert { .. } => signed(op.len()),
                Op::Delete(n) => -signed(*n),
                Op::Retain { .. } => 0,
            })
            .fold(0, i64::saturating_add)
    }

    /// Whether this change is a whole document (only inserts).
    pub fn is_document(&self) -> bool {
        self.ops.iter().all(Op::is_insert)
    }

    // ── Slicing ───────────────────────────────────────────────────────────

    /// Operations covering units `[start, end)`, where inserts, retains and
    /// deletes all count toward the position.
    pub fn slice(&self, start: usize, end: usize) -> Delta {
        let mut ops = Vec::new();
        let mut iter = OpIterator::new(&self.ops);
        let mut index = 0;
        while index < end && iter.has_next() {
            let next = if index < start {
                iter.next(start - index)
            } else {
                let next = iter.next(end - index);
                ops.push(next.clone());
                next
            };
            index += next.len();
        }
        Delta { ops }
    }

    /// `self` followed by `other`; only the seam is merge-checked.
    pub fn concat(&self, other: &Delta) -> Delta {
        let mut delta = self.clone();
        if let Some((first, rest)) = other.ops.split_first() {
            delta.push(first.clone());
            delta.ops.extend_from_slice(rest);
        }
        delta
    }

    // ── Codec ─────────────────────────────────────────────────────────────

    pub fn to_json(&self) -> Value {
        codec::json::to_json(self)
    }

    pub fn from_json(v: &Value) -> Result<Delta> {
        codec::json::from_json(v)
    }
}

/// Merge `op` into `last` when both are text inserts or both numeric
/// retains carrying equal attributes.
fn merge_into(last: &mut Op, op: &Op) -> bool {
    match (last, op) {
        (
            Op::Insert {
                insert: Insert::Text(text),
                attributes,
            },
            Op::Insert {
                insert: Insert::Text(more),
                attributes: more_attributes,
            },
        ) if attributes == more_attributes => {
            text.push_str(more);
            true
        }
        (
            Op::Retain {
                retain: Retain::Len(n),
                attributes,
            },
            Op::Retain {
                retain: Retain::Len(m),
                attributes: more_attributes,
            },
        ) if attributes == more_attributes => match merged_length(*n, *m) {
            Some(sum) => {
                *n = sum;
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// Sum of two run lengths, or `None` when it would reach the exhausted
/// iterator's sentinel; such runs are kept as separate operations.
fn merged_length(a: usize, b: usize) -> Option<usize> {
    a.checked_add(b).filter(|sum| *sum < INFINITY)
}

impl FromIterator<Op> for Delta {
    fn from_iter<T: IntoIterator<Item = Op>>(ops: T) -> Self {
        Delta::from_ops(ops)
    }
}

impl From<Vec<Op>> for Delta {
    fn from(ops: Vec<Op>) -> Self {
        Delta::from_ops(ops)
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
