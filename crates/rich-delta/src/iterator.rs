//! Read cursor over a slice of operations.
//!
//! `OpIterator` hands out prefixes of the current operation, splitting text
//! runs and numeric lengths as needed. Embeds are atomic: any request,
//! even for zero units, returns the whole embed and moves past it. Once
//! exhausted the iterator behaves as an endless plain retain, which is what
//! lets the pairwise algorithms treat a shorter change as carrying an
//! implicit trailing retain.

use crate::op::{char_slice, Insert, Op, OpKind, Retain};

/// Length reported by an exhausted iterator.
pub const INFINITY: usize = usize::MAX;

#[derive(Debug, Clone)]
pub struct OpIterator<'a> {
    ops: &'a [Op],
    index: usize,
    offset: usize,
}

impl<'a> OpIterator<'a> {
    pub fn new(ops: &'a [Op]) -> Self {
        Self {
            ops,
            index: 0,
            offset: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.peek_length() < INFINITY
    }

    /// The current operation, unsliced.
    pub fn peek(&self) -> Option<&'a Op> {
        self.ops.get(self.index)
    }

    /// Remaining length of the current operation.
    pub fn peek_length(&self) -> usize {
        self.peek().map_or(INFINITY, |op| op.len() - self.offset)
    }

    pub fn peek_kind(&self) -> OpKind {
        self.peek().map_or(OpKind::Retain, Op::kind)
    }

    /// Take at most `max_len` units of the current operation.
    pub fn next(&mut self, max_len: usize) -> Op {
        let Some(op) = self.ops.get(self.index) else {
            return Op::retain(max_len, None);
        };
        let offset = self.offset;
        let remaining = op.len() - offset;
        // Embeds are taken whole, even when asked for zero units.
        let atomic = matches!(
            op,
            Op::Insert {
                insert: Insert::Embed(_),
                ..
            } | Op::Retain {
                retain: Retain::Embed(_),
                ..
            }
        );
        let length = if atomic || max_len >= remaining {
            self.index += 1;
            self.offset = 0;
            remaining
        } else {
            self.offset += max_len;
            max_len
        };
        match op {
            Op::Delete(_) => Op::Delete(length),
            Op::Retain { retain, attributes } => Op::Retain {
                retain: match retain {
                    Retain::Len(_) => Retain::Len(length),
                    Retain::Embed(embed) => Retain::Embed(embed.clone()),
                },
                attributes: attributes.clone(),
            },
            Op::Insert { insert, attributes } => Op::Insert {
                insert: match insert {
                    Insert::Text(text) => Insert::Text(char_slice(text, offset, length).to_string()),
                    Insert::Embed(embed) => Insert::Embed(embed.clone()),
                },
                attributes: attributes.clone(),
            },
        }
    }

    /// Everything not yet consumed, with the current operation trimmed to
    /// its unconsumed part. Does not advance the cursor.
    pub fn rest(&self) -> Vec<Op> {
        if !self.has_next() {
            return Vec::new();
        }
        if self.offset == 0 {
            return self.ops[self.index..].to_vec();
        }
        let mut cursor = self.clone();
        let mut rest = vec![cursor.next(INFINITY)];
        rest.extend_from_slice(&cursor.ops[cursor.index..]);
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Embed;
    use serde_json::{json, Map, Value};

    fn bold() -> Option<Map<String, Value>> {
        json!({"bold": true}).as_object().cloned()
    }

    fn sample() -> Vec<Op> {
        vec![
            Op::insert("Hello", bold()),
            Op::retain(3, None),
            Op::insert(Embed::new("image", json!("a.png")), None),
            Op::Delete(4),
        ]
    }

    #[test]
    fn has_next_and_peek() {
        let ops = sample();
        let mut iter = OpIterator::new(&ops);
        assert!(iter.has_next());
        assert_eq!(iter.peek_kind(), OpKind::Insert);
        assert_eq!(iter.peek_length(), 5);
        iter.next(INFINITY);
        assert_eq!(iter.peek_kind(), OpKind::Retain);
        assert_eq!(iter.peek_length(), 3);
        iter.next(INFINITY);
        iter.next(INFINITY);
        assert_eq!(iter.peek_kind(), OpKind::Delete);
        iter.next(INFINITY);
        assert!(!iter.has_next());
        assert_eq!(iter.peek_length(), INFINITY);
        assert_eq!(iter.peek_kind(), OpKind::Retain);
    }

    #[test]
    fn next_splits_operations() {
        let ops = sample();
        let mut iter = OpIterator::new(&ops);
        assert_eq!(iter.next(2), Op::insert("He", bold()));
        assert_eq!(iter.next(10), Op::insert("llo", bold()));
        assert_eq!(iter.next(1), Op::retain(1, None));
        assert_eq!(iter.next(2), Op::retain(2, None));
        assert_eq!(
            iter.next(10),
            Op::insert(Embed::new("image", json!("a.png")), None)
        );
        assert_eq!(iter.next(2), Op::Delete(2));
        assert_eq!(iter.next(10), Op::Delete(2));
        assert_eq!(iter.next(4), Op::retain(4, None));
    }

    #[test]
    fn embeds_are_taken_whole_for_any_length() {
        let image = Embed::new("image", json!("a.png"));
        let ops = vec![
            Op::insert(image.clone(), None),
            Op::retain(Embed::new("delta", json!([{"insert": "a"}])), None),
            Op::insert("ab", None),
        ];
        let mut iter = OpIterator::new(&ops);
        assert_eq!(iter.next(0), Op::insert(image, None));
        assert_eq!(iter.peek_kind(), OpKind::Retain);
        assert_eq!(
            iter.next(0),
            Op::retain(Embed::new("delta", json!([{"insert": "a"}])), None)
        );
        assert_eq!(iter.peek_length(), 2);
        assert_eq!(iter.next(0), Op::insert("", None));
        assert_eq!(iter.peek_length(), 2);
    }

    #[test]
    fn rest_does_not_advance() {
        let ops = sample();
        let mut iter = OpIterator::new(&ops);
        iter.next(2);
        assert_eq!(
            iter.rest(),
            vec![
                Op::insert("llo", bold()),
                Op::retain(3, None),
                Op::insert(Embed::new("image", json!("a.png")), None),
                Op::Delete(4),
            ]
        );
        iter.next(3);
        iter.next(3);
        iter.next(3);
        iter.next(3);
        assert_eq!(iter.rest(), vec![Op::Delete(1)]);
        iter.next(INFINITY);
        assert!(iter.rest().is_empty());
        assert!(!iter.has_next());
    }
}
