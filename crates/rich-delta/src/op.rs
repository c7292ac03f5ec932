//! Operation types.
//!
//! An [`Op`] is one of three kinds:
//! - `Insert`: add a text run or a single embedded value
//! - `Delete(n)`: remove `n` units
//! - `Retain`: keep `n` units (optionally reformatting them) or apply a
//!   sub-change to the embedded value at the current position
//!
//! Lengths are counted in units: one `char` of text, or one embed.

use serde_json::Value;

use crate::attributes::AttributeMap;

/// An opaque embedded value, identified by its single discriminator key.
///
/// On the wire an embed is the one-key object `{ kind: data }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub kind: String,
    pub data: Value,
}

impl Embed {
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

/// Content carried by an insert.
#[derive(Debug, Clone, PartialEq)]
pub enum Insert {
    Text(String),
    Embed(Embed),
}

impl Insert {
    pub fn len(&self) -> usize {
        match self {
            Insert::Text(text) => text.chars().count(),
            Insert::Embed(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Insert::Text(text) if text.is_empty())
    }
}

impl From<&str> for Insert {
    fn from(text: &str) -> Self {
        Insert::Text(text.to_string())
    }
}

impl From<String> for Insert {
    fn from(text: String) -> Self {
        Insert::Text(text)
    }
}

impl From<Embed> for Insert {
    fn from(embed: Embed) -> Self {
        Insert::Embed(embed)
    }
}

/// What a retain keeps: a run of units, or a sub-change for one embed.
#[derive(Debug, Clone, PartialEq)]
pub enum Retain {
    Len(usize),
    Embed(Embed),
}

impl Retain {
    pub fn len(&self) -> usize {
        match self {
            Retain::Len(n) => *n,
            Retain::Embed(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Retain::Len(0))
    }
}

impl From<usize> for Retain {
    fn from(n: usize) -> Self {
        Retain::Len(n)
    }
}

impl From<Embed> for Retain {
    fn from(embed: Embed) -> Self {
        Retain::Embed(embed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Insert,
    Delete,
    Retain,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Insert {
        insert: Insert,
        attributes: Option<AttributeMap>,
    },
    Delete(usize),
    Retain {
        retain: Retain,
        attributes: Option<AttributeMap>,
    },
}

impl Op {
    pub fn insert(insert: impl Into<Insert>, attributes: Option<AttributeMap>) -> Self {
        Op::Insert {
            insert: insert.into(),
            attributes,
        }
    }

    pub fn retain(retain: impl Into<Retain>, attributes: Option<AttributeMap>) -> Self {
        Op::Retain {
            retain: retain.into(),
            attributes,
        }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Op::Insert { .. } => OpKind::Insert,
            Op::Delete(_) => OpKind::Delete,
            Op::Retain { .. } => OpKind::Retain,
        }
    }

    /// Number of units this operation covers.
    pub fn len(&self) -> usize {
        match self {
            Op::Insert { insert, .. } => insert.len(),
            Op::Delete(n) => *n,
            Op::Retain { retain, .. } => retain.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Op::Insert { insert, .. } => insert.is_empty(),
            Op::Delete(n) => *n == 0,
            Op::Retain { retain, .. } => retain.is_empty(),
        }
    }

    pub fn attributes(&self) -> Option<&AttributeMap> {
        match self {
            Op::Insert { attributes, .. } | Op::Retain { attributes, .. } => attributes.as_ref(),
            Op::Delete(_) => None,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Op::Insert { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Op::Delete(_))
    }

    pub fn is_retain(&self) -> bool {
        matches!(self, Op::Retain { .. })
    }

    /// A retain of plain units with no formatting change.
    pub fn is_plain_retain(&self) -> bool {
        matches!(
            self,
            Op::Retain {
                retain: Retain::Len(_),
                attributes: None
            }
        )
    }
}

/// `len` chars of `text` starting at char `start`.
pub(crate) fn char_slice(text: &str, start: usize, len: usize) -> &str {
    let mut indices = text.char_indices().map(|(i, _)| i).chain([text.len()]);
    let from = indices.nth(start).unwrap_or(text.len());
    let to = if len == 0 {
        from
    } else {
        indices.nth(len - 1).unwrap_or(text.len())
    };
    &text[from..to]
}
