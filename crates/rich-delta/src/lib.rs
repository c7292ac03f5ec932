//! Rich-text deltas.
//!
//! A [`Delta`] is a sequence of insert, delete and retain operations. It
//! describes either a whole document (inserts only) or a change to one.
//! Deltas compose, transform against concurrent changes, invert against
//! the document they were applied to, and diff. Embeds are opaque
//! `{key: payload}` objects; their sub-changes are handled by an
//! [`EmbedHandler`] registered in a caller-owned [`EmbedRegistry`].
//!
//! # Example
//!
//! ```
//! use rich_delta::Delta;
//! use serde_json::json;
//!
//! let doc = Delta::new().insert("Hello");
//! let change = Delta::new().retain(5).insert(" world");
//! let next = doc.compose(&change).unwrap();
//! assert_eq!(next.to_json(), json!([{"insert": "Hello world"}]));
//!
//! let undo = change.invert(&doc).unwrap();
//! assert_eq!(next.compose(&undo).unwrap(), doc);
//! ```

pub mod attributes;
pub mod codec;
pub mod delta;
pub mod diff;
pub mod embed;
pub mod error;
pub mod iterator;
pub mod op;

pub use attributes::AttributeMap;
pub use delta::Delta;
pub use embed::{EmbedHandler, EmbedRegistry, NestedDelta};
pub use error::{DeltaError, Result};
pub use iterator::{OpIterator, INFINITY};
pub use op::{Embed, Insert, Op, OpKind, Retain};
