//! Error type shared by the builder, codec and algebra.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DeltaError {
    /// An operation with a non-positive length or unrecognized content.
    #[error("MALFORMED_OP: {0}")]
    MalformedOp(String),
    /// An embed was composed or inverted with no handler for its key.
    #[error("UNREGISTERED_EMBED: no handler registered for \"{0}\"")]
    UnregisteredEmbed(String),
    /// Two aligned embeds (or an embed and plain content) disagree on kind.
    #[error("EMBED_MISMATCH: expected \"{expected}\", found \"{found}\"")]
    EmbedMismatch { expected: String, found: String },
    /// A document-only operation was called on a change containing
    /// retains or deletes.
    #[error("NOT_A_DOCUMENT: {0}")]
    NotADocument(&'static str),
    /// A change applied to a document consumes more units than it holds.
    #[error("LENGTH_MISMATCH: expected at most {expected} units, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// The base passed to `invert` cannot supply what the change consumed.
    #[error("BASE_MISMATCH: {0}")]
    BaseMismatch(String),
}

pub type Result<T> = std::result::Result<T, DeltaError>;
