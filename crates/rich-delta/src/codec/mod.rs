//! Wire codecs for changes.

pub mod json;
