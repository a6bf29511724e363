//! Best-effort text coercion.
//!
//! Commit messages and ref names have no enforced encoding at the source.
//! Everything shown to callers is forced into UTF-8 here. This step is lossy:
//! invalid sequences become U+FFFD and [`CoercedText::lossy`] is set, so the
//! text is readable but not guaranteed to match the original bytes.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Text produced by [`coerce_utf8`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoercedText {
    pub text: String,
    /// `true` if replacement characters were inserted.
    pub lossy: bool,
}

impl CoercedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for CoercedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Interpret `bytes` as UTF-8, replacing invalid sequences.
pub fn coerce_utf8(bytes: &[u8]) -> CoercedText {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(s) => CoercedText {
            text: s.to_owned(),
            lossy: false,
        },
        Cow::Owned(s) => CoercedText { text: s, lossy: true },
    }
}
