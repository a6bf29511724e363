//! Ref names and ref-name normalization.
//!
//! Ref names travel as raw bytes: git does not force any encoding on them.
//! [`RefName`] keeps the bytes and only coerces to text for display.
//!
//! Well-formed full ref names (checked by [`check_ref_format`]):
//! - Must be non-empty
//! - Must not contain NUL, control characters, whitespace, `~`, `^`, `:`,
//!   `?`, `*`, `[`, `\`
//! - Must not contain `..` or `@{`
//! - Must not start or end with `/`, or end with `.`
//! - Must not end with `.lock`
//! - Components between slashes must be non-empty and not start with `.`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::text::{coerce_utf8, CoercedText};

/// Namespace the backend stores branches under.
pub const BRANCH_PREFIX: &str = "refs/heads/";

/// Namespace the backend stores tags under.
pub const TAG_PREFIX: &str = "refs/tags/";

/// Bytes that are forbidden anywhere in a ref name.
const FORBIDDEN_BYTES: &[u8] = b" \t\n\r~^:?*[\\";

/// A ref name as a byte sequence.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RefName(Vec<u8>);

impl RefName {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Best-effort UTF-8 view of the name.
    pub fn to_text(&self) -> CoercedText {
        coerce_utf8(&self.0)
    }

    /// Returns `true` if the name lives under `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix.as_bytes())
    }

    /// Drop `prefix` from the front of the name if present.
    pub fn without_prefix(&self, prefix: &str) -> RefName {
        match self.0.strip_prefix(prefix.as_bytes()) {
            Some(rest) => RefName(rest.to_vec()),
            None => self.clone(),
        }
    }

    /// Prepend `prefix` unless the name already carries it.
    pub fn qualified(&self, prefix: &str) -> RefName {
        if self.has_prefix(prefix) {
            return self.clone();
        }
        let mut bytes = Vec::with_capacity(prefix.len() + self.0.len());
        bytes.extend_from_slice(prefix.as_bytes());
        bytes.extend_from_slice(&self.0);
        RefName(bytes)
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RefName({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for RefName {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for RefName {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&[u8]> for RefName {
    fn from(b: &[u8]) -> Self {
        Self(b.to_vec())
    }
}

impl From<Vec<u8>> for RefName {
    fn from(b: Vec<u8>) -> Self {
        Self(b)
    }
}

impl AsRef<[u8]> for RefName {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Normalize a raw branch name coming off the wire to its short form.
///
/// ```
/// use refsvc_types::names::branch_name;
///
/// assert_eq!(branch_name(b"refs/heads/main").to_string(), "main");
/// assert_eq!(branch_name(b"feature/x").to_string(), "feature/x");
/// ```
pub fn branch_name(raw: &[u8]) -> RefName {
    RefName::from(raw).without_prefix(BRANCH_PREFIX)
}

/// Normalize a raw tag name coming off the wire to its short form.
pub fn tag_name(raw: &[u8]) -> RefName {
    RefName::from(raw).without_prefix(TAG_PREFIX)
}

/// Validate a ref name, returning `Ok(())` if it is well formed.
pub fn check_ref_format(name: &[u8]) -> Result<(), TypeError> {
    let invalid = |reason: String| TypeError::InvalidRefName {
        name: String::from_utf8_lossy(name).into_owned(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("ref name must not be empty".into()));
    }

    if let Some(b) = name.iter().find(|b| b.is_ascii_control() && !b"\t\n\r".contains(*b)) {
        return Err(invalid(format!("contains control byte 0x{b:02x}")));
    }

    if let Some(b) = name.iter().find(|b| FORBIDDEN_BYTES.contains(*b)) {
        return Err(invalid(format!("contains forbidden character: {:?}", *b as char)));
    }

    let contains = |needle: &[u8]| name.windows(needle.len()).any(|w| w == needle);

    if contains(b"..") {
        return Err(invalid("must not contain '..'".into()));
    }
    if contains(b"@{") {
        return Err(invalid("must not contain '@{'".into()));
    }
    if name.starts_with(b"/") || name.ends_with(b"/") {
        return Err(invalid("must not start or end with '/'".into()));
    }
    if name.ends_with(b".") {
        return Err(invalid("must not end with '.'".into()));
    }
    if name.ends_with(b".lock") {
        return Err(invalid("must not end with '.lock'".into()));
    }

    for component in name.split(|b| *b == b'/') {
        if component.is_empty() {
            return Err(invalid("path components must not be empty".into()));
        }
        if component.starts_with(b".") {
            return Err(invalid(format!(
                "component must not start with '.': {:?}",
                String::from_utf8_lossy(component)
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_name_strips_heads_prefix() {
        assert_eq!(branch_name(b"refs/heads/feature/auth").as_bytes(), b"feature/auth");
    }

    #[test]
    fn branch_name_leaves_short_names_alone() {
        assert_eq!(branch_name(b"main").as_bytes(), b"main");
    }

    #[test]
    fn tag_name_strips_tags_prefix() {
        assert_eq!(tag_name(b"refs/tags/v1.0.0").as_bytes(), b"v1.0.0");
        // only the tag namespace is stripped
        assert_eq!(tag_name(b"refs/heads/v1").as_bytes(), b"refs/heads/v1");
    }

    #[test]
    fn qualified_adds_prefix_once() {
        let short = RefName::from("main");
        assert_eq!(short.qualified(BRANCH_PREFIX).as_bytes(), b"refs/heads/main");
        let full = RefName::from("refs/heads/main");
        assert_eq!(full.qualified(BRANCH_PREFIX), full);
    }

    #[test]
    fn display_is_lossy() {
        let name = RefName::new(vec![b'a', 0xff, b'b']);
        assert_eq!(name.to_string(), "a\u{fffd}b");
        assert!(name.to_text().lossy);
    }

    #[test]
    fn valid_ref_names() {
        assert!(check_ref_format(b"refs/heads/main").is_ok());
        assert!(check_ref_format(b"refs/tags/v1.0").is_ok());
        assert!(check_ref_format(b"refs/heads/user/alice/fix-123").is_ok());
    }

    #[test]
    fn reject_null_byte() {
        let err = check_ref_format(b"refs/heads/ma\0in").unwrap_err();
        assert!(matches!(err, TypeError::InvalidRefName { .. }));
    }

    #[test]
    fn reject_empty_and_malformed() {
        assert!(check_ref_format(b"").is_err());
        assert!(check_ref_format(b"refs/heads/a..b").is_err());
        assert!(check_ref_format(b"refs/heads/has space").is_err());
        assert!(check_ref_format(b"refs/heads/a~b").is_err());
        assert!(check_ref_format(b"refs/heads/ref@{0}").is_err());
        assert!(check_ref_format(b"refs/heads/main.lock").is_err());
        assert!(check_ref_format(b"refs//heads").is_err());
        assert!(check_ref_format(b"/refs/heads/x").is_err());
        assert!(check_ref_format(b"refs/heads/.hidden").is_err());
        assert!(check_ref_format(b"refs/heads/trailing.").is_err());
    }
}
