use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Ordering for local branch listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    /// Ascending by name.
    #[default]
    Name,
    /// Oldest tip commit first.
    UpdatedAsc,
    /// Most recently updated first.
    UpdatedDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Name, SortKey::UpdatedAsc, SortKey::UpdatedDesc];

    /// Resolve a caller-supplied key such as `"name"` or `"updated_desc"`.
    ///
    /// `"name_asc"` is accepted as a legacy alias for `"name"`. Matching is
    /// case-insensitive.
    ///
    /// ```
    /// use refsvc_types::SortKey;
    ///
    /// assert_eq!(SortKey::resolve("name_asc").unwrap(), SortKey::Name);
    /// assert!(SortKey::resolve("bogus_key").is_err());
    /// ```
    pub fn resolve(key: &str) -> Result<Self, TypeError> {
        let normalized = if key == "name_asc" { "name" } else { key };
        let upper = normalized.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|k| k.symbol() == upper)
            .ok_or_else(|| TypeError::InvalidSortKey(key.to_string()))
    }

    /// Enumeration symbol used by the backend.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::UpdatedAsc => "UPDATED_ASC",
            Self::UpdatedDesc => "UPDATED_DESC",
        }
    }

    /// Numeric value carried on the wire.
    pub fn wire_value(&self) -> i32 {
        match self {
            Self::Name => 0,
            Self::UpdatedAsc => 1,
            Self::UpdatedDesc => 2,
        }
    }

    pub fn from_wire(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.wire_value() == value)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_name() {
        assert_eq!(SortKey::default(), SortKey::Name);
    }

    #[test]
    fn legacy_alias_matches_name() {
        assert_eq!(SortKey::resolve("name_asc").unwrap(), SortKey::resolve("name").unwrap());
    }

    #[test]
    fn resolve_is_case_insensitive() {
        assert_eq!(SortKey::resolve("updated_desc").unwrap(), SortKey::UpdatedDesc);
        assert_eq!(SortKey::resolve("UPDATED_ASC").unwrap(), SortKey::UpdatedAsc);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = SortKey::resolve("bogus_key").unwrap_err();
        assert_eq!(err, TypeError::InvalidSortKey("bogus_key".into()));
        assert_eq!(err.to_string(), "Invalid sort_by key `bogus_key`");
    }

    #[test]
    fn alias_only_applies_to_exact_spelling() {
        // the alias is matched before upper-casing
        assert!(SortKey::resolve("NAME_ASC").is_err());
    }

    #[test]
    fn wire_values_roundtrip() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::from_wire(key.wire_value()), Some(key));
        }
        assert_eq!(SortKey::from_wire(7), None);
    }
}
