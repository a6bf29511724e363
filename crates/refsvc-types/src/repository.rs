use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifies one repository on the backend.
///
/// Sent unchanged as the repository field of every request. The storage name
/// doubles as the address the transport routes the call to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryHandle {
    /// Name of the backend storage shard holding the repository.
    pub storage_name: String,
    /// Path of the repository relative to the storage root.
    pub relative_path: String,
    /// Application-level repository identifier (e.g. "project-42").
    #[serde(default)]
    pub gl_repository: String,
}

impl RepositoryHandle {
    /// Build a handle, rejecting empty storage names or paths.
    pub fn new(
        storage_name: impl Into<String>,
        relative_path: impl Into<String>,
        gl_repository: impl Into<String>,
    ) -> Result<Self, TypeError> {
        let handle = Self {
            storage_name: storage_name.into(),
            relative_path: relative_path.into(),
            gl_repository: gl_repository.into(),
        };
        handle.validate()?;
        Ok(handle)
    }

    /// Check that the handle addresses something.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.storage_name.is_empty() {
            return Err(TypeError::InvalidRepository(
                "storage name must not be empty".into(),
            ));
        }
        if self.relative_path.is_empty() {
            return Err(TypeError::InvalidRepository(
                "relative path must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.storage_name, self.relative_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_complete_handle() {
        let h = RepositoryHandle::new("default", "group/project.git", "project-1").unwrap();
        assert_eq!(h.storage_name, "default");
        assert_eq!(h.to_string(), "default:group/project.git");
    }

    #[test]
    fn new_rejects_empty_storage() {
        let err = RepositoryHandle::new("", "a.git", "").unwrap_err();
        assert!(matches!(err, TypeError::InvalidRepository(_)));
    }

    #[test]
    fn new_rejects_empty_path() {
        assert!(RepositoryHandle::new("default", "", "").is_err());
    }

    #[test]
    fn gl_repository_defaults_when_missing() {
        let h: RepositoryHandle =
            serde_json::from_str(r#"{"storage_name":"s","relative_path":"p.git"}"#).unwrap();
        assert_eq!(h.gl_repository, "");
    }
}
