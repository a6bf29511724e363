use std::path::Path;
use std::time::Duration;

use refsvc_transport::CallOptions;
use refsvc_types::{RepositoryHandle, TypeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] TypeError),
}

/// Client settings, usually loaded from TOML.
///
/// ```toml
/// storage_name = "default"
/// relative_path = "group/project.git"
/// gl_repository = "project-42"
/// call_timeout_ms = 10000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub storage_name: String,
    pub relative_path: String,
    pub gl_repository: String,
    /// Deadline handed to the transport for every call.
    pub call_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            storage_name: "default".into(),
            relative_path: String::new(),
            gl_repository: String::new(),
            call_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn repository(&self) -> Result<RepositoryHandle, TypeError> {
        RepositoryHandle::new(
            self.storage_name.clone(),
            self.relative_path.clone(),
            self.gl_repository.clone(),
        )
    }

    pub fn call_options(&self) -> CallOptions {
        match self.call_timeout_ms {
            Some(ms) => CallOptions::new().with_timeout(Duration::from_millis(ms)),
            None => CallOptions::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let c = ClientConfig::default();
        assert_eq!(c.storage_name, "default");
        assert!(c.call_timeout_ms.is_none());
        assert_eq!(c.call_options(), CallOptions::new());
        // no repository path yet
        assert!(c.repository().is_err());
    }

    #[test]
    fn parse_full_config() {
        let c = ClientConfig::from_toml_str(
            r#"
            storage_name = "nfs-1"
            relative_path = "group/project.git"
            gl_repository = "project-42"
            call_timeout_ms = 2500
            "#,
        )
        .unwrap();
        let repo = c.repository().unwrap();
        assert_eq!(repo.storage_name, "nfs-1");
        assert_eq!(repo.gl_repository, "project-42");
        assert_eq!(c.call_options().timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let c = ClientConfig::from_toml_str(r#"relative_path = "a.git""#).unwrap();
        assert_eq!(c.storage_name, "default");
        assert!(c.repository().is_ok());
    }

    #[test]
    fn parse_error_is_reported() {
        let err = ClientConfig::from_toml_str("call_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "relative_path = \"x.git\"").unwrap();
        let c = ClientConfig::load(file.path()).unwrap();
        assert_eq!(c.relative_path, "x.git");
    }
}
