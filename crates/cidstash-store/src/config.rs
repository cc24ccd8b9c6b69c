use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Top-level store configuration, usually read from TOML.
///
/// ```toml
/// [backend]
/// kind = "memory"
///
/// [observers]
/// tracing = true
/// channel_capacity = 256
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub backend: BackendConfig,
    pub observers: ObserverConfig,
}

/// Which backend the coordinator is built with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// The in-memory reference backend.
    #[default]
    Memory,
    /// No backend; content operations fail with `NoBackend`.
    #[serde(rename = "none")]
    Disabled,
}

/// Built-in observers to register.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObserverConfig {
    /// Log every put and delete through `tracing`.
    pub tracing: bool,
    /// Broadcast notifications on a channel with this capacity.
    pub channel_capacity: Option<usize>,
}

impl StoreConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(input: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&input)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub(crate) fn validate(&self) -> StoreResult<()> {
        if self.observers.channel_capacity == Some(0) {
            return Err(StoreError::Config(
                "observers.channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.backend, BackendConfig::Memory);
        assert!(!c.observers.tracing);
        assert!(c.observers.channel_capacity.is_none());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(StoreConfig::from_toml_str("").unwrap(), StoreConfig::default());
    }

    #[test]
    fn parse_full() {
        let c = StoreConfig::from_toml_str(
            r#"
            [backend]
            kind = "none"

            [observers]
            tracing = true
            channel_capacity = 16
            "#,
        )
        .unwrap();
        assert_eq!(c.backend, BackendConfig::Disabled);
        assert!(c.observers.tracing);
        assert_eq!(c.observers.channel_capacity, Some(16));
    }

    #[test]
    fn unknown_backend_rejected() {
        let err = StoreConfig::from_toml_str("[backend]\nkind = \"s3\"\n").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(StoreConfig::from_toml_str("[observers]\nmetrics = true\n").is_err());
    }

    #[test]
    fn zero_capacity_rejected() {
        let err = StoreConfig::from_toml_str("[observers]\nchannel_capacity = 0\n").unwrap_err();
        assert!(err.to_string().contains("channel_capacity"));
    }

    #[test]
    fn toml_roundtrip() {
        let c = StoreConfig {
            backend: BackendConfig::Memory,
            observers: ObserverConfig {
                tracing: true,
                channel_capacity: Some(8),
            },
        };
        let text = c.to_toml_string().unwrap();
        assert_eq!(StoreConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[observers]\ntracing = true").unwrap();
        let c = StoreConfig::load(file.path()).unwrap();
        assert!(c.observers.tracing);
    }

    #[test]
    fn load_missing_file() {
        let err = StoreConfig::load("/nonexistent/cidstash.toml").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
