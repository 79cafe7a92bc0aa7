use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use relic_archive::{CommitSettings, DescriptionDetail, WriterConfig};
use relic_crypto::DigestAlgorithm;
use relic_foxml::DecoderConfig;
use serde::{Deserialize, Serialize};

/// Configuration errors, raised before any object is processed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("unsupported storage digest algorithm {0}; expected sha512 or sha256")]
    UnsupportedDigest(String),

    #[error("invalid migration timestamp {value}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// What the batch driver does when an object fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failed object.
    #[default]
    Halt,
    /// Record the failure and move on.
    Continue,
}

/// Settings for one migration run, loaded from TOML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub source_dir: PathBuf,
    pub storage_root: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datastream_store: Option<PathBuf>,
    pub local_fedora_server: String,
    pub fetch_external_content: bool,
    pub validate_checksums: bool,
    pub add_file_extensions: bool,
    pub description_detail: DescriptionDetail,
    pub delete_inactive: bool,
    pub migration_actor: String,
    /// RFC 3339; the current time when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_timestamp: Option<String>,
    pub storage_digest: String,
    pub failure_policy: FailurePolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid_list: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
    pub commit: CommitSettings,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            storage_root: PathBuf::from("ocfl-root"),
            datastream_store: None,
            local_fedora_server: "localhost:8080".to_string(),
            fetch_external_content: false,
            validate_checksums: true,
            add_file_extensions: false,
            description_detail: DescriptionDetail::Minimal,
            delete_inactive: false,
            migration_actor: "fedoraAdmin".to_string(),
            migration_timestamp: None,
            storage_digest: "sha512".to_string(),
            failure_policy: FailurePolicy::Halt,
            pid_list: None,
            temp_dir: None,
            commit: CommitSettings::default(),
        }
    }
}

impl MigrationConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every setting that would otherwise fail mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.storage_algorithm()?;
        self.migration_time()?;
        if self.migration_actor.trim().is_empty() {
            return Err(ConfigError::Empty("migration_actor"));
        }
        if self.local_fedora_server.trim().is_empty() {
            return Err(ConfigError::Empty("local_fedora_server"));
        }
        if self.commit.user_name.trim().is_empty() {
            return Err(ConfigError::Empty("commit.user_name"));
        }
        Ok(())
    }

    /// Digest algorithm for new OCFL objects.
    pub fn storage_algorithm(&self) -> Result<DigestAlgorithm, ConfigError> {
        match self.storage_digest.parse::<DigestAlgorithm>() {
            Ok(alg) if alg.is_inventory_algorithm() => Ok(alg),
            _ => Err(ConfigError::UnsupportedDigest(self.storage_digest.clone())),
        }
    }

    /// The fixed migration time, if one is configured.
    pub fn migration_time(&self) -> Result<Option<DateTime<Utc>>, ConfigError> {
        self.migration_timestamp
            .as_deref()
            .map(|value| {
                DateTime::parse_from_rfc3339(value)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| ConfigError::InvalidTimestamp {
                        value: value.to_string(),
                        reason: e.to_string(),
                    })
            })
            .transpose()
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            local_fedora_server: self.local_fedora_server.clone(),
            temp_dir: self.temp_dir.clone(),
        }
    }

    pub fn writer_config(&self) -> Result<WriterConfig, ConfigError> {
        Ok(WriterConfig {
            fetch_external_content: self.fetch_external_content,
            validate_checksums: self.validate_checksums,
            add_file_extensions: self.add_file_extensions,
            description_detail: self.description_detail,
            delete_inactive: self.delete_inactive,
            migration_actor: self.migration_actor.clone(),
            migration_timestamp: self.migration_time()?,
            commit: self.commit.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = MigrationConfig::default();
        assert_eq!(c.storage_root, PathBuf::from("ocfl-root"));
        assert_eq!(c.local_fedora_server, "localhost:8080");
        assert!(c.validate_checksums);
        assert!(!c.fetch_external_content);
        assert_eq!(c.failure_policy, FailurePolicy::Halt);
        assert_eq!(c.storage_algorithm().unwrap(), DigestAlgorithm::Sha512);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = MigrationConfig::from_toml(
            r#"
            source_dir = "/data/foxml"
            add_file_extensions = true
            description_detail = "full"
            failure_policy = "continue"
            migration_timestamp = "2024-01-01T00:00:00Z"

            [commit]
            message = "bulk import"
            "#,
        )
        .unwrap();
        assert_eq!(c.source_dir, PathBuf::from("/data/foxml"));
        assert!(c.add_file_extensions);
        assert_eq!(c.description_detail, DescriptionDetail::Full);
        assert_eq!(c.failure_policy, FailurePolicy::Continue);
        assert_eq!(c.commit.message, "bulk import");
        assert_eq!(c.commit.user_name, "fedoraAdmin");
        assert_eq!(c.storage_digest, "sha512");

        let writer = c.writer_config().unwrap();
        assert_eq!(
            writer.migration_timestamp.unwrap().to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn default_config_renders_and_parses() {
        let text = MigrationConfig::default().to_toml().unwrap();
        assert!(text.contains("storage_digest = \"sha512\""));
        assert_eq!(MigrationConfig::from_toml(&text).unwrap(), MigrationConfig::default());
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(MigrationConfig::from_toml("failure_policy = \"sometimes\"").is_err());
    }

    #[test]
    fn validation_failures() {
        let c = MigrationConfig {
            storage_digest: "md5".into(),
            ..MigrationConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::UnsupportedDigest(_))));

        let c = MigrationConfig {
            storage_digest: "whirlpool".into(),
            ..MigrationConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::UnsupportedDigest(_))));

        let c = MigrationConfig {
            migration_timestamp: Some("yesterday".into()),
            ..MigrationConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::InvalidTimestamp { .. })));

        let c = MigrationConfig {
            migration_actor: " ".into(),
            ..MigrationConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Empty("migration_actor"))));
    }

    #[test]
    fn sha256_storage_is_accepted() {
        let c = MigrationConfig {
            storage_digest: "SHA-256".into(),
            ..MigrationConfig::default()
        };
        assert_eq!(c.storage_algorithm().unwrap(), DigestAlgorithm::Sha256);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MigrationConfig::load(dir.path().join("relic.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
