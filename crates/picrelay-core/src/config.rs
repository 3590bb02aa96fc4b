//! Configuration module
//!
//! Environment-driven configuration for the relay worker. Required values
//! missing at startup produce an error; the binary treats that as fatal.

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

const DEFAULT_NOTIFY_CHANNEL: &str = "new_image_event";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;

/// Which storage backend the factory should construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            other => bail!("Unknown storage backend: {}", other),
        }
    }
}

/// Which column the session query reads into `style_tag`.
///
/// Deployments expose either a `style` or an `email` column on the sessions
/// table; exactly one shape is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentShape {
    Style,
    Email,
}

impl FromStr for EnrichmentShape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "style" => Ok(EnrichmentShape::Style),
            "email" => Ok(EnrichmentShape::Email),
            other => bail!("Unknown enrichment shape: {}", other),
        }
    }
}

/// Worker configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Base URL the event payload path is appended to when fetching bytes.
    pub api_base_url: String,
    /// Destination folder identifier passed to the storage backend.
    pub dest_folder: String,
    pub notify_channel: String,
    pub enrichment_shape: EnrichmentShape,
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Per-request fetch timeout in seconds; `None` leaves requests unbounded
    /// so a hung fetch stalls only its own run.
    pub fetch_timeout_seconds: Option<u64>,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{} must be set", key))
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value for {}", key)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let enrichment_shape = match env::var("ENRICHMENT_SHAPE") {
            Ok(raw) => raw.parse().context("Invalid ENRICHMENT_SHAPE")?,
            Err(_) => EnrichmentShape::Style,
        };
        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse().context("Invalid STORAGE_BACKEND")?,
            Err(_) => StorageBackend::S3,
        };

        let fetch_timeout_seconds = parse_or::<u64>("FETCH_TIMEOUT_SECONDS", 0)?;

        let config = Config {
            database_url: required("DATABASE_URL")?,
            api_base_url: required("API_BASE_URL")?,
            dest_folder: required("DEST_FOLDER")?,
            notify_channel: env::var("NOTIFY_CHANNEL")
                .unwrap_or_else(|_| DEFAULT_NOTIFY_CHANNEL.to_string()),
            enrichment_shape,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").or_else(|_| env::var("AWS_REGION")).ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            db_timeout_seconds: parse_or("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS)?,
            fetch_timeout_seconds: (fetch_timeout_seconds > 0).then_some(fetch_timeout_seconds),
        };
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on combinations `from_env` cannot catch field-by-field.
    pub fn validate(&self) -> Result<()> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    bail!("S3_BUCKET must be set when STORAGE_BACKEND is s3");
                }
                if self.s3_region.is_none() {
                    bail!("S3_REGION or AWS_REGION must be set when STORAGE_BACKEND is s3");
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    bail!("LOCAL_STORAGE_PATH must be set when STORAGE_BACKEND is local");
                }
            }
        }
        if self.dest_folder.trim().is_empty() {
            bail!("DEST_FOLDER must not be blank");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            database_url: "postgres://localhost/relay".into(),
            api_base_url: "http://render-api:8080".into(),
            dest_folder: "session-exports".into(),
            notify_channel: DEFAULT_NOTIFY_CHANNEL.into(),
            enrichment_shape: EnrichmentShape::Style,
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/relay".into()),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            db_timeout_seconds: DEFAULT_DB_TIMEOUT_SECS,
            fetch_timeout_seconds: None,
        }
    }

    #[test]
    fn backend_and_shape_parse_case_insensitively() {
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!("Local".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert!("gcs".parse::<StorageBackend>().is_err());
        assert_eq!("EMAIL".parse::<EnrichmentShape>().unwrap(), EnrichmentShape::Email);
        assert!("both".parse::<EnrichmentShape>().is_err());
    }

    #[test]
    fn s3_backend_requires_bucket_and_region() {
        let mut config = base_config();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());
        config.s3_bucket = Some("exports".into());
        config.s3_region = Some("eu-west-1".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn local_backend_requires_path() {
        let mut config = base_config();
        config.local_storage_path = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_dest_folder_is_rejected() {
        let mut config = base_config();
        config.dest_folder = "  ".into();
        assert!(config.validate().is_err());
    }
}
