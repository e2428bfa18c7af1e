//! Configuration module
//!
//! Settings are read from the environment (optionally seeded from a `.env` file).
//! The object store backend is enabled by the presence of `S3_BUCKET`; without it
//! recordings are served from the local upload directory.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: u64 = 200;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_S3_REGION: &str = "auto";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// S3-compatible object store settings (AWS S3, Cloudflare R2, MinIO)
#[derive(Clone, Debug)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Public base URL objects are reachable under, e.g. a bucket's CDN domain
    pub public_base_url: String,
}

#[derive(Clone, Debug)]
pub struct ClipshareConfig {
    pub base: BaseConfig,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_size_bytes: u64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub public_base_url: String,
    pub request_timeout_secs: u64,
    pub object_store: Option<ObjectStoreConfig>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ClipshareConfig>);

impl Config {
    fn inner(&self) -> &ClipshareConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ClipshareConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.inner().upload_dir
    }

    pub fn max_upload_size_bytes(&self) -> u64 {
        self.inner().max_upload_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.inner().ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.inner().ffprobe_path
    }

    pub fn public_base_url(&self) -> &str {
        &self.inner().public_base_url
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.inner().request_timeout_secs
    }

    pub fn object_store(&self) -> Option<&ObjectStoreConfig> {
        self.inner().object_store.as_ref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        if self.inner().object_store.is_some() {
            StorageBackend::S3
        } else {
            StorageBackend::Local
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ClipshareConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = parse_or(lookup("PORT"), SERVER_PORT);
        let max_upload_size_mb = parse_or(lookup("MAX_UPLOAD_SIZE_MB"), MAX_UPLOAD_SIZE_MB);

        let public_base_url = non_empty(lookup("PUBLIC_BASE_URL"))
            .unwrap_or_else(|| format!("http://localhost:{}", server_port))
            .trim_end_matches('/')
            .to_string();

        let object_store = match non_empty(lookup("S3_BUCKET")) {
            Some(bucket) => {
                let require = |key: &str| {
                    non_empty(lookup(key)).ok_or_else(|| {
                        anyhow::anyhow!("{} must be set when S3_BUCKET is configured", key)
                    })
                };
                Some(ObjectStoreConfig {
                    bucket,
                    region: non_empty(lookup("S3_REGION"))
                        .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
                    endpoint: non_empty(lookup("S3_ENDPOINT")),
                    access_key_id: require("S3_ACCESS_KEY_ID")?,
                    secret_access_key: require("S3_SECRET_ACCESS_KEY")?,
                    public_base_url: require("S3_PUBLIC_URL")?
                        .trim_end_matches('/')
                        .to_string(),
                })
            }
            None => None,
        };

        Ok(ClipshareConfig {
            base: BaseConfig {
                server_port,
                cors_origins,
                db_max_connections: parse_or(lookup("DB_MAX_CONNECTIONS"), MAX_CONNECTIONS),
                db_timeout_seconds: parse_or(
                    lookup("DB_TIMEOUT_SECONDS"),
                    CONNECTION_TIMEOUT_SECS,
                ),
                environment,
            },
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            upload_dir: PathBuf::from(
                non_empty(lookup("UPLOAD_DIR")).unwrap_or_else(|| "./uploads".to_string()),
            ),
            max_upload_size_bytes: max_upload_size_mb.saturating_mul(1024 * 1024),
            ffmpeg_path: non_empty(lookup("FFMPEG_PATH")).unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: non_empty(lookup("FFPROBE_PATH"))
                .unwrap_or_else(|| "ffprobe".to_string()),
            public_base_url,
            request_timeout_secs: parse_or(lookup("REQUEST_TIMEOUT_SECS"), REQUEST_TIMEOUT_SECS),
            object_store,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB cannot be 0"));
        }

        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS cannot be 0"));
        }

        if !(self.public_base_url.starts_with("http://")
            || self.public_base_url.starts_with("https://"))
        {
            return Err(anyhow::anyhow!(
                "PUBLIC_BASE_URL must be an absolute http(s) URL"
            ));
        }

        if let Some(store) = &self.object_store {
            if !(store.public_base_url.starts_with("http://")
                || store.public_base_url.starts_with("https://"))
            {
                return Err(anyhow::anyhow!("S3_PUBLIC_URL must be an absolute http(s) URL"));
            }
        }

        Ok(())
    }
}
