//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::AppError;

/// Application configuration.
///
/// Built once at startup and handed by reference to the services that need
/// it; nothing reads configuration from ambient process state afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    #[serde(default)]
    pub jwt: JwtConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Avatar configuration.
    #[serde(default)]
    pub avatar: AvatarConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens. Absent or empty is a deployment error.
    #[serde(default)]
    pub secret: Option<String>,
    /// Value written to both the `iss` and `aud` claims.
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: default_issuer(),
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[hidden]"))
            .field("issuer", &self.issuer)
            .finish()
    }
}

fn default_issuer() -> String {
    "vouch".to_string()
}

/// Storage provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// Process memory; contents vanish on restart.
    Memory,
}

impl Default for StorageProvider {
    fn default() -> Self {
        Self::LocalFs {
            root: PathBuf::from("./storage"),
        }
    }
}

impl StorageProvider {
    /// Short provider name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }
}

/// Object storage settings as they appear in configuration files.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Backend selection and credentials.
    #[serde(default)]
    pub provider: StorageProvider,
    /// Public prefix under which stored objects are dereferenceable.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Content types accepted for avatar uploads.
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            public_base_url: default_public_base_url(),
            max_file_size: default_max_file_size(),
            allowed_content_types: default_allowed_content_types(),
        }
    }
}

/// Route under which the server itself serves `local_fs` objects.
pub const LOCAL_MEDIA_PATH: &str = "/media";

fn default_public_base_url() -> String {
    "http://localhost:8080/media".to_string()
}

/// Upload limit when none is configured: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Image types accepted for avatars when none are configured.
pub const DEFAULT_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

/// [`DEFAULT_CONTENT_TYPES`] as owned strings.
#[must_use]
pub fn default_allowed_content_types() -> Vec<String> {
    DEFAULT_CONTENT_TYPES.iter().map(ToString::to_string).collect()
}

/// Avatar configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarConfig {
    /// Container holding profile images.
    #[serde(default = "default_avatar_container")]
    pub container: String,
    /// Reference given to users who sign up without an image.
    #[serde(default = "default_avatar_url")]
    pub default_url: String,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            container: default_avatar_container(),
            default_url: default_avatar_url(),
        }
    }
}

fn default_avatar_container() -> String {
    "profile-images".to_string()
}

fn default_avatar_url() -> String {
    "https://storage.example.com/avatar/default-avatar.jpg".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("VOUCH").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Checks the settings that cannot be defaulted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` naming the first missing setting.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt.secret.as_deref().is_none_or(str::is_empty) {
            return Err(AppError::Configuration(
                "jwt.secret is not configured".to_string(),
            ));
        }
        if self.jwt.issuer.is_empty() {
            return Err(AppError::Configuration(
                "jwt.issuer must not be empty".to_string(),
            ));
        }
        if self.storage.public_base_url.is_empty() {
            return Err(AppError::Configuration(
                "storage.public_base_url must not be empty".to_string(),
            ));
        }
        if matches!(self.storage.provider, StorageProvider::LocalFs { .. })
            && !self
                .storage
                .public_base_url
                .trim_end_matches('/')
                .ends_with(LOCAL_MEDIA_PATH)
        {
            return Err(AppError::Configuration(format!(
                "storage.public_base_url must end with {LOCAL_MEDIA_PATH} for local_fs storage"
            )));
        }
        if self.avatar.container.is_empty() {
            return Err(AppError::Configuration(
                "avatar.container must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
