//! Storage configuration types.

pub use vouch_shared::config::StorageProvider;
use vouch_shared::config::{StorageSettings, default_allowed_content_types};

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Public prefix for object URLs, without a trailing slash.
    pub public_base_url: String,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Allowed content types for upload.
    pub allowed_content_types: Vec<String>,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = vouch_shared::config::DEFAULT_MAX_FILE_SIZE;

    /// Create a new storage config with default limits.
    #[must_use]
    pub fn new(provider: StorageProvider, public_base_url: impl Into<String>) -> Self {
        Self {
            provider,
            public_base_url: trim_base_url(public_base_url.into()),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            allowed_content_types: default_allowed_content_types(),
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set allowed content types.
    #[must_use]
    pub fn with_allowed_content_types(mut self, types: Vec<String>) -> Self {
        self.allowed_content_types = types;
        self
    }

    /// Check if a content type is allowed. Parameters such as `; charset=`
    /// are ignored and the comparison is case-insensitive.
    #[must_use]
    pub fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        self.allowed_content_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(essence))
    }
}

impl From<&StorageSettings> for StorageConfig {
    fn from(settings: &StorageSettings) -> Self {
        Self::new(settings.provider.clone(), settings.public_base_url.clone())
            .with_max_file_size(settings.max_file_size)
            .with_allowed_content_types(settings.allowed_content_types.clone())
    }
}

fn trim_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
