//! Configuration module
//!
//! Runtime configuration is read from the process environment (optionally seeded
//! from a `.env` file) and validated once at startup.

use std::env;

use crate::constants::{DEFAULT_PREVIEW_PAGES, MAX_PREVIEW_PAGES, MIN_PREVIEW_PAGES};

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_DOCUMENT_SIZE_MB: usize = 10;
const PREVIEW_STRATEGY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DOCUMENT_EXTENSIONS: &str = "pdf,doc,docx,txt,rtf,jpg,jpeg,png,gif";

/// Preview subsystem settings
#[derive(Clone, Debug)]
pub struct PreviewSettings {
    /// Operator kill switch for preview generation.
    pub enabled: bool,
    pub default_pages: u32,
    /// Wall-clock bound for a single strategy attempt. Zero disables the bound.
    pub strategy_timeout_secs: u64,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_pages: DEFAULT_PREVIEW_PAGES,
            strategy_timeout_secs: PREVIEW_STRATEGY_TIMEOUT_SECS,
        }
    }
}

/// Portal configuration
#[derive(Clone, Debug)]
pub struct PortalConfig {
    pub server_port: u16,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub max_document_size_bytes: usize,
    pub document_allowed_extensions: Vec<String>,
    pub preview: PreviewSettings,
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let max_document_size_mb = env::var("MAX_DOCUMENT_SIZE_MB")
            .unwrap_or_else(|_| MAX_DOCUMENT_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_DOCUMENT_SIZE_MB);

        let preview = PreviewSettings {
            enabled: env::var("PREVIEW_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            default_pages: env::var("PREVIEW_DEFAULT_PAGES")
                .unwrap_or_else(|_| DEFAULT_PREVIEW_PAGES.to_string())
                .parse()
                .unwrap_or(DEFAULT_PREVIEW_PAGES),
            strategy_timeout_secs: env::var("PREVIEW_STRATEGY_TIMEOUT_SECS")
                .unwrap_or_else(|_| PREVIEW_STRATEGY_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(PREVIEW_STRATEGY_TIMEOUT_SECS),
        };

        let config = PortalConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./storage/app/public".to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4000/storage".to_string()),
            max_document_size_bytes: max_document_size_mb * 1024 * 1024,
            document_allowed_extensions: parse_list(
                &env::var("DOCUMENT_ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|_| DEFAULT_DOCUMENT_EXTENSIONS.to_string()),
            ),
            preview,
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.local_storage_path.trim().is_empty() {
            return Err(anyhow::anyhow!("LOCAL_STORAGE_PATH must not be empty"));
        }

        if !(MIN_PREVIEW_PAGES..=MAX_PREVIEW_PAGES).contains(&self.preview.default_pages) {
            return Err(anyhow::anyhow!(
                "PREVIEW_DEFAULT_PAGES must be between {} and {}",
                MIN_PREVIEW_PAGES,
                MAX_PREVIEW_PAGES
            ));
        }

        if self.document_allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "DOCUMENT_ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.document_allowed_extensions
            .iter()
            .any(|allowed| *allowed == extension)
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
