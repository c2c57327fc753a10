//! Configuration module
//!
//! Runtime settings for the conversion service: HTTP server, batch limits, converter
//! binaries and deadlines. Everything is read from the environment (optionally seeded
//! from a `.env` file).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const SERVER_PORT: u16 = 3000;
const DETECT_TIMEOUT_SECS: u64 = 10;
const CONVERSION_TIMEOUT_SECS: u64 = 120;
const MAX_FILES_PER_BATCH: usize = 20;
const MAX_DOCUMENT_SIZE_MB: usize = 50;
const MAX_CONCURRENT_BATCHES: usize = 4;
const NATIVE_CONVERTER_PATH: &str = "soffice";
const DOCUMENT_ALLOWED_EXTENSIONS: &str = "doc,docx,odt,rtf,txt,html,htm,xls,xlsx,ods,ppt,pptx,odp";
const SERVICE_NAME: &str = "docbatch-api";

/// Settings for the batch conversion service
#[derive(Clone, Debug)]
pub struct ConverterServiceConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub service_name: String,
    // Workspace + converters
    pub workspace_root: PathBuf,
    pub native_converter_path: String,
    pub chromium_path: Option<String>,
    pub detect_timeout_secs: u64,
    pub conversion_timeout_secs: u64,
    // Batch limits
    pub max_files_per_batch: usize,
    pub max_document_size_bytes: usize,
    pub document_allowed_extensions: Vec<String>,
    pub max_concurrent_batches: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ConverterServiceConfig>);

impl Config {
    fn inner(&self) -> &ConverterServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ConverterServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn service_name(&self) -> &str {
        &self.inner().service_name
    }

    pub fn workspace_root(&self) -> &std::path::Path {
        &self.inner().workspace_root
    }

    pub fn native_converter_path(&self) -> &str {
        &self.inner().native_converter_path
    }

    pub fn chromium_path(&self) -> Option<&str> {
        self.inner().chromium_path.as_deref()
    }

    pub fn detect_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().detect_timeout_secs)
    }

    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().conversion_timeout_secs)
    }

    pub fn max_files_per_batch(&self) -> usize {
        self.inner().max_files_per_batch
    }

    pub fn max_document_size_bytes(&self) -> usize {
        self.inner().max_document_size_bytes
    }

    pub fn document_allowed_extensions(&self) -> &[String] {
        &self.inner().document_allowed_extensions
    }

    pub fn max_concurrent_batches(&self) -> usize {
        self.inner().max_concurrent_batches
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ConverterServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let workspace_root = env::var("WORKSPACE_ROOT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        let max_document_size_mb = env::var("MAX_DOCUMENT_SIZE_MB")
            .unwrap_or_else(|_| MAX_DOCUMENT_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_DOCUMENT_SIZE_MB);

        Ok(Self {
            server_port: env::var("SERVER_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .unwrap_or(SERVER_PORT),
            cors_origins,
            environment,
            service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| SERVICE_NAME.to_string()),
            workspace_root,
            native_converter_path: env::var("NATIVE_CONVERTER_PATH")
                .unwrap_or_else(|_| NATIVE_CONVERTER_PATH.to_string()),
            chromium_path: env::var("CHROMIUM_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            detect_timeout_secs: env::var("DETECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| DETECT_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DETECT_TIMEOUT_SECS),
            conversion_timeout_secs: env::var("CONVERSION_TIMEOUT_SECS")
                .unwrap_or_else(|_| CONVERSION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONVERSION_TIMEOUT_SECS),
            max_files_per_batch: env::var("MAX_FILES_PER_BATCH")
                .unwrap_or_else(|_| MAX_FILES_PER_BATCH.to_string())
                .parse()
                .unwrap_or(MAX_FILES_PER_BATCH),
            max_document_size_bytes: max_document_size_mb * 1024 * 1024,
            document_allowed_extensions: parse_list(
                &env::var("DOCUMENT_ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|_| DOCUMENT_ALLOWED_EXTENSIONS.to_string()),
            ),
            max_concurrent_batches: env::var("MAX_CONCURRENT_BATCHES")
                .unwrap_or_else(|_| MAX_CONCURRENT_BATCHES.to_string())
                .parse()
                .unwrap_or(MAX_CONCURRENT_BATCHES),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if is_production_name(&self.environment) && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.native_converter_path.trim().is_empty() {
            return Err(anyhow::anyhow!("NATIVE_CONVERTER_PATH must not be empty"));
        }

        if self.detect_timeout_secs == 0 || self.conversion_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "DETECT_TIMEOUT_SECS and CONVERSION_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.max_files_per_batch == 0 {
            return Err(anyhow::anyhow!("MAX_FILES_PER_BATCH must be greater than 0"));
        }

        if self.max_document_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_DOCUMENT_SIZE_MB must be greater than 0"));
        }

        if self.max_concurrent_batches == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_BATCHES must be greater than 0"
            ));
        }

        if self.document_allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "DOCUMENT_ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        Ok(())
    }

    /// Defaults without touching the environment. Used by tests and embedders.
    pub fn with_defaults(workspace_root: PathBuf) -> Self {
        Self {
            server_port: SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            service_name: SERVICE_NAME.to_string(),
            workspace_root,
            native_converter_path: NATIVE_CONVERTER_PATH.to_string(),
            chromium_path: None,
            detect_timeout_secs: DETECT_TIMEOUT_SECS,
            conversion_timeout_secs: CONVERSION_TIMEOUT_SECS,
            max_files_per_batch: MAX_FILES_PER_BATCH,
            max_document_size_bytes: MAX_DOCUMENT_SIZE_MB * 1024 * 1024,
            document_allowed_extensions: parse_list(DOCUMENT_ALLOWED_EXTENSIONS),
            max_concurrent_batches: MAX_CONCURRENT_BATCHES,
        }
    }
}
