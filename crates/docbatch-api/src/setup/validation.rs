//! Configuration validation
//!
//! Catches misconfiguration at startup instead of on the first batch.

use anyhow::{Context, Result};
use docbatch_core::Config;

/// Highest batch concurrency we accept without a warning; each batch may own a browser.
const MAX_RECOMMENDED_CONCURRENT_BATCHES: usize = 32;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();
    if config.is_production() && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    std::fs::create_dir_all(config.workspace_root()).with_context(|| {
        format!(
            "WORKSPACE_ROOT {} is not a usable directory",
            config.workspace_root().display()
        )
    })?;

    if config.max_concurrent_batches() > MAX_RECOMMENDED_CONCURRENT_BATCHES {
        tracing::warn!(
            max_concurrent_batches = config.max_concurrent_batches(),
            "MAX_CONCURRENT_BATCHES is very high - every batch may launch its own browser"
        );
    }

    if let Ok(raw) = std::env::var("HTTP_CONCURRENCY_LIMIT") {
        if raw.parse::<usize>().is_err() {
            return Err(anyhow::anyhow!(
                "HTTP_CONCURRENCY_LIMIT must be a positive integer, got '{}'",
                raw
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbatch_core::ConverterServiceConfig;

    #[test]
    fn test_creates_missing_workspace_root() {
        let dir = std::env::temp_dir().join(format!("docbatch-validation-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let config = Config(Box::new(ConverterServiceConfig::with_defaults(dir.clone())));

        validate_config(&config).unwrap();
        assert!(dir.is_dir());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_rejects_invalid_limits() {
        let mut inner = ConverterServiceConfig::with_defaults(std::env::temp_dir());
        inner.max_files_per_batch = 0;
        assert!(validate_config(&Config(Box::new(inner))).is_err());
    }
}
