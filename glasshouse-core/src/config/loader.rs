use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{GlassError, Result};

/// Loads and validates the configuration document.
///
/// Spec.md §6: "A single document (JSON) with recognised options" — this
/// is a bit-specified external interface, not ambient plumbing, so the
/// document is parsed as JSON rather than any other format.
///
/// A configuration error is fatal per spec.md §7 — the process refuses to
/// start. Validation happens eagerly, here, rather than being deferred to
/// first use.
pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = fs::read_to_string(p)
        .map_err(|e| GlassError::Config(format!("failed to read config file: {e}")))?;
    let cfg: Config = serde_json::from_str(&txt)
        .map_err(|e| GlassError::Config(format!("failed to parse config: {e}")))?;

    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> Result<()> {
    if !Path::new(&cfg.cert_file).exists() {
        return Err(GlassError::Config(format!(
            "certificate file not found: {}",
            cfg.cert_file
        )));
    }
    if !Path::new(&cfg.key_file).exists() {
        return Err(GlassError::Config(format!("key file not found: {}", cfg.key_file)));
    }

    if cfg.log_to_db {
        if cfg.analytics.mongo_url.is_none() {
            return Err(GlassError::Config(
                "log_to_db is set but mongo_url is missing".to_string(),
            ));
        }
        if cfg.analytics.mongo_database.is_none() || cfg.analytics.mongo_collection.is_none() {
            return Err(GlassError::Config(
                "log_to_db is set but mongo_database/mongo_collection is missing".to_string(),
            ));
        }
    }

    Ok(())
}
