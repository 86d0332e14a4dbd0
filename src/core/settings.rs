//! Hub settings loaded from files and environment variables.

use crate::core::DeliveryPolicy;
use crate::error::{HubError, Result};
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable hub behaviour.
///
/// Every field has a default, so an empty file yields the same hub as
/// `NotificationHub::new()`.
///
/// ```yaml
/// delivery: isolate      # or "propagate" (default)
/// history_capacity: 16   # requires the `history` feature
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    /// What a failing subscriber does to a notification pass.
    pub delivery: DeliveryPolicy,
    /// Number of committed states to keep for rollback.
    pub history_capacity: Option<usize>,
}

impl HubSettings {
    /// Load settings from a YAML, TOML, or JSON file.
    ///
    /// The format is detected from the file extension.
    ///
    /// # Errors
    ///
    /// Returns `HubError::Settings` if the extension is unsupported, the file
    /// is missing, or its contents do not describe valid settings.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use state_hub::prelude::*;
    ///
    /// # fn main() -> Result<()> {
    /// let settings = HubSettings::from_file("config/hub.yaml")?;
    /// let hub = NotificationHub::<String>::builder()
    ///     .with_settings(&settings)
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(path.as_ref(), None)
    }

    /// Load settings from a file, then apply `PREFIX_*` environment overrides.
    ///
    /// For prefix `HUB`, `HUB_DELIVERY=isolate` overrides `delivery` and
    /// `HUB_HISTORY_CAPACITY=32` overrides `history_capacity`.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file).
    pub fn from_file_with_env(path: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        Self::load(path.as_ref(), Some(Self::environment(prefix)))
    }

    fn environment(prefix: &str) -> Environment {
        Environment::with_prefix(prefix).try_parsing(true)
    }

    fn load(path: &Path, env: Option<Environment>) -> Result<Self> {
        validate_extension(path)?;

        if !path.exists() {
            return Err(HubError::Settings(format!(
                "Settings file not found: {}",
                path.display()
            )));
        }

        let mut builder = config::Config::builder().add_source(File::from(path).required(true));
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        let settings = builder
            .build()
            .map_err(|e| HubError::Settings(format!("Failed to read {}: {}", path.display(), e)))?;

        settings.try_deserialize::<Self>().map_err(|e| {
            HubError::Settings(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

fn validate_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| {
            HubError::Settings(format!(
                "Unable to determine file format for: {}",
                path.display()
            ))
        })?;

    match extension {
        "yaml" | "yml" | "toml" | "json" => Ok(()),
        _ => Err(HubError::Settings(format!(
            "Unsupported file extension: {}. Supported: .yaml, .yml, .toml, .json",
            extension
        ))),
    }
}
