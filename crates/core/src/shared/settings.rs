use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_ATTACHMENT_NAME, OBJECT_MIN_CONFIDENCE, OVERLAY_MIN_CONFIDENCE, REENCODE_QUALITY,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {} is malformed: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Runtime configuration: identifiers, credentials, thresholds and adapter
/// locations.
///
/// Values come from an optional JSON file, then environment variables
/// (`ACCESS_TOKEN`, `SLACK_CHANNEL`, `COLLECTION_NAME` and `DOORBELL_*`
/// overrides) on top.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub channel_id: String,
    pub collection_id: String,
    pub access_token: String,
    pub object_min_confidence: f32,
    pub overlay_min_confidence: f32,
    pub quality: u8,
    pub attachment_name: String,
    pub font_path: Option<PathBuf>,
    pub labels_url: Option<String>,
    pub faces_url: Option<String>,
    pub provider_api_key: Option<String>,
    pub object_root: Option<PathBuf>,
    pub ledger_dir: Option<PathBuf>,
    pub identity_directory: Option<PathBuf>,
    pub concurrent_detection: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            collection_id: String::new(),
            access_token: String::new(),
            object_min_confidence: OBJECT_MIN_CONFIDENCE,
            overlay_min_confidence: OVERLAY_MIN_CONFIDENCE,
            quality: REENCODE_QUALITY,
            attachment_name: DEFAULT_ATTACHMENT_NAME.to_string(),
            font_path: None,
            labels_url: None,
            faces_url: None,
            provider_api_key: None,
            object_root: None,
            ledger_dir: None,
            identity_directory: None,
            concurrent_detection: false,
        }
    }
}

impl Settings {
    /// `<config dir>/Doorbell/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Doorbell").join("settings.json"))
    }

    /// `<local data dir>/Doorbell/ledger`, used when no ledger directory is
    /// configured.
    pub fn default_ledger_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("Doorbell").join("ledger"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` (or the default settings file when it exists), applies
    /// the process environment. Callers validate once their own overrides
    /// are applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };
        base.with_env(|name| std::env::var(name).ok())
    }

    /// Overlays values from an environment lookup onto these settings.
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("ACCESS_TOKEN") {
            self.access_token = v;
        }
        if let Some(v) = lookup("SLACK_CHANNEL") {
            self.channel_id = v;
        }
        if let Some(v) = lookup("COLLECTION_NAME") {
            self.collection_id = v;
        }
        if let Some(v) = lookup("DOORBELL_MIN_CONFIDENCE") {
            self.object_min_confidence = parse_number("DOORBELL_MIN_CONFIDENCE", &v)?;
        }
        if let Some(v) = lookup("DOORBELL_OVERLAY_CONFIDENCE") {
            self.overlay_min_confidence = parse_number("DOORBELL_OVERLAY_CONFIDENCE", &v)?;
        }
        if let Some(v) = lookup("DOORBELL_QUALITY") {
            self.quality = parse_number("DOORBELL_QUALITY", &v)?;
        }
        if let Some(v) = lookup("DOORBELL_LABELS_URL") {
            self.labels_url = Some(v);
        }
        if let Some(v) = lookup("DOORBELL_FACES_URL") {
            self.faces_url = Some(v);
        }
        if let Some(v) = lookup("DOORBELL_PROVIDER_API_KEY") {
            self.provider_api_key = Some(v);
        }
        if let Some(v) = lookup("DOORBELL_FONT") {
            self.font_path = Some(PathBuf::from(v));
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token.is_empty() {
            return Err(ConfigError::Missing("ACCESS_TOKEN"));
        }
        if self.channel_id.is_empty() {
            return Err(ConfigError::Missing("SLACK_CHANNEL"));
        }
        if self.collection_id.is_empty() {
            return Err(ConfigError::Missing("COLLECTION_NAME"));
        }
        check_confidence("object_min_confidence", self.object_min_confidence)?;
        check_confidence("overlay_min_confidence", self.overlay_min_confidence)?;
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Invalid {
                name: "quality",
                reason: format!("must be between 1 and 100, got {}", self.quality),
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: format!("{value:?}: {e}"),
    })
}

fn check_confidence(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("must be between 0 and 100, got {value}"),
        });
    }
    Ok(())
}
