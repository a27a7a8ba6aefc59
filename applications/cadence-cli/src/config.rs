//! CLI configuration
use cadence_catalog::CatalogConfig;
use cadence_playback::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub media: MediaSettings,
}

/// Where track metadata comes from
///
/// `url` wins over `fixture`; with neither, the built-in demo catalog is used.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub fixture: Option<PathBuf>,

    /// Artificial delay for fixture lookups
    #[serde(default)]
    pub latency_ms: u64,
}

/// Simulated media resource timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaSettings {
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,

    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Length reported for every stream
    #[serde(default = "default_track_seconds")]
    pub track_seconds: f64,

    /// Playback speed multiplier (2.0 plays a 30 s track in 15 s)
    #[serde(default = "default_speed")]
    pub speed: f64,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            load_delay_ms: default_load_delay_ms(),
            tick_ms: default_tick_ms(),
            track_seconds: default_track_seconds(),
            speed: default_speed(),
        }
    }
}

/// Catalog backend picked from the settings
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    Http(CatalogConfig),
    Fixture(PathBuf),
    Demo,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` (or `cadence.toml` in the working directory when it
    /// exists), then applies `CADENCE_*` overrides such as
    /// `CADENCE_CATALOG__URL` or `CADENCE_SESSION__VOLUME`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("cadence.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.session.volume) {
            return Err(ConfigError::Invalid(format!(
                "session.volume must be between 0 and 1, got {}",
                self.session.volume
            )));
        }
        if self.session.restart_threshold_seconds < 0.0 {
            return Err(ConfigError::Invalid(
                "session.restart_threshold_seconds cannot be negative".to_string(),
            ));
        }
        if self.media.tick_ms == 0 {
            return Err(ConfigError::Invalid("media.tick_ms must be positive".to_string()));
        }
        if self.media.track_seconds <= 0.0 || self.media.speed <= 0.0 {
            return Err(ConfigError::Invalid(
                "media.track_seconds and media.speed must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn catalog_source(&self) -> CatalogSource {
        if let Some(url) = &self.catalog.url {
            let mut config = CatalogConfig::new(url.clone());
            config.access_token.clone_from(&self.catalog.access_token);
            CatalogSource::Http(config)
        } else if let Some(path) = &self.catalog.fixture {
            CatalogSource::Fixture(path.clone())
        } else {
            CatalogSource::Demo
        }
    }
}

// Default values
fn default_load_delay_ms() -> u64 {
    300
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_track_seconds() -> f64 {
    30.0
}

fn default_speed() -> f64 {
    1.0
}
