//! Configuration management for facecue
//!
//! Holds the tunable thresholds of the classification pipeline with schema
//! versioning and migrations. Configuration is stored in
//! `~/.facecue/config.json`; every field falls back to its default when
//! missing from the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Current config schema version
const CURRENT_VERSION: u32 = 1;

/// Global config instance for caching
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown config version: {0}")]
    UnknownVersion(u32),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version for migrations
    pub version: u32,
    /// Hand-to-face proximity thresholds
    pub proximity: ProximityConfig,
    /// Debounce parameters for hand state changes
    pub confirmation: ConfirmationConfig,
    /// Two-hand gesture thresholds
    pub gesture: GestureConfig,
    /// Facial expression thresholds
    pub expression: ExpressionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            proximity: ProximityConfig::default(),
            confirmation: ConfirmationConfig::default(),
            gesture: GestureConfig::default(),
            expression: ExpressionConfig::default(),
        }
    }
}

/// Adaptive proximity threshold parameters
///
/// The closer the face is to the camera, the more the classifier relies on
/// depth and the less on planar distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Planar threshold before depth weighting
    pub base_planar_threshold: f64,
    /// Depth threshold before depth weighting
    pub base_depth_threshold: f64,
    /// Multiplier from face depth to depth weight
    pub depth_weight_gain: f64,
    /// Upper bound on the depth weight
    pub max_depth_weight: f64,
    /// Floor for the planar threshold
    pub min_planar_threshold: f64,
    /// Floor for the depth threshold
    pub min_depth_threshold: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            base_planar_threshold: 0.25,
            base_depth_threshold: 0.15,
            depth_weight_gain: 4.5,
            max_depth_weight: 0.9,
            min_planar_threshold: 0.05,
            min_depth_threshold: 0.03,
        }
    }
}

/// Debounce parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Consecutive matching observations needed to confirm a state change
    pub required_confirmations: u32,
    /// Maximum gap between matching observations in milliseconds
    pub max_gap_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            required_confirmations: 3,
            max_gap_ms: 50,
        }
    }
}

/// Gesture detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Mean fingertip distance below which both hands count as together
    pub hands_together_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            hands_together_threshold: 0.07,
        }
    }
}

/// Expression detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    /// Per-axis distance under which a hand point covers a lip landmark
    pub occlusion_margin: f64,
    /// Lip gap below which the lips count as compressed
    pub lip_compression_threshold: f64,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            occlusion_margin: 0.07,
            lip_compression_threshold: 0.012,
        }
    }
}

impl Config {
    /// Check that every threshold is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            (
                "proximity.base_planar_threshold",
                self.proximity.base_planar_threshold,
            ),
            (
                "proximity.base_depth_threshold",
                self.proximity.base_depth_threshold,
            ),
            (
                "proximity.depth_weight_gain",
                self.proximity.depth_weight_gain,
            ),
            (
                "gesture.hands_together_threshold",
                self.gesture.hands_together_threshold,
            ),
            ("expression.occlusion_margin", self.expression.occlusion_margin),
            (
                "expression.lip_compression_threshold",
                self.expression.lip_compression_threshold,
            ),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {}", value),
                });
            }
        }

        let max_weight = self.proximity.max_depth_weight;
        if !(0.0..=1.0).contains(&max_weight) {
            return Err(ConfigError::Invalid {
                field: "proximity.max_depth_weight",
                reason: format!("must be within 0.0..=1.0, got {}", max_weight),
            });
        }

        for (field, value) in [
            (
                "proximity.min_planar_threshold",
                self.proximity.min_planar_threshold,
            ),
            (
                "proximity.min_depth_threshold",
                self.proximity.min_depth_threshold,
            ),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }

        if self.confirmation.required_confirmations == 0 {
            return Err(ConfigError::Invalid {
                field: "confirmation.required_confirmations",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Get the path to the config file (~/.facecue/config.json)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.json")
}

/// Get the path to the facecue directory (~/.facecue)
pub fn get_config_dir() -> PathBuf {
    home_dir_or_fallback().join(".facecue")
}

/// Get the home directory, falling back to /tmp if unavailable
fn home_dir_or_fallback() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        tracing::error!("Could not determine home directory, using /tmp");
        PathBuf::from("/tmp")
    })
}

/// Load configuration from a file, migrating older schemas
///
/// A missing file yields the defaults.
pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::info!("Config file not found at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&contents)?;

    let original_version = config.version;
    let migrated = migrate_config(config)?;
    if migrated.version != original_version {
        save_to_path(&migrated, path)?;
    }

    migrated.validate()?;
    Ok(migrated)
}

/// Save configuration to a file, creating parent directories as needed
pub fn save_to_path(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }

    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;

    tracing::info!("Config saved to {:?}", path);
    Ok(())
}

/// Migrate configuration from older schema versions
fn migrate_config(mut config: Config) -> Result<Config, ConfigError> {
    let original_version = config.version;

    while config.version < CURRENT_VERSION {
        config = apply_migration(config)?;
    }

    if config.version != original_version {
        tracing::info!(
            "Migrated config from version {} to {}",
            original_version,
            config.version
        );
    }

    Ok(config)
}

/// Apply a single migration step
fn apply_migration(config: Config) -> Result<Config, ConfigError> {
    match config.version {
        // Version 0 -> 1: thresholds were hard-coded before the file existed
        0 => {
            let mut migrated = config;
            migrated.version = 1;
            Ok(migrated)
        }
        v => Err(ConfigError::UnknownVersion(v)),
    }
}

/// Get the current configuration
///
/// The config is cached in memory and loaded from disk on first access. A
/// file that fails to load is logged and replaced by the defaults.
pub fn get_config() -> Config {
    CONFIG
        .get_or_init(|| {
            load_from_path(&get_config_path()).unwrap_or_else(|e| {
                tracing::error!("Failed to load config, using defaults: {}", e);
                Config::default()
            })
        })
        .clone()
}
