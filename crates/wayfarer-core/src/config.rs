//! Configuration loading and typed config structures for Wayfarer.
//!
//! The configuration lives in `wayfarer-config.yaml`. This module defines
//! strongly-typed structs that mirror the YAML structure, a loader that
//! reads and validates the file, and conversions into the option structs
//! consumed by the world crate.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use wayfarer_events::DEFAULT_LOG_KEY;
use wayfarer_types::TerrainSize;
use wayfarer_world::placement::{
    DEFAULT_MARGIN, DEFAULT_MAX_ATTEMPTS, DEFAULT_NPC_BUFFER, DEFAULT_OBJECT_BUFFER,
};
use wayfarer_world::{BufferRule, PlacementOptions, ScatterSettings, Seed};

/// Environment variable overriding [`StorageConfig::dir`].
pub const ENV_STORAGE_DIR: &str = "WAYFARER_STORAGE_DIR";
/// Environment variable overriding [`LoggingConfig::level`].
pub const ENV_LOG_LEVEL: &str = "WAYFARER_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds inconsistent values.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `wayfarer-config.yaml`. Every field has a
/// default, so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WayfarerConfig {
    /// Terrain settings shared by generation and placement.
    #[serde(default)]
    pub world: WorldConfig,

    /// Placement solver tunables.
    #[serde(default)]
    pub placement: PlacementConfig,

    /// Procedural zone generation and startup zones.
    #[serde(default)]
    pub zones: ZonesConfig,

    /// Event log persistence.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WayfarerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `WAYFARER_STORAGE_DIR` overrides `storage.dir`
    /// - `WAYFARER_LOG` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields the
    /// defaults (with environment overrides applied).
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file) for every failure other than
    /// a missing file.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_STORAGE_DIR) {
            self.storage.dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }

    /// Check cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_owned()));

        if !(self.world.terrain_width > 0.0 && self.world.terrain_depth > 0.0) {
            return invalid("world terrain size must be positive");
        }
        if self.placement.max_attempts == 0 {
            return invalid("placement.max_attempts must be at least 1");
        }
        if self.placement.margin < 0.0 {
            return invalid("placement.margin must not be negative");
        }
        if self.placement.npc_buffer_distance < 0.0 || self.placement.object_buffer_distance < 0.0
        {
            return invalid("placement buffer distances must not be negative");
        }
        if self.zones.min_props > self.zones.max_props {
            return invalid("zones.min_props exceeds zones.max_props");
        }
        if self.zones.min_personas > self.zones.max_personas {
            return invalid("zones.min_personas exceeds zones.max_personas");
        }
        if self.storage.log_key.is_empty() {
            return invalid("storage.log_key must not be empty");
        }
        Ok(())
    }

    /// Terrain extents from the `world` section.
    pub const fn terrain_size(&self) -> TerrainSize {
        TerrainSize::new(self.world.terrain_width, self.world.terrain_depth)
    }

    /// Placement solver options built from `world` and `placement`.
    pub fn placement_options(&self) -> PlacementOptions {
        PlacementOptions {
            max_attempts: self.placement.max_attempts,
            terrain_size: self.terrain_size(),
            margin: self.placement.margin,
            npc_buffer_distance: self.placement.npc_buffer_distance,
            object_buffer_distance: self.placement.object_buffer_distance,
            avoid_paths: self.placement.avoid_paths,
            seed: self.placement.seed.clone(),
            buffer_rule: self.placement.buffer_rule,
            allow_unsafe_fallback: self.placement.allow_unsafe_fallback,
        }
    }

    /// Zone generation settings built from `world`, `placement`, and `zones`.
    pub const fn scatter_settings(&self) -> ScatterSettings {
        ScatterSettings {
            terrain_size: self.terrain_size(),
            margin: self.placement.margin,
            min_props: self.zones.min_props,
            max_props: self.zones.max_props,
            min_personas: self.zones.min_personas,
            max_personas: self.zones.max_personas,
        }
    }
}

/// Terrain configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable world name, used in startup logs.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Terrain extent along x.
    #[serde(default = "default_terrain_extent")]
    pub terrain_width: f64,

    /// Terrain extent along z.
    #[serde(default = "default_terrain_extent")]
    pub terrain_depth: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            terrain_width: default_terrain_extent(),
            terrain_depth: default_terrain_extent(),
        }
    }
}

/// Placement solver configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlacementConfig {
    /// Candidate positions tried per entity.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Keep-out border from the terrain edge.
    #[serde(default = "default_margin")]
    pub margin: f64,

    /// Clearance around characters.
    #[serde(default = "default_npc_buffer")]
    pub npc_buffer_distance: f64,

    /// Clearance around props.
    #[serde(default = "default_object_buffer")]
    pub object_buffer_distance: f64,

    /// Keep entities off paths unless they override it.
    #[serde(default = "default_true")]
    pub avoid_paths: bool,

    /// Seed for authored placement. A number or a string.
    #[serde(default)]
    pub seed: Seed,

    /// How candidate and existing buffers combine.
    #[serde(default)]
    pub buffer_rule: BufferRule,

    /// Place at a random position when attempts run out.
    #[serde(default)]
    pub allow_unsafe_fallback: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            margin: default_margin(),
            npc_buffer_distance: default_npc_buffer(),
            object_buffer_distance: default_object_buffer(),
            avoid_paths: true,
            seed: Seed::default(),
            buffer_rule: BufferRule::default(),
            allow_unsafe_fallback: false,
        }
    }
}

/// Procedural zone configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZonesConfig {
    /// Inclusive lower bound on props per generated zone.
    #[serde(default = "default_min_props")]
    pub min_props: u32,

    /// Inclusive upper bound on props per generated zone.
    #[serde(default = "default_max_props")]
    pub max_props: u32,

    /// Inclusive lower bound on personas per generated zone.
    #[serde(default = "default_min_personas")]
    pub min_personas: u32,

    /// Inclusive upper bound on personas per generated zone.
    #[serde(default = "default_max_personas")]
    pub max_personas: u32,

    /// Zones ensured at startup, linked in order by portals.
    #[serde(default)]
    pub startup: Vec<StartupZone>,
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            min_props: default_min_props(),
            max_props: default_max_props(),
            min_personas: default_min_personas(),
            max_personas: default_max_personas(),
            startup: Vec::new(),
        }
    }
}

/// A zone to ensure at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartupZone {
    /// Zone identifier.
    pub id: String,

    /// Role for the zone's first persona.
    #[serde(default)]
    pub persona: Option<String>,
}

/// Event log persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the event log blob.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    /// Blob key of the event log.
    #[serde(default = "default_log_key")]
    pub log_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            log_key: default_log_key(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Wayfarer".to_owned()
}

const fn default_terrain_extent() -> f64 {
    50.0
}

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

const fn default_margin() -> f64 {
    DEFAULT_MARGIN
}

const fn default_npc_buffer() -> f64 {
    DEFAULT_NPC_BUFFER
}

const fn default_object_buffer() -> f64 {
    DEFAULT_OBJECT_BUFFER
}

const fn default_true() -> bool {
    true
}

const fn default_min_props() -> u32 {
    20
}

const fn default_max_props() -> u32 {
    39
}

const fn default_min_personas() -> u32 {
    2
}

const fn default_max_personas() -> u32 {
    3
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_key() -> String {
    DEFAULT_LOG_KEY.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}
