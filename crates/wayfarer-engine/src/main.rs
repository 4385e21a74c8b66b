//! Engine binary for the Wayfarer world-state engine.
//!
//! This is the main entry point that wires the persisted event log, the
//! zone coordinator, and a headless scene together. It ensures the requested
//! zones exist, links consecutive zones with portals, and records a visit
//! to each.
//!
//! # Usage
//!
//! ```text
//! wayfarer-engine [ZONE[:PERSONA]]...
//! ```
//!
//! With no arguments the `zones.startup` list from the configuration is
//! used, or a single `origin` zone if that list is empty.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `WAYFARER_CONFIG` or `wayfarer-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open the persisted event log
//! 4. Ensure each zone, materializing zones that already exist
//! 5. Link consecutive zones with portals in both directions
//! 6. Record a visit per zone and log the session summary

mod error;
mod observer_callback;
mod scene;

use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wayfarer_core::config::{LoggingConfig, StartupZone};
use wayfarer_core::{WayfarerConfig, ZoneStateCoordinator, ZoneStatus, journal};
use wayfarer_events::{EventLog, FileBlobStore};

use crate::error::EngineError;
use crate::observer_callback::EventLogObserver;
use crate::scene::TracingScene;

/// Environment variable naming the configuration file.
const ENV_CONFIG_PATH: &str = "WAYFARER_CONFIG";
/// Configuration file used when `WAYFARER_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "wayfarer-config.yaml";
/// Zone ensured when neither arguments nor configuration name one.
const FALLBACK_ZONE: &str = "origin";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration loading, logging setup, or any zone
/// operation fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::var(ENV_CONFIG_PATH)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = WayfarerConfig::load_or_default(&config_path).map_err(EngineError::from)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        world_name = %config.world.name,
        config = %config_path.display(),
        storage = %config.storage.dir.display(),
        "wayfarer-engine starting"
    );

    // 3. Open the event log.
    let store = FileBlobStore::new(&config.storage.dir);
    let mut log = EventLog::load_with_key(store, config.storage.log_key.clone());
    log.subscribe(EventLogObserver::new());
    if log.is_degraded() {
        warn!(
            key = %log.key(),
            "Stored event log is unreadable; this session will not persist new events"
        );
    }
    info!(
        events = log.len(),
        visited = journal::visited_zones(&log).len(),
        "Event log opened"
    );

    // 4-6. Ensure, link, and visit zones.
    let zones = requested_zones(std::env::args().skip(1), &config)?;
    let coordinator = ZoneStateCoordinator::from_config(&config);
    let mut scene = TracingScene::default();
    let mut previous: Option<String> = None;

    for zone in &zones {
        let handle = coordinator
            .ensure_zone(&mut log, &mut scene, &zone.id, zone.persona.as_deref())
            .map_err(EngineError::from)?;

        match handle.status {
            ZoneStatus::Generated => {
                for persona in &handle.record.personas {
                    journal::record_persona(&mut log, &zone.id, persona)
                        .map_err(EngineError::from)?;
                }
            }
            ZoneStatus::AlreadyExists => {
                info!(zone_id = %zone.id, "Zone recovered from log");
                coordinator.materialize(&handle, &mut scene);
            }
        }

        if let Some(prev) = previous.as_deref() {
            journal::ensure_portal(&mut log, prev, &zone.id).map_err(EngineError::from)?;
            journal::ensure_portal(&mut log, &zone.id, prev).map_err(EngineError::from)?;
        }
        journal::record_visit(&mut log, &zone.id).map_err(EngineError::from)?;
        previous = Some(zone.id.clone());
    }

    info!(
        zones = zones.len(),
        scenes_built = scene.zones_built(),
        events = log.len(),
        visited = ?journal::visited_zones(&log),
        "wayfarer-engine shutdown complete"
    );

    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the configured level is used.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let result = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

/// Resolve the zones for this run from arguments, then configuration.
fn requested_zones(
    args: impl Iterator<Item = String>,
    config: &WayfarerConfig,
) -> Result<Vec<StartupZone>, EngineError> {
    let zones = args.map(|a| parse_zone_arg(&a)).collect::<Result<Vec<_>, _>>()?;
    if !zones.is_empty() {
        return Ok(zones);
    }
    if !config.zones.startup.is_empty() {
        return Ok(config.zones.startup.clone());
    }
    Ok(vec![StartupZone {
        id: FALLBACK_ZONE.to_owned(),
        persona: None,
    }])
}

/// Parse `ZONE` or `ZONE:PERSONA`.
fn parse_zone_arg(argument: &str) -> Result<StartupZone, EngineError> {
    let (id, persona) = match argument.split_once(':') {
        Some((id, persona)) => (id, Some(persona)),
        None => (argument, None),
    };
    if id.is_empty() {
        return Err(EngineError::Argument {
            argument: argument.to_owned(),
            message: "zone id must not be empty".to_owned(),
        });
    }
    if persona.is_some_and(str::is_empty) {
        return Err(EngineError::Argument {
            argument: argument.to_owned(),
            message: "persona role after ':' must not be empty".to_owned(),
        });
    }
    Ok(StartupZone {
        id: id.to_owned(),
        persona: persona.map(str::to_owned),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> impl Iterator<Item = String> {
        items
            .iter()
            .map(|s| (*s).to_owned())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_zone_and_persona() {
        let zone = parse_zone_arg("harbor:ferryman").unwrap();
        assert_eq!(zone.id, "harbor");
        assert_eq!(zone.persona.as_deref(), Some("ferryman"));
        assert_eq!(parse_zone_arg("vale").unwrap().persona, None);
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(parse_zone_arg(":smith").is_err());
        assert!(parse_zone_arg("vale:").is_err());
    }

    #[test]
    fn arguments_win_over_config() {
        let mut config = WayfarerConfig::default();
        config.zones.startup.push(StartupZone {
            id: "configured".to_owned(),
            persona: None,
        });
        let zones = requested_zones(args(&["a", "b:bard"]), &config).unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[1].persona.as_deref(), Some("bard"));

        let zones = requested_zones(args(&[]), &config).unwrap();
        assert_eq!(zones[0].id, "configured");

        let zones = requested_zones(args(&[]), &WayfarerConfig::default()).unwrap();
        assert_eq!(zones[0].id, FALLBACK_ZONE);
    }
}
