//! Configuration management for the registry inspector.
//!
//! The config file declares the event type hierarchy, the registrations to
//! load into it and how to log. It is TOML, loaded with serde.

use handler_registry::{EventTypeDescriptor, Priority, TypeTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Event type hierarchy
    #[serde(default)]
    pub events: Vec<EventTypeDescriptor>,
    /// Registrations to load into the hierarchy
    #[serde(default)]
    pub registrations: Vec<RegistrationSettings>,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// A priority given either by name (`"HIGH"`) or by raw level (`2`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrioritySetting {
    Name(String),
    Level(i32),
}

impl Default for PrioritySetting {
    fn default() -> Self {
        PrioritySetting::Name(Priority::Normal.name().to_string())
    }
}

impl PrioritySetting {
    /// The raw level to register with. Raw levels are passed through as-is.
    pub fn level(&self) -> Result<i32, String> {
        match self {
            PrioritySetting::Name(name) => name
                .parse::<Priority>()
                .map(Priority::level)
                .map_err(|e| e.to_string()),
            PrioritySetting::Level(level) => Ok(*level),
        }
    }
}

/// One listener registration, with plugin and listener given by label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationSettings {
    pub event: String,
    pub plugin: String,
    pub listener: String,
    #[serde(default)]
    pub priority: PrioritySetting,
    #[serde(default)]
    pub ignore_cancelled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingSettings::default(),
            events: vec![
                EventTypeDescriptor::new("Event").abstract_type(),
                EventTypeDescriptor::new("PlayerEvent")
                    .extends("Event")
                    .abstract_type(),
                EventTypeDescriptor::new("PlayerJoinEvent").extends("PlayerEvent"),
                EventTypeDescriptor::new("PlayerQuitEvent").extends("PlayerEvent"),
            ],
            registrations: vec![RegistrationSettings {
                event: "PlayerJoinEvent".to_string(),
                plugin: "greeter".to_string(),
                listener: "JoinListener".to_string(),
                priority: PrioritySetting::default(),
                ignore_cancelled: false,
            }],
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the
    /// specified path and returns the default configuration.
    pub async fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Builds the type table the event registry resolves against.
    pub fn type_table(&self) -> TypeTable {
        self.events.iter().cloned().collect()
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        let mut declared = HashSet::new();
        for event in &self.events {
            if event.name.is_empty() {
                return Err("Event type names cannot be empty".to_string());
            }
            if !declared.insert(event.name.as_str()) {
                return Err(format!("Event type declared twice: {}", event.name));
            }
        }

        for registration in &self.registrations {
            if !declared.contains(registration.event.as_str()) {
                return Err(format!(
                    "Registration for undeclared event type: {}",
                    registration.event
                ));
            }
            registration.priority.level().map_err(|e| {
                format!("Registration for {}: {e}", registration.event)
            })?;
        }

        Ok(())
    }
}
