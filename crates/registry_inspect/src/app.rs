//! Main application logic.
//!
//! Loads the configured hierarchy into an [`EventRegistry`], applies the
//! configured registrations, sweeps unloaded plugins and reports what every
//! event type resolves to.

use crate::{cli::CliArgs, config::AppConfig};
use handler_registry::{
    EventRegistry, ListenerId, PluginId, Priority, Registration, RegistryStats, TypeTable,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

/// Resolution result for one event type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeReport {
    pub name: String,
    /// Whether the type holds handlers itself
    pub handleable: bool,
    /// Event names of the resolved chain, own list first
    pub chain: Vec<String>,
    /// Listener count per priority name across the chain
    pub listeners: BTreeMap<String, usize>,
}

/// Everything the inspector found.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub types: Vec<TypeReport>,
    /// Registrations that could not be registered
    pub rejected: usize,
    /// Registrations removed by plugin sweeps
    pub unloaded: usize,
    pub stats: RegistryStats,
}

/// The inspector application.
pub struct Application {
    config: AppConfig,
    unload_plugins: Vec<String>,
}

impl Application {
    /// Loads configuration, applies CLI overrides and validates the result.
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(level) = args.log_level {
            config.logging.level = level;
        }

        Self::from_config(config, args.unload_plugins)
    }

    pub fn from_config(
        config: AppConfig,
        unload_plugins: Vec<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;
        Ok(Self {
            config,
            unload_plugins,
        })
    }

    /// Builds the registry and produces the report.
    pub fn run(&self) -> Result<InspectionReport, Box<dyn std::error::Error>> {
        let table = self.config.type_table();
        let names = table.names();
        let registry = EventRegistry::new(table);

        let mut plugins: HashMap<&str, PluginId> = HashMap::new();
        let mut listeners: HashMap<&str, ListenerId> = HashMap::new();
        let mut rejected = 0;

        for settings in &self.config.registrations {
            let plugin = *plugins.entry(settings.plugin.as_str()).or_default();
            let listener = *listeners.entry(settings.listener.as_str()).or_default();
            let registration = Registration::with_level(listener, plugin, settings.priority.level()?)
                .ignoring_cancelled(settings.ignore_cancelled);

            if let Err(e) = registry.register(&settings.event, Arc::new(registration)) {
                warn!("⚠️ {} ({}): {}", settings.listener, settings.plugin, e);
                rejected += 1;
            }
        }

        let mut unloaded = 0;
        for name in &self.unload_plugins {
            match plugins.get(name.as_str()) {
                Some(plugin) => {
                    let removed = registry.unregister_all_of(*plugin);
                    info!("🔌 Unloaded plugin {}: {} registrations removed", name, removed);
                    unloaded += removed;
                }
                None => warn!("⚠️ Plugin {} has no registrations", name),
            }
        }

        let mut types = Vec::with_capacity(names.len());
        for name in names {
            types.push(Self::report_type(&registry, &name)?);
        }

        let stats = registry.stats();
        info!(
            "📊 {} event types, {} handler lists, {} registrations",
            stats.resolved_types, stats.handler_lists, stats.registrations
        );

        Ok(InspectionReport {
            types,
            rejected,
            unloaded,
            stats,
        })
    }

    fn report_type(
        registry: &EventRegistry<TypeTable>,
        name: &str,
    ) -> Result<TypeReport, Box<dyn std::error::Error>> {
        let handleable = registry.resolve(name)?.is_some();
        let chain: Vec<String> = registry
            .resolve_chain(name)?
            .iter()
            .map(|list| list.event().to_string())
            .collect();

        let mut counts = BTreeMap::new();
        for priority in Priority::ALL {
            let count = registry.listeners_for(name, priority)?.len();
            if count > 0 {
                counts.insert(priority.name().to_string(), count);
            }
        }

        info!("🔗 {}: {}", name, chain.join(" -> "));
        Ok(TypeReport {
            name: name.to_string(),
            handleable,
            chain,
            listeners: counts,
        })
    }
}
