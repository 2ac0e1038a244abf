//! Shared application state and its construction from configuration.

use crate::error::StartupError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use veil_broker::{BrokerLoader, BrokerRegistry};
use veil_core::{AppConfig, TransportKind};
use veil_db::Database;
use veil_dispatch::{Dispatcher, RemovalTransport, SimulatedTransport, SmtpTransport};
use veil_scanner::{HibpClient, ScanService};

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Broker registry, also the dispatcher's directory
    pub registry: BrokerRegistry,
    /// Removal request dispatcher
    pub dispatcher: Dispatcher,
    /// Batch and scan persistence
    pub db: Database,
    /// Exposure scanner
    pub scanner: ScanService,
}

impl AppState {
    /// Assemble state from already-built parts. The dispatcher resolves
    /// brokers against `registry`.
    #[must_use]
    pub fn new(
        registry: BrokerRegistry,
        transport: Arc<dyn RemovalTransport>,
        db: Database,
        scanner: ScanService,
    ) -> Self {
        let dispatcher = Dispatcher::new(Arc::new(registry.clone()), transport);
        Self {
            registry,
            dispatcher,
            db,
            scanner,
        }
    }

    /// Build everything the service needs from `config`: broker registry,
    /// transport, database (migrated) and scanner.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let registry = registry_for(config)?;
        let transport = transport_for(config)?;

        let db = Database::connect(&config.database.url, config.database.max_connections).await?;
        db.run_migrations().await?;

        let scanner = scanner_for(config)?;
        let dispatcher =
            Dispatcher::from_config(Arc::new(registry.clone()), transport, &config.dispatch);

        Ok(Self {
            registry,
            dispatcher,
            db,
            scanner,
        })
    }
}

/// Broker definitions from the configured directory, or the built-in set.
pub fn registry_for(config: &AppConfig) -> veil_broker::Result<BrokerRegistry> {
    match &config.brokers.definitions_dir {
        Some(dir) => {
            let loader = BrokerLoader::new(dir.clone())?;
            let registry = BrokerRegistry::load_from(&loader)?;
            info!(count = registry.count(), dir = %dir.display(), "loaded broker definitions");
            Ok(registry)
        }
        None => {
            let registry = BrokerRegistry::with_defaults();
            info!(count = registry.count(), "using built-in broker definitions");
            Ok(registry)
        }
    }
}

/// The removal transport selected by `dispatch.transport`.
pub fn transport_for(
    config: &AppConfig,
) -> Result<Arc<dyn RemovalTransport>, veil_dispatch::TransportError> {
    let transport: Arc<dyn RemovalTransport> = match config.dispatch.transport {
        TransportKind::Simulated => Arc::new(SimulatedTransport::from_config(&config.dispatch)),
        TransportKind::Smtp => Arc::new(SmtpTransport::from_settings(&config.smtp)?),
    };
    Ok(transport)
}

/// A scanner using HIBP when an API key is configured, static breach data
/// otherwise.
pub fn scanner_for(config: &AppConfig) -> veil_scanner::Result<ScanService> {
    let scanner = ScanService::with_fixtures();
    match HibpClient::from_config(&config.scanning)? {
        Some(client) => {
            info!(
                timeout = ?Duration::from_secs(config.scanning.timeout_secs),
                "breach lookups use HIBP"
            );
            Ok(scanner.with_breach_source(Arc::new(client)))
        }
        None => {
            warn!("no HIBP API key configured, breach lookups use static data");
            Ok(scanner)
        }
    }
}
