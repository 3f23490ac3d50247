//! Two-phase process-wide logger.
//!
//! # Responsibilities
//! - Bootstrap a minimal logger before any configuration is loaded
//! - Upgrade it in place once configuration and the service registry exist
//! - Flush the sinks on demand (the orchestrator does this on every exit path)
//!
//! # Design Decisions
//! - Exactly one handle per process; repeated bootstrap calls return clones
//!   of the installed handle, never a second logger
//! - The upgrade swaps the installed sink set through a reload handle, so
//!   records logged before the upgrade are neither lost nor duplicated and
//!   every earlier holder of the handle observes the new configuration
//! - Bootstrap favours diagnostic completeness: the floor is `debug`
//!   regardless of environment; runtime raises it to `info` unless the
//!   configuration source declares otherwise

use std::env;
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use arc_swap::ArcSwap;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::app::ServiceRegistry;
use crate::config::schema::LoggingConfig;
use crate::error::BootError;
use crate::identity::{AppIdentity, EnvironmentTag};
use crate::observability::sink::{self, Enrichment, SinkLayer};

/// Severity floor during the bootstrap phase.
const BOOTSTRAP_DIRECTIVES: &str = "debug";

/// Severity floor after reconfiguration, unless the config overrides it.
const RUNTIME_FLOOR: &str = "info";

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Lifecycle stage of the process-wide logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerPhase {
    /// Minimal configuration, available before any config is loaded.
    Bootstrap,
    /// Full configuration, installed during builder finalization.
    Runtime,
}

/// Introspectable snapshot of the logger's current configuration.
#[derive(Debug, Clone)]
pub struct LoggerState {
    phase: LoggerPhase,
    min_level: String,
}

impl LoggerState {
    /// Current lifecycle stage.
    pub fn phase(&self) -> LoggerPhase {
        self.phase
    }

    /// Active filter directives (e.g., "debug" or "info,hyper=warn").
    pub fn min_level(&self) -> &str {
        &self.min_level
    }
}

/// The process-wide logging entry point.
///
/// Cheap to clone; all clones share the same underlying logger.
#[derive(Clone)]
pub struct LoggerHandle {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    identity: AppIdentity,
    environment: EnvironmentTag,
    reload: reload::Handle<SinkLayer, Registry>,
    state: ArcSwap<LoggerState>,
    file_sink: Mutex<Option<Arc<File>>>,
    flushes: AtomicU64,
}

impl LoggerHandle {
    /// Create (or retrieve) the bootstrap logger.
    ///
    /// The first call reads the environment tag, installs the global
    /// subscriber with a `debug` floor and app-name enrichment, and emits
    /// the hello record. Later calls return the existing handle unchanged.
    pub fn bootstrap(identity: AppIdentity) -> LoggerHandle {
        let mut pending = None;
        let handle = LOGGER
            .get_or_init(|| {
                let environment = EnvironmentTag::detect();
                let enrichment = Enrichment::bootstrap(identity.name().to_string());
                // The bootstrap directives are a fixed literal; this cannot fail.
                let layer = sink::layer_with(
                    EnvFilter::new(BOOTSTRAP_DIRECTIVES),
                    &environment,
                    enrichment,
                    None,
                );
                let (layer, reload) = reload::Layer::new(layer);
                pending = Some(layer);

                LoggerHandle {
                    inner: Arc::new(LoggerInner {
                        identity,
                        environment,
                        reload,
                        state: ArcSwap::from_pointee(LoggerState {
                            phase: LoggerPhase::Bootstrap,
                            min_level: BOOTSTRAP_DIRECTIVES.to_string(),
                        }),
                        file_sink: Mutex::new(None),
                        flushes: AtomicU64::new(0),
                    }),
                }
            })
            .clone();

        if let Some(layer) = pending {
            // Ignored when a test harness or embedder installed a subscriber
            // of its own; tracing macros still dispatch to that one.
            let _ = tracing_subscriber::registry().with(layer).try_init();
            tracing::info!(
                "Hello! It's a me, {} : v{}",
                handle.inner.identity.name(),
                handle.inner.identity.version_or_unknown()
            );
        }

        handle
    }

    /// Upgrade the logger with the configuration source and the registry.
    ///
    /// Raises the floor to `info`, adds machine and thread identity, applies
    /// config-declared level and sinks, then layers registry contributions
    /// on top. Failures propagate to the orchestrator; nothing is swallowed
    /// here.
    pub fn reconfigure(
        &self,
        config: &LoggingConfig,
        registry: &ServiceRegistry,
    ) -> Result<(), BootError> {
        let directives = compose_directives(config, registry);

        let enrichment = Enrichment::runtime(
            self.inner.identity.name().to_string(),
            machine_identity(),
            registry.log_fields().to_vec(),
        );

        let file = match &config.file {
            Some(path) => Some(Arc::new(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| {
                        BootError::Logging(format!(
                            "cannot open log file '{}': {e}",
                            path.display()
                        ))
                    })?,
            )),
            None => None,
        };

        let layer = sink::build_layer(
            &self.inner.environment,
            enrichment,
            &directives,
            file.clone(),
        )?;
        self.inner.reload.reload(layer).map_err(|e| {
            BootError::Logging(format!("failed to swap logger configuration: {e}"))
        })?;

        if let Ok(mut guard) = self.inner.file_sink.lock() {
            *guard = file;
        }
        self.inner.state.store(Arc::new(LoggerState {
            phase: LoggerPhase::Runtime,
            min_level: directives,
        }));

        Ok(())
    }

    /// Flush all sinks. Called exactly once per orchestrator run, on every
    /// exit path.
    pub fn flush(&self) {
        let _ = std::io::stdout().flush();
        if let Ok(guard) = self.inner.file_sink.lock() {
            if let Some(file) = guard.as_ref() {
                let _ = (&**file).flush();
            }
        }
        self.inner.flushes.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of flushes performed so far.
    pub fn flushes(&self) -> u64 {
        self.inner.flushes.load(Ordering::SeqCst)
    }

    /// Snapshot of the current configuration.
    pub fn state(&self) -> Arc<LoggerState> {
        self.inner.state.load_full()
    }

    /// Environment tag read at bootstrap.
    pub fn environment(&self) -> &EnvironmentTag {
        &self.inner.environment
    }

    /// Identity the logger was bootstrapped with.
    pub fn identity(&self) -> &AppIdentity {
        &self.inner.identity
    }
}

/// Compose the runtime filter directives.
///
/// The config-declared level replaces the `info` floor when present;
/// registry-contributed directives are layered after it.
fn compose_directives(config: &LoggingConfig, registry: &ServiceRegistry) -> String {
    let mut directives = config
        .level
        .clone()
        .unwrap_or_else(|| RUNTIME_FLOOR.to_string());
    for directive in registry.log_directives() {
        directives.push(',');
        directives.push_str(directive);
    }
    directives
}

fn machine_identity() -> String {
    env::var("HOSTNAME")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "unknown-host".to_string())
}
