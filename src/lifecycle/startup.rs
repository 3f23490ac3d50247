//! Startup orchestration.
//!
//! # Responsibilities
//! - Bootstrap the process-wide logger before anything else
//! - Sequence Build → Configure → Run, logging each phase transition
//! - Map the first failure from any phase to exit code 1
//! - Flush the log sink exactly once on every exit path
//!
//! # Design Decisions
//! - Fail fast: single forward path, no retries, terminal on first failure
//! - Extension points are stored fields with no-op defaults, invoked at
//!   most once per run
//! - The flush is a drop guard wrapping the whole sequence, not per-phase
//!   cleanup, so it also runs on unwind
//! - Phase markers are logged before the corresponding extension point
//!   runs; the logger upgrade happens inside builder finalization, after
//!   services and their logging contributions are registered

use std::fmt;
use std::path::PathBuf;

use tracing::{error, info};

use crate::app::{App, AppBuilder};
use crate::error::{BootError, BoxError};
use crate::identity::AppIdentity;
use crate::observability::logging::LoggerHandle;

type AddServices = Box<dyn FnOnce(&mut AppBuilder) -> Result<(), BoxError> + Send>;
type ConfigurePipeline = Box<dyn FnOnce(&mut App) -> Result<(), BoxError> + Send>;

/// Phases of the startup state machine.
///
/// Single forward path; any phase can transition directly to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Building,
    Configuring,
    Running,
    Stopped,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Start => "Start",
            Phase::Building => "Building",
            Phase::Configuring => "Configuring",
            Phase::Running => "Running",
            Phase::Stopped => "Stopped",
            Phase::Failed => "Failed",
        })
    }
}

/// Orchestrates application startup and shutdown.
///
/// Construction bootstraps the logger; [`Startup::run`] executes the
/// sequence and returns the process exit code.
pub struct Startup {
    args: Vec<String>,
    config_path: Option<PathBuf>,
    logger: LoggerHandle,
    phase: Phase,
    add_services: Option<AddServices>,
    configure_pipeline: Option<ConfigurePipeline>,
}

impl Startup {
    /// Create a startup sequence, resolving identity from the binary.
    pub fn new(args: Vec<String>) -> Self {
        Self::with_identity(args, AppIdentity::detect())
    }

    /// Create a startup sequence with an explicit identity.
    pub fn with_identity(args: Vec<String>, identity: AppIdentity) -> Self {
        let logger = LoggerHandle::bootstrap(identity);
        Self {
            args,
            config_path: None,
            logger,
            phase: Phase::Start,
            add_services: None,
            configure_pipeline: None,
        }
    }

    /// Load configuration from the given TOML file during Build.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Set the AddServices extension point (default: no-op).
    pub fn add_services<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut AppBuilder) -> Result<(), BoxError> + Send + 'static,
    {
        self.add_services = Some(Box::new(f));
        self
    }

    /// Set the ConfigureRequestPipeline extension point (default: no-op).
    pub fn configure_request_pipeline<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut App) -> Result<(), BoxError> + Send + 'static,
    {
        self.configure_pipeline = Some(Box::new(f));
        self
    }

    /// The process-wide logger handle.
    pub fn logger(&self) -> &LoggerHandle {
        &self.logger
    }

    /// Execute Build → Configure → Run and return the exit code.
    ///
    /// Returns 0 only when all three phases complete without error; any
    /// failure is logged with phase attribution and yields 1. The sink
    /// flush is the very last action on both paths.
    pub async fn run(mut self) -> i32 {
        let _flush = FlushGuard {
            logger: self.logger.clone(),
        };

        info!("Initialising");

        match self.execute().await {
            Ok(()) => {
                self.phase = Phase::Stopped;
                info!("I love you buhbye!");
                0
            }
            Err(err) => {
                let failed_in = self.phase;
                self.phase = Phase::Failed;
                error!(
                    phase = %failed_in,
                    error = %err,
                    detail = ?err,
                    "An error occured; Terminating"
                );
                1
            }
        }
    }

    async fn execute(&mut self) -> Result<(), BootError> {
        self.phase = Phase::Building;
        let mut app = self.build()?;

        self.phase = Phase::Configuring;
        self.configure(&mut app)?;

        self.phase = Phase::Running;
        Self::run_app(app).await
    }

    fn build(&mut self) -> Result<App, BootError> {
        let mut builder = AppBuilder::from_args(
            self.logger.clone(),
            std::mem::take(&mut self.args),
            self.config_path.as_deref(),
        )?;

        info!("Building for {}", builder.environment());

        info!("Adding services");
        if let Some(add_services) = self.add_services.take() {
            add_services(&mut builder).map_err(BootError::Service)?;
        }

        builder.finalize()
    }

    fn configure(&mut self, app: &mut App) -> Result<(), BootError> {
        info!("Configuring the request pipeline");
        if let Some(configure) = self.configure_pipeline.take() {
            configure(app).map_err(BootError::Pipeline)?;
        }
        Ok(())
    }

    async fn run_app(app: App) -> Result<(), BootError> {
        info!("Cocked, locked and ready to rock!");
        app.run().await
    }
}

/// Flushes the log sink when dropped, covering every exit path.
struct FlushGuard {
    logger: LoggerHandle,
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        self.logger.flush();
    }
}
