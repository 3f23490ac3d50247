//! Startup error taxonomy.
//!
//! Every phase surfaces its error to the orchestrator's single top-level
//! handler; nothing is swallowed inside a phase. All variants map to exit
//! code 1.

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Boxed error for caller-supplied extension points.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced during Build, Configure or Run.
#[derive(Debug, Error)]
pub enum BootError {
    /// Configuration source was missing, malformed or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logger reconfiguration failed (bad directive, unconstructable sink).
    #[error("logging error: {0}")]
    Logging(String),

    /// The AddServices extension point failed.
    #[error("service registration failed: {0}")]
    Service(#[source] BoxError),

    /// The ConfigureRequestPipeline extension point failed.
    #[error("pipeline configuration failed: {0}")]
    Pipeline(#[source] BoxError),

    /// The application failed while binding or running.
    #[error("application run failed: {0}")]
    Run(#[from] std::io::Error),
}
