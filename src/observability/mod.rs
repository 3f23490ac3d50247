//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! process start:
//!     → logging.rs bootstrap (debug floor, console sink, app-name enrichment)
//!
//! builder finalization:
//!     → logging.rs reconfigure (info floor, machine/thread enrichment,
//!       config-declared level and sinks, registry contributions)
//!
//! every exit path:
//!     → logging.rs flush (exactly once per run)
//! ```
//!
//! # Design Decisions
//! - One process-wide logger handle; reconfiguration swaps the installed
//!   layers in place so earlier holders observe the upgrade
//! - Console format is fixed at bootstrap by the environment tag:
//!   human-readable template for Development, JSON lines otherwise
//! - The file sink always writes JSON lines

pub mod logging;
pub(crate) mod sink;

pub use logging::{LoggerHandle, LoggerPhase, LoggerState};
