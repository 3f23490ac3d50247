//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Bootstrap logger → Build → Configure → Run → exit code
//!     Any failure → Failed → exit code 1
//!     Always: flush log sink last
//!
//! Shutdown (shutdown.rs):
//!     Trigger (latched) or Ctrl-C → application drains and Run returns
//! ```
//!
//! # Design Decisions
//! - Ordered startup: logger first, then build, then configure, then run
//! - Each phase executes at most once per process invocation
//! - Stopping semantics belong to the application, not the orchestrator

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Phase, Startup};
