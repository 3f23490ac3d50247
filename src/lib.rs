//! Reusable application bootstrap sequence.
//!
//! Sequences Build → Configure → Run around an axum application while
//! guaranteeing that startup and shutdown are observable:
//!
//! - a process-wide logger bootstraps before configuration is loaded and is
//!   upgraded in place once configuration and services are available;
//! - caller-supplied extension points (`AddServices`,
//!   `ConfigureRequestPipeline`) customize the application at fixed points
//!   in the sequence, each with a safe no-op default;
//! - every failure bubbles to one top-level handler that logs it and maps
//!   it to exit code 1, and the log sink is flushed on every exit path.
//!
//! ```no_run
//! use app_bootstrap::{AppIdentity, Startup};
//! use axum::routing::get;
//!
//! #[tokio::main]
//! async fn main() {
//!     let startup = Startup::with_identity(
//!         std::env::args().collect(),
//!         AppIdentity::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
//!     )
//!     .configure_request_pipeline(|app| {
//!         app.route("/health", get(|| async { "OK" }));
//!         Ok(())
//!     });
//!
//!     std::process::exit(startup.run().await);
//! }
//! ```

// Core subsystems
pub mod app;
pub mod config;
pub mod identity;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use app::{App, AppBuilder, ServiceRegistry};
pub use config::AppConfig;
pub use error::{BootError, BoxError};
pub use identity::{AppIdentity, EnvironmentTag};
pub use lifecycle::{Shutdown, Startup};
pub use observability::{LoggerHandle, LoggerPhase, LoggerState};
