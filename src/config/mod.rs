//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → consumed by the application builder
//!
//! Logging declarations:
//!     AppConfig.logging
//!     → applied on top of the runtime logger defaults
//!       during builder finalization
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload in the core
//! - All fields have defaults to allow minimal (or absent) configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AppConfig;
pub use schema::ListenerConfig;
pub use schema::LoggingConfig;
