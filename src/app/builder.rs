//! Application builder handed to the AddServices extension point.

use std::net::SocketAddr;
use std::path::Path;

use axum::routing::MethodRouter;
use axum::Router;

use crate::app::registry::ServiceRegistry;
use crate::app::App;
use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::AppConfig;
use crate::config::validation::ValidationError;
use crate::error::BootError;
use crate::identity::EnvironmentTag;
use crate::observability::logging::LoggerHandle;

/// Mutable application builder, bound to the process arguments.
///
/// Created during Build; the AddServices extension point receives it to
/// register services, adjust configuration and add routes. Finalization
/// upgrades the logger and produces the runnable [`App`].
pub struct AppBuilder {
    args: Vec<String>,
    config: AppConfig,
    registry: ServiceRegistry,
    router: Router,
    logger: LoggerHandle,
}

impl AppBuilder {
    /// Create a builder, loading configuration from `config_path` when given.
    pub(crate) fn from_args(
        logger: LoggerHandle,
        args: Vec<String>,
        config_path: Option<&Path>,
    ) -> Result<Self, BootError> {
        let config = match config_path {
            Some(path) => load_config(path)?,
            None => AppConfig::default(),
        };

        Ok(Self {
            args,
            config,
            registry: ServiceRegistry::default(),
            router: Router::new(),
            logger,
        })
    }

    /// Process arguments the builder was bound to.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Environment tag resolved at bootstrap.
    pub fn environment(&self) -> &EnvironmentTag {
        self.logger.environment()
    }

    /// Loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// Registered services and logging contributions.
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Mutable access to the service registry.
    pub fn registry_mut(&mut self) -> &mut ServiceRegistry {
        &mut self.registry
    }

    /// Add a route to the application.
    pub fn route(&mut self, path: &str, method_router: MethodRouter) -> &mut Self {
        self.router = std::mem::take(&mut self.router).route(path, method_router);
        self
    }

    /// Apply an arbitrary transformation to the router.
    pub fn map_router(&mut self, f: impl FnOnce(Router) -> Router) -> &mut Self {
        self.router = f(std::mem::take(&mut self.router));
        self
    }

    /// Finalize the builder into a runnable [`App`].
    ///
    /// This is where the deferred logger upgrade runs: services are already
    /// registered, so their logging contributions are honored, and every
    /// line logged afterwards carries the runtime configuration.
    pub fn finalize(self) -> Result<App, BootError> {
        self.logger.reconfigure(&self.config.logging, &self.registry)?;

        let addr: SocketAddr = self.config.listener.bind_address.parse().map_err(|_| {
            BootError::Config(ConfigError::Validation(vec![
                ValidationError::InvalidBindAddress(self.config.listener.bind_address.clone()),
            ]))
        })?;

        Ok(App::new(addr, self.router, self.registry))
    }
}
