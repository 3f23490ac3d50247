//! Application assembly and execution.
//!
//! # Data Flow
//! ```text
//! Build:
//!     AppBuilder (args + config + registry + routes)
//!     → AddServices extension point mutates it
//!     → finalize(): logger upgrade, then App
//!
//! Configure:
//!     ConfigureRequestPipeline extension point mutates the App's router
//!
//! Run:
//!     App.run(): bind listener → serve until stop trigger or signal
//! ```
//!
//! # Design Decisions
//! - The App is owned exclusively by the orchestrator during Run
//! - Stopping semantics are the application's: Ctrl-C or the latched
//!   shutdown trigger, whichever fires first

pub mod builder;
pub mod registry;

pub use builder::AppBuilder;
pub use registry::ServiceRegistry;

use std::net::SocketAddr;

use axum::routing::MethodRouter;
use axum::Router;
use tokio::net::TcpListener;

use crate::error::BootError;
use crate::lifecycle::shutdown::Shutdown;

/// The built, runnable application.
pub struct App {
    addr: SocketAddr,
    router: Router,
    registry: ServiceRegistry,
    shutdown: Shutdown,
}

impl App {
    pub(crate) fn new(addr: SocketAddr, router: Router, registry: ServiceRegistry) -> Self {
        Self {
            addr,
            router,
            registry,
            shutdown: Shutdown::new(),
        }
    }

    /// Services registered during Build.
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Handle for requesting a programmatic stop.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Add a route to the request pipeline.
    pub fn route(&mut self, path: &str, method_router: MethodRouter) -> &mut Self {
        self.router = std::mem::take(&mut self.router).route(path, method_router);
        self
    }

    /// Apply an arbitrary transformation to the request pipeline.
    pub fn map_router(&mut self, f: impl FnOnce(Router) -> Router) -> &mut Self {
        self.router = f(std::mem::take(&mut self.router));
        self
    }

    /// Run the application until it stops.
    ///
    /// Blocks (as an awaited call) until a shutdown signal arrives or the
    /// stop trigger fires, then drains gracefully.
    pub async fn run(self) -> Result<(), BootError> {
        let listener = TcpListener::bind(self.addr).await?;
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Application listening");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.wait() => tracing::info!("Stop requested, shutting down"),
                    _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown signal received"),
                }
            })
            .await?;

        tracing::info!("Application stopped");
        Ok(())
    }
}
