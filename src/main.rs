//! Demo binary: a minimal axum application wired through the bootstrap
//! sequence, with a standard middleware stack on the request pipeline.

use std::time::Duration;

use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use app_bootstrap::{AppIdentity, Startup};

/// Example service resolved from the registry by the pipeline hook.
#[derive(Clone)]
struct Greeting(String);

#[tokio::main]
async fn main() {
    let startup = Startup::with_identity(
        std::env::args().collect(),
        AppIdentity::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    )
    .add_services(|builder| {
        builder
            .registry_mut()
            .register(Greeting("Hello from app-bootstrap".to_string()));
        builder.registry_mut().contribute_log_field("component", "demo");
        Ok(())
    })
    .configure_request_pipeline(|app| {
        let greeting = app
            .registry()
            .get::<Greeting>()
            .cloned()
            .unwrap_or_else(|| Greeting("Hello".to_string()));

        app.route("/", get(move || async move { greeting.0.clone() }))
            .route("/health", get(|| async { "OK" }))
            .map_router(|router| {
                router.layer(
                    ServiceBuilder::new()
                        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                        .layer(PropagateRequestIdLayer::x_request_id())
                        .layer(TraceLayer::new_for_http())
                        .layer(TimeoutLayer::new(Duration::from_secs(30))),
                )
            });
        Ok(())
    });

    std::process::exit(startup.run().await);
}
