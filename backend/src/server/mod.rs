//! HTTP server bootstrap and lifecycle.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::info;

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{AppState, build_state, seed_registry};

#[cfg(debug_assertions)]
use crate::ApiDoc;
use crate::inbound::http::{self, health::HealthState};
use crate::outbound::persistence::InMemoryStore;

/// Run the server until it is stopped.
///
/// Lifecycle: wire services, start the sweep scheduler, serve HTTP; on exit,
/// flip the liveness probe, stop the scheduler, and wait for its loops.
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let store = Arc::new(InMemoryStore::new());
    if let Err(error) = seed_registry(&store) {
        return Err(std::io::Error::other(format!(
            "failed to seed specialty registry: {error}"
        )));
    }

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let AppState {
        http: http_state,
        mut scheduler,
    } = build_state(&store, clock, &server_config.sweeps);
    scheduler.start();

    let health = web::Data::new(HealthState::new());
    let state = web::Data::new(http_state);
    let app_health = health.clone();
    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .app_data(app_health.clone())
            .configure(http::configure);
        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
        app
    })
    .bind(server_config.bind_addr)?;

    info!(bind = %server_config.bind_addr, "server starting");
    health.mark_ready();
    let result = server.run().await;

    health.mark_draining();
    scheduler.shutdown().await;
    result
}
