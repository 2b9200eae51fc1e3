//! Backend entry-point: wires REST endpoints, sweeps, and OpenAPI docs.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use polyclinic_backend::server::{self, ServerConfig};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    server::run(ServerConfig::from_env()).await
}
