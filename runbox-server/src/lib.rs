//! HTTP front end for the runbox sandbox
//!
//! Exposes `GET /health` and `POST /execute` over axum and wires the
//! layered [`ServerConfig`] into a [`SandboxService`].

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod telemetry;

use runbox_sandbox::SandboxService;

pub use config::{ConfigOverrides, ServerConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use server::{serve, shutdown_signal};
pub use telemetry::{init_tracing, LogFormat};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: SandboxService,
}

impl AppState {
    pub fn new(service: SandboxService) -> Self {
        Self { service }
    }
}
