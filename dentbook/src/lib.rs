//! # dentbook: appointment booking between patients and dentists
//!
//! `dentbook` is a small REST service where patients register, browse dentists, and book
//! appointments, and dentists review their schedule and record the outcome of each visit.
//! A typed [`client`] with an explicit login [`client::session::Session`] is shipped alongside
//! the server.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). Handlers in [`api`] talk
//! to persistence through the [`db::Store`] trait, which has an in-memory backend (the default,
//! also used by every test) and a PostgreSQL backend selected with `database.type: external`.
//!
//! Requests carry a bearer token issued at registration or login ([`auth::session`]). Protected
//! handlers take a [`auth::current_user::RequireRole`] extractor that verifies the token, loads
//! the user, and rejects callers whose stored role is not in the route's role set.
//!
//! | Route | Allowed |
//! |---|---|
//! | `POST /api/users/register`, `POST /api/users/login` | anyone |
//! | `GET /api/dentists` | patients |
//! | `POST /api/appointments` | patients |
//! | `GET /api/appointments/doctor/{doctor_id}` | the dentist themself |
//! | `GET /api/appointments/patient/{patient_id}` | the patient themself |
//! | `POST /api/appointments/{id}/results` | the appointment's dentist |
//! | `GET /api/appointments/{id}/results` | the appointment's patient |
//! | `POST /api/checkups/request` | patients |
//! | `POST /api/checkups/upload` | dentists |
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use dentbook::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = dentbook::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     dentbook::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See [`config`] for the file format and the `DENTBOOK_` environment overrides.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod telemetry;
#[cfg(test)]
pub mod test_utils;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    http::{self, HeaderValue},
    routing::{get, post},
};
use bon::Builder;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    api::handlers::{appointments, auth as auth_handlers, checkups, dentists},
    config::CorsOrigin,
    db::Store,
    openapi::ApiDoc,
};

pub use config::Config;
pub use types::{AppointmentId, DentistId, Role, UserId};

/// Shared state handed to every handler.
#[derive(Clone, Builder)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
}

/// Embedded PostgreSQL migrations.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    // A wildcard anywhere in the list opens CORS to every origin
    let allow_origin = if cors_config.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Browsers send the origin without a trailing slash
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router: API routes, health check, API docs, and request tracing.
///
/// CORS is left to the caller since it depends on configuration that can fail to parse.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/users/register", post(auth_handlers::register))
        .route("/users/login", post(auth_handlers::login))
        .route("/dentists", get(dentists::list_dentists))
        .route("/appointments", post(appointments::create_appointment))
        .route("/appointments/doctor/{doctor_id}", get(appointments::list_for_doctor))
        .route("/appointments/patient/{patient_id}", get(appointments::list_for_patient))
        .route(
            "/appointments/{id}/results",
            post(appointments::attach_outcome).get(appointments::fetch_outcome),
        )
        .route("/checkups/request", post(checkups::request_checkup))
        .route("/checkups/upload", post(checkups::upload_checkup));

    Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// The running service: router plus the resources it has to release on shutdown.
pub struct Application {
    router: Router,
    state: AppState,
    config: Config,
}

impl Application {
    /// Connect the configured store and build the router
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!(
            host = %config.host,
            port = config.port,
            database = config.database.kind(),
            otel = config.enable_otel_export,
            "Starting dentbook"
        );

        let store = db::create_store(&config.database).await?;
        let state = AppState::builder().store(store).config(config.clone()).build();
        let router = build_router(state.clone()).layer(create_cors_layer(&config)?);

        Ok(Self { router, state, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("dentbook listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing store...");
        self.state.store.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
