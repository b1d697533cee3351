use std::net::SocketAddr;

use anyhow::Context;
use axum::{middleware::from_fn, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    decompression::RequestDecompressionLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    db::{self, DatabaseConfig},
    middleware::{
        method_not_allowed::method_not_allowed, not_found::not_found,
        trace_response_body::trace_response_body,
    },
    repository::BookRepository,
    route,
    state::ApiState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::route::books::list_books::list_books,
        crate::route::books::get_book::get_book,
        crate::route::books::create_book::create_book,
        crate::route::books::update_book::update_book,
        crate::route::books::delete_book::delete_book,
    ),
    components(schemas(
        crate::model::Book,
        crate::model::BookUpdate,
        crate::route::books::list_books::ListBooksResponse,
        crate::route::books::get_book::GetBookResponse,
        crate::route::books::create_book::CreateBookResponse,
        crate::route::books::update_book::UpdateBookResponse,
        crate::route::books::delete_book::DeleteBookResponse,
        crate::error::ApiErrorResponse,
        crate::error::ApiErrorBody,
        crate::error::ErrorMessage,
    )),
    tags((name = "books", description = "CRUD over the books table"))
)]
struct ApiDoc;

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub socket_address: SocketAddr,
    pub database: DatabaseConfig,
}

impl ServerConfig {
    pub async fn from_config_file(path: &str) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {path}"))?;

        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;

        Ok(config)
    }
}

pub(crate) fn router(state: ApiState) -> Router {
    Router::<ApiState>::new()
        .nest("/books", route::books::app())
        .fallback(not_found)
        .layer(from_fn(method_not_allowed))
        .layer(from_fn(trace_response_body))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
                )
                .layer(RequestDecompressionLayer::new())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
}

pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let pool = db::create_pool(&self.config.database).await?;

        let state = ApiState::new(BookRepository::new(pool.clone()));

        let app = router(state);

        tracing::info!(addr = %self.config.socket_address, "Starting server");

        let listener = TcpListener::bind(&self.config.socket_address)
            .await
            .context("Bind failed")?;

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

        pool.close().await;

        tracing::info!("Database connection pool closed");

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");

        tracing::info!("CTRL+C received");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;

        tracing::info!("SIGTERM received");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
