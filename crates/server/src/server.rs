use axum::{Router, routing::get};

use std::sync::Arc;

use crate::{Alert, ServerError, material_methods, materials};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Prefix of the `X-<app>-*` alert headers.
    pub app_name: Arc<str>,
}

impl ServerState {
    pub fn new(engine: Engine, app_name: &str) -> Self {
        Self {
            engine: Arc::new(engine),
            app_name: Arc::from(app_name),
        }
    }

    pub(crate) fn bad_request(
        &self,
        title: &str,
        entity_name: &'static str,
        error_key: &'static str,
    ) -> ServerError {
        ServerError::BadRequest(Alert {
            app_name: self.app_name.clone(),
            title: title.to_string(),
            entity_name,
            error_key,
        })
    }
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/api/materials",
            get(materials::list).post(materials::create),
        )
        .route(
            "/api/materials/{id}",
            get(materials::get)
                .put(materials::update)
                .patch(materials::partial_update)
                .delete(materials::delete),
        )
        .route(
            "/api/material-methods",
            get(material_methods::list).post(material_methods::create),
        )
        .route(
            "/api/material-methods/{id}",
            get(material_methods::get)
                .put(material_methods::update)
                .patch(material_methods::partial_update)
                .delete(material_methods::delete),
        )
        .with_state(state)
}

/// Build the application router.
pub fn app(engine: Engine, app_name: &str) -> Router {
    router(ServerState::new(engine, app_name))
}

pub async fn run_with_listener(
    engine: Engine,
    app_name: &str,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, app_name)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    app_name: &str,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;
    let app_name = app_name.to_string();

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, &app_name, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
