// --- File: crates/services/quincho_backend/src/main.rs ---
mod app_state;
mod service_factory;

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use quincho_config::load_config;

use crate::app_state::AppState;

#[tokio::main]
async fn main() {
    quincho_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));
    let state = AppState::new(config.clone())
        .await
        .expect("Failed to initialize services");

    let api_router = Router::new()
        .route("/", get(|| async { "Quincho FIUNA reservation API" }))
        .merge(quincho_booking::routes::routes(
            state.booking.clone(),
            state.auth_service(),
        ))
        .merge(quincho_auth::routes::routes(state.auth_service()));

    #[allow(unused_mut)]
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use quincho_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Quincho API",
                version = "0.1.0",
                description = "Quincho FIUNA reservation service API docs"
            ),
            components(),
            tags((name = "quincho", description = "Reservation endpoints")),
            servers((url = "/api", description = "Main API prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        info!("adding Swagger UI at /api/docs");

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    info!("starting server at http://{addr}");
    info!("API endpoints available at http://{addr}/api");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
