// File: services/meetbook_backend/src/router.rs
use axum::{extract::State, routing::get, Json, Router};
use meetbook_scheduling::routes as scheduling_routes;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

async fn health(State(state): State<AppState>) -> Json<Value> {
    let database_ok = state.scheduling.repository.health_check().await.is_ok();
    Json(json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "storage": state.storage,
        "calendar": state.calendar,
    }))
}

/// Full application router: scheduling API and health under `/api`,
/// plus Swagger UI when the `openapi` feature is enabled.
pub fn build_router(state: &AppState) -> Router {
    let health_router = Router::new()
        .route("/health", get(health))
        .with_state(state.clone());

    let api_router = Router::new().nest(
        "/api",
        scheduling_routes::routes(state.scheduling.clone()).merge(health_router),
    );

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = api_router;

    #[cfg(feature = "openapi")]
    {
        use meetbook_scheduling::doc::SchedulingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        tracing::info!("Adding Swagger UI at /api/docs");
        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", SchedulingApiDoc::openapi());
        app = app.merge(swagger_ui);
    }

    app.layer(TraceLayer::new_for_http())
}
