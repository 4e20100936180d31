use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use meetbook_backend::{build_router, build_state, StartupError};
use meetbook_config::{AppConfig, DatabaseConfig};
use serde_json::Value;
use tower::ServiceExt;

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_in_memory_storage() {
    let state = build_state(Arc::new(AppConfig::default())).await.unwrap();
    let app = build_router(&state);

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["calendar"], "disabled");
}

#[tokio::test]
async fn test_scheduling_routes_are_mounted_under_api() {
    let state = build_state(Arc::new(AppConfig::default())).await.unwrap();
    let app = build_router(&state);

    let response = app
        .oneshot(
            Request::get("/api/meeting-types/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn test_unknown_time_zone_fails_startup() {
    let mut config = AppConfig::default();
    config.scheduling.time_zone = "Mars/Olympus_Mons".to_string();
    match build_state(Arc::new(config)).await {
        Err(StartupError::Scheduling(_)) => {}
        Err(other) => panic!("unexpected startup error: {other}"),
        Ok(_) => panic!("startup should fail for an unknown time zone"),
    }
}

#[cfg(feature = "database")]
#[tokio::test]
async fn test_sql_storage_is_used_when_configured() {
    let path = std::env::temp_dir().join(format!("meetbook-backend-{}.db", uuid::Uuid::new_v4()));
    let config = AppConfig {
        database: Some(DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
        }),
        ..AppConfig::default()
    };
    let state = build_state(Arc::new(config)).await.unwrap();
    assert_eq!(state.storage, "sql");

    let response = build_router(&state)
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(json_body(response).await["status"], "ok");
}
