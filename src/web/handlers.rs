use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::panel::PanelError;
use crate::web::SharedPanel;

#[derive(Debug, Deserialize)]
pub struct ControlChange {
    pub name: String,
    pub value: Value,
}

/// Current panel snapshot: loaded flag, title, controls with their values.
pub async fn get_panel(State(panel): State<SharedPanel>) -> Response {
    let panel = panel.read().await;
    if !panel.is_loaded() {
        return not_loaded_response();
    }

    Json(json!({
        "code": 200,
        "message": "OK",
        "data": panel.snapshot()
    }))
    .into_response()
}

/// Apply one finished edit and push it to the device.
///
/// A failed push is reported in the envelope but still answers 200: the edit
/// is applied optimistically either way, matching the panel's behavior.
pub async fn set_control(
    State(panel): State<SharedPanel>,
    Json(change): Json<ControlChange>,
) -> Response {
    let mut panel = panel.write().await;
    match panel.set_control(&change.name, change.value.clone()).await {
        Ok(()) => Json(json!({
            "code": 200,
            "message": "OK",
            "data": { "name": change.name, "value": change.value, "delivered": true }
        }))
        .into_response(),
        Err(PanelError::Device(e)) => {
            warn!("Patch for {} not delivered: {}", change.name, e);
            Json(json!({
                "code": 200,
                "message": "Edit applied, patch not delivered",
                "data": { "name": change.name, "value": change.value, "delivered": false }
            }))
            .into_response()
        }
        Err(PanelError::NotLoaded) => not_loaded_response(),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "code": 422,
                "message": e.to_string(),
                "data": null
            })),
        )
            .into_response(),
    }
}

/// Re-fetch device status and return the updated snapshot.
pub async fn refresh_panel(State(panel): State<SharedPanel>) -> Response {
    let mut panel = panel.write().await;
    match panel.refresh().await {
        Ok(()) => Json(json!({
            "code": 200,
            "message": "OK",
            "data": panel.snapshot()
        }))
        .into_response(),
        Err(e) => {
            warn!("Refresh failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "code": 502,
                    "message": format!("refresh failed: {}", e),
                    "data": null
                })),
            )
                .into_response()
        }
    }
}

/// Redirect the viewer to the device's MJPEG stream with a fresh
/// cache-buster, so every request re-fetches the stream.
pub async fn stream_redirect(State(panel): State<SharedPanel>) -> Redirect {
    let url = panel.read().await.reload_image();
    Redirect::temporary(&url)
}

/// Forward a shutdown request to the device. Fire-and-forget on the device
/// side; failures to reach it are still reported here.
pub async fn shutdown_device(State(panel): State<SharedPanel>) -> Response {
    match panel.read().await.shutdown().await {
        Ok(()) => Json(json!({
            "code": 200,
            "message": "Shutdown requested",
            "data": null
        }))
        .into_response(),
        Err(e) => {
            warn!("Shutdown request failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "code": 502,
                    "message": format!("shutdown failed: {}", e),
                    "data": null
                })),
            )
                .into_response()
        }
    }
}

fn not_loaded_response() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "code": 503,
            "message": "Device status not loaded yet",
            "data": null
        })),
    )
        .into_response()
}
