use crate::api::response::ApiResponse;
use serde_json::{Value, json};

/// Liveness check
pub async fn health_check() -> ApiResponse<Value> {
    ApiResponse::ok(
        json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        }),
        "Service is healthy",
    )
}
