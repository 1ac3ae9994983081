//! Handler for the health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Store**: Counts posts
/// 2. **Cache**: Backend ping (always ok for the in-process backends)
/// 3. **Media**: Storage root is usable
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "42 posts" },
///     "cache": { "status": "ok", "message": "redis, ttl 20s" },
///     "media": { "status": "ok", "message": "Writable" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store_check = check_store(&state).await;
    let cache_check = check_cache(&state).await;
    let media_check = check_media(&state).await;

    let all_healthy = store_check.is_ok() && cache_check.is_ok() && media_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            store: store_check,
            cache: cache_check,
            media: media_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_store(state: &AppState) -> CheckStatus {
    match state.listing_service.total_posts().await {
        Ok(total) => CheckStatus::ok(format!("{} posts", total)),
        Err(e) => CheckStatus::error(format!("Store error: {}", e)),
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    let cache = &state.page_cache;
    if cache.health_check().await {
        CheckStatus::ok(format!("{}, ttl {}s", cache.backend_name(), cache.ttl_seconds()))
    } else {
        CheckStatus::error(format!("{} cache unreachable", cache.backend_name()))
    }
}

async fn check_media(state: &AppState) -> CheckStatus {
    if state.media.health_check().await {
        CheckStatus::ok("Writable")
    } else {
        CheckStatus::error("Media storage unavailable")
    }
}
