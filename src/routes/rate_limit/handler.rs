use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;

use crate::AppState;
use crate::error::AppError;
use crate::rate_limit::LimitScope;
use crate::utils::success_to_api_response;

#[derive(Debug, Serialize)]
pub struct RateLimitStatus {
    pub scope: LimitScope,
    pub key: String,
    pub remaining: usize,
    /// Unix 毫秒
    pub reset_at: i64,
    pub max_requests: usize,
    pub window_ms: i64,
}

/// 查询某个 key 的限流状态，不计入请求次数
#[axum::debug_handler]
pub async fn get_rate_limit_status(
    State(state): State<AppState>,
    Path((scope, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let scope: LimitScope = scope
        .parse()
        .map_err(|e: crate::rate_limit::UnknownScope| AppError::Validation(e.to_string()))?;
    let limiter = state.limiters.get(scope);

    Ok(success_to_api_response(RateLimitStatus {
        scope,
        remaining: limiter.remaining_requests(&key),
        reset_at: limiter.reset_time(&key),
        max_requests: limiter.max_requests(),
        window_ms: limiter.window_ms(),
        key,
    }))
}
