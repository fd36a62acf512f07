use axum::{
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::rate_limit::SlidingWindowRateLimiter;
use crate::utils::{error_codes, error_to_api_response};

pub const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("请求过于频繁，请在{retry_after_secs}秒后重试")]
    RateLimited { reset_at: i64, retry_after_secs: u64 },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("内部服务器错误")]
    Internal,
}

impl AppError {
    /// 根据限流器当前状态构造 429 错误
    pub fn rate_limited(limiter: &SlidingWindowRateLimiter, key: &str, now_ms: i64) -> Self {
        let reset_at = limiter.reset_time(key);
        let wait_ms = u64::try_from(reset_at.saturating_sub(now_ms)).unwrap_or(0);
        AppError::RateLimited {
            reset_at,
            retry_after_secs: wait_ms.div_ceil(1000).max(1),
        }
    }

    fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            AppError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, error_codes::RATE_LIMIT),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let mut response =
            (status, error_to_api_response::<()>(code, self.to_string())).into_response();

        if let AppError::RateLimited {
            reset_at,
            retry_after_secs,
        } = self
        {
            let headers = response.headers_mut();
            headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            headers.insert(RATE_LIMIT_RESET, HeaderValue::from(reset_at));
        }

        response
    }
}
