use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Json, Path, State},
    http::{Extensions, HeaderMap, StatusCode},
    response::IntoResponse,
};

use super::model::{CreateOrderNumberRequest, OrderNumberInfo};
use crate::AppState;
use crate::error::AppError;
use crate::middleware::client_ip;
use crate::order_number::{ParsedOrderNumber, generate_daily_order_number};
use crate::rate_limit::LimitScope;
use crate::utils::success_to_api_response;

#[axum::debug_handler]
pub async fn create_order_number(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
    Json(req): Json<CreateOrderNumberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let key = match req.user_id.as_deref().map(str::trim) {
        Some(user_id) if !user_id.is_empty() => user_id.to_owned(),
        _ => {
            let remote = extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0);
            client_ip(&headers, remote)
        }
    };

    let limiter = state.limiters.get(LimitScope::OrderPlacement);
    if !limiter.is_allowed(&key) {
        tracing::debug!("Order placement rate limit hit for {}", key);
        return Err(AppError::rate_limited(limiter, &key, state.clock.now_ms()));
    }

    let outcome =
        generate_daily_order_number(state.sequence.as_ref(), state.clock.as_ref(), req.cafe_id)
            .await;
    tracing::info!(
        "Issued order number {} for cafe {} (fallback: {})",
        outcome.order_number(),
        req.cafe_id,
        outcome.is_fallback()
    );

    Ok((
        StatusCode::CREATED,
        success_to_api_response(OrderNumberInfo::from(outcome)),
    ))
}

#[axum::debug_handler]
pub async fn parse_order_number(Path(order_number): Path<String>) -> impl IntoResponse {
    success_to_api_response(ParsedOrderNumber::parse(&order_number))
}
