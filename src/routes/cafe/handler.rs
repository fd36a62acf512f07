use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{Extensions, HeaderMap},
    response::IntoResponse,
};
use serde::Serialize;

use crate::AppState;
use crate::error::AppError;
use crate::middleware::client_ip;
use crate::rate_limit::LimitScope;
use crate::tables::{TableOption, cafe_table_options_normalized};
use crate::utils::success_to_api_response;

#[derive(Debug, Serialize)]
pub struct CafeTables {
    pub cafe_name: String,
    pub tables: Vec<TableOption>,
}

#[axum::debug_handler]
pub async fn get_cafe_tables(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
    Path(cafe_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let remote = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    let ip = client_ip(&headers, remote);

    let limiter = state.limiters.get(LimitScope::MenuFetch);
    if !limiter.is_allowed(&ip) {
        tracing::debug!("Menu fetch rate limit hit for {}", ip);
        return Err(AppError::rate_limited(limiter, &ip, state.clock.now_ms()));
    }

    let tables = cafe_table_options_normalized(&cafe_name);
    if tables.is_empty() {
        return Err(AppError::NotFound(format!("未找到咖啡馆: {}", cafe_name)));
    }

    Ok(success_to_api_response(CafeTables { cafe_name, tables }))
}
