use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    config::normalize_base_uri,
    middleware::{log_errors, rate_limit},
    routes,
};

// 订单相关的路由
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/number", post(routes::order::create_order_number))
        .route(
            "/orders/number/{order_number}",
            get(routes::order::parse_order_number),
        )
}

fn cafe_routes() -> Router<AppState> {
    Router::new().route(
        "/cafes/{cafe_name}/tables",
        get(routes::cafe::get_cafe_tables),
    )
}

fn rate_limit_routes() -> Router<AppState> {
    Router::new().route(
        "/rate-limits/{scope}/{key}",
        get(routes::rate_limit::get_rate_limit_status),
    )
}

// 创建主路由
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(order_routes())
        .merge(cafe_routes())
        .merge(rate_limit_routes());

    // axum 的 nest 要求以 "/" 开头，且不能是根路径
    let base_uri = normalize_base_uri(&state.config.api_base_uri);
    let router = if base_uri.is_empty() {
        api
    } else {
        Router::new().nest(&base_uri, api)
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit))
        .with_state(state)
}
