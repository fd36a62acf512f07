use std::sync::Arc;

use config::Config;
use order_number::SequenceSource;
use rate_limit::{Clock, RateLimiters};

pub mod config;
pub mod error;
pub mod middleware;
pub mod order_number;
pub mod rate_limit;
pub mod router;
pub mod routes;
pub mod tables;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub limiters: Arc<RateLimiters>,
    pub sequence: Arc<dyn SequenceSource>,
    pub clock: Arc<dyn Clock>,
}
