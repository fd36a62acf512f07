mod handler;

pub use handler::{RateLimitStatus, get_rate_limit_status};
