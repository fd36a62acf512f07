pub mod cafe;
pub mod order;
pub mod rate_limit;
