mod handler;
mod model;

pub use handler::{create_order_number, parse_order_number};
pub use model::{CreateOrderNumberRequest, OrderNumberInfo};
