use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::order_number::OrderOutcome;

#[derive(Debug, Deserialize)]
pub struct CreateOrderNumberRequest {
    pub cafe_id: Uuid,
    /// 下单用户，缺省时按客户端 IP 限流
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderNumberInfo {
    pub order_number: String,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<OrderOutcome> for OrderNumberInfo {
    fn from(outcome: OrderOutcome) -> Self {
        match outcome {
            OrderOutcome::Sequenced(order_number) => Self {
                order_number,
                fallback: false,
                reason: None,
            },
            OrderOutcome::Fallback {
                order_number,
                reason,
            } => Self {
                order_number,
                fallback: true,
                reason: Some(reason.to_string()),
            },
        }
    }
}
