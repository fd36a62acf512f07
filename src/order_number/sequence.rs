use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;

const RPC_PATH: &str = "/rest/v1/rpc/generate_daily_order_number";

#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("sequence request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sequence service returned status {0}")]
    Status(u16),
    #[error("sequence service returned malformed order number {0:?}")]
    Malformed(String),
}

/// 每日订单号序列来源
///
/// 实现方需保证同一咖啡馆当天的序列原子递增、每日重置。
#[async_trait]
pub trait SequenceSource: Send + Sync {
    async fn next_order_number(&self, cafe_id: Uuid) -> Result<String, SequenceError>;
}

#[derive(Serialize)]
struct SequenceRequest {
    p_cafe_id: Uuid,
}

/// 通过后端 RPC 生成订单号
#[derive(Clone)]
pub struct RpcSequenceSource {
    client: reqwest::Client,
    endpoint: String,
    service_key: String,
}

impl RpcSequenceSource {
    pub fn new(
        backend_url: &str,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", backend_url.trim_end_matches('/'), RPC_PATH),
            service_key: service_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.backend_url,
            config.backend_service_key.clone(),
            config.sequence_timeout(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SequenceSource for RpcSequenceSource {
    async fn next_order_number(&self, cafe_id: Uuid) -> Result<String, SequenceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&SequenceRequest { p_cafe_id: cafe_id })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SequenceError::Status(status.as_u16()));
        }

        Ok(response.json::<String>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url() {
        let source =
            RpcSequenceSource::new("https://db.example.com/", "key", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            source.endpoint(),
            "https://db.example.com/rest/v1/rpc/generate_daily_order_number"
        );
    }

    #[test]
    fn request_body_uses_rpc_parameter_name() {
        let cafe_id = Uuid::nil();
        let body = serde_json::to_value(SequenceRequest { p_cafe_id: cafe_id }).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "p_cafe_id": "00000000-0000-0000-0000-000000000000" })
        );
    }
}
