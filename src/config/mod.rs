use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub backend_url: String,
    pub backend_service_key: String,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub sequence_timeout_secs: u64,
    pub rate_limit_sweep_secs: u64,
    pub rate_limit_max_keys: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            backend_url: env::var("BACKEND_URL")?,
            backend_service_key: env::var("BACKEND_SERVICE_KEY")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: parse_or("SERVER_PORT", 3000),
            api_base_uri: normalize_base_uri(
                &env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()),
            ),
            sequence_timeout_secs: parse_or("SEQUENCE_TIMEOUT_SECS", 10),
            rate_limit_sweep_secs: parse_or("RATE_LIMIT_SWEEP_SECS", 60),
            rate_limit_max_keys: parse_or("RATE_LIMIT_MAX_KEYS", 10_000),
        })
    }

    /// 0 秒超时会让每次请求都失败，至少 1 秒
    pub fn sequence_timeout(&self) -> Duration {
        Duration::from_secs(self.sequence_timeout_secs.max(1))
    }

    pub fn rate_limit_sweep_interval(&self) -> Duration {
        // tokio interval 不接受 0
        Duration::from_secs(self.rate_limit_sweep_secs.max(1))
    }
}

/// 规范化路由前缀："api"、"/api/" 都变成 "/api"，根路径返回空字符串
pub fn normalize_base_uri(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
