// 进程内限流
// 每类操作一个独立的滑动窗口限流器，各自拥有独立的 key 空间

pub mod clock;
mod sliding_window;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use clock::{Clock, ManualClock, SystemClock};
pub use sliding_window::SlidingWindowRateLimiter;

/// 操作类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitScope {
    OrderPlacement,
    Api,
    MenuFetch,
    Admin,
    Realtime,
}

impl LimitScope {
    pub const ALL: [LimitScope; 5] = [
        LimitScope::OrderPlacement,
        LimitScope::Api,
        LimitScope::MenuFetch,
        LimitScope::Admin,
        LimitScope::Realtime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LimitScope::OrderPlacement => "order_placement",
            LimitScope::Api => "api",
            LimitScope::MenuFetch => "menu_fetch",
            LimitScope::Admin => "admin",
            LimitScope::Realtime => "realtime",
        }
    }

    /// 默认策略：(最大请求数, 窗口)
    pub fn default_policy(self) -> (usize, Duration) {
        match self {
            LimitScope::OrderPlacement => (10, Duration::from_secs(60)),
            LimitScope::Api => (50, Duration::from_secs(60)),
            LimitScope::MenuFetch => (20, Duration::from_secs(30)),
            LimitScope::Admin => (100, Duration::from_secs(60)),
            LimitScope::Realtime => (200, Duration::from_secs(60)),
        }
    }
}

impl fmt::Display for LimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rate limit scope: {0}")]
pub struct UnknownScope(pub String);

impl FromStr for LimitScope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LimitScope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| UnknownScope(s.to_owned()))
    }
}

/// 全部限流器
pub struct RateLimiters {
    order_placement: SlidingWindowRateLimiter,
    api: SlidingWindowRateLimiter,
    menu_fetch: SlidingWindowRateLimiter,
    admin: SlidingWindowRateLimiter,
    realtime: SlidingWindowRateLimiter,
}

impl RateLimiters {
    pub fn new(max_keys: usize) -> Self {
        Self::with_clock(Arc::new(SystemClock), max_keys)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, max_keys: usize) -> Self {
        let build = |scope: LimitScope| {
            let (max_requests, window) = scope.default_policy();
            SlidingWindowRateLimiter::with_clock(max_requests, window, clock.clone())
                .with_max_keys(max_keys)
        };
        Self {
            order_placement: build(LimitScope::OrderPlacement),
            api: build(LimitScope::Api),
            menu_fetch: build(LimitScope::MenuFetch),
            admin: build(LimitScope::Admin),
            realtime: build(LimitScope::Realtime),
        }
    }

    pub fn get(&self, scope: LimitScope) -> &SlidingWindowRateLimiter {
        match scope {
            LimitScope::OrderPlacement => &self.order_placement,
            LimitScope::Api => &self.api,
            LimitScope::MenuFetch => &self.menu_fetch,
            LimitScope::Admin => &self.admin,
            LimitScope::Realtime => &self.realtime,
        }
    }

    /// 清理所有限流器中的空闲 key
    pub fn sweep_all(&self) -> usize {
        LimitScope::ALL
            .into_iter()
            .map(|scope| self.get(scope).sweep())
            .sum()
    }

    pub fn clear_all(&self) {
        for scope in LimitScope::ALL {
            self.get(scope).clear();
        }
    }
}

/// 定期清理空闲 key
pub fn spawn_sweeper(limiters: Arc<RateLimiters>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // 第一次 tick 立即返回
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = limiters.sweep_all();
            if removed > 0 {
                tracing::debug!("Rate limit sweep removed {} idle keys", removed);
            }
        }
    })
}
