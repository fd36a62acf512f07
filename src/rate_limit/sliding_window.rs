use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::clock::{Clock, SystemClock};

type Entries = HashMap<String, VecDeque<i64>>;

/// 滑动窗口限流器
///
/// 每个 key 保存窗口内已放行请求的时间戳（毫秒）。过期时间戳只在访问该 key 时
/// 惰性清理，被拒绝的请求不会记录，所以持续重试不会延长封禁时间。
pub struct SlidingWindowRateLimiter {
    max_requests: usize,
    window_ms: i64,
    max_keys: Option<usize>,
    clock: Arc<dyn Clock>,
    entries: Mutex<Entries>,
}

impl SlidingWindowRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max_requests: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_requests,
            window_ms: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
            max_keys: None,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// 限制同时跟踪的 key 数量，0 表示不限制
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = (max_keys > 0).then_some(max_keys);
        self
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// 判断是否放行，放行时记录当前时间
    pub fn is_allowed(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let window_ms = self.window_ms;
        let mut entries = self.lock();

        if let Some(timestamps) = entries.get_mut(key) {
            timestamps.retain(|&t| now - t < window_ms);
            if timestamps.len() >= self.max_requests {
                tracing::debug!("Rate limit reached for key {}", key);
                return false;
            }
            timestamps.push_back(now);
            return true;
        }

        if self.max_requests == 0 {
            return false;
        }

        self.make_room(&mut entries, now);
        entries.insert(key.to_owned(), VecDeque::from([now]));
        true
    }

    /// 剩余可用次数，不修改状态
    pub fn remaining_requests(&self, key: &str) -> usize {
        let now = self.clock.now_ms();
        let used = self
            .lock()
            .get(key)
            .map(|timestamps| Self::valid(timestamps, now, self.window_ms).count())
            .unwrap_or(0);
        self.max_requests.saturating_sub(used)
    }

    /// 最早一条有效记录滑出窗口的时间；没有有效记录时返回当前时间
    pub fn reset_time(&self, key: &str) -> i64 {
        let now = self.clock.now_ms();
        self.lock()
            .get(key)
            .and_then(|timestamps| Self::valid(timestamps, now, self.window_ms).min())
            .map_or(now, |oldest| oldest.saturating_add(self.window_ms))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn clear_key(&self, key: &str) {
        self.lock().remove(key);
    }

    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    /// 移除窗口内已没有记录的 key，返回移除数量
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        let mut entries = self.lock();
        Self::sweep_locked(&mut entries, now, self.window_ms)
    }

    fn sweep_locked(entries: &mut Entries, now: i64, window_ms: i64) -> usize {
        let before = entries.len();
        entries.retain(|_, timestamps| timestamps.iter().any(|&t| now - t < window_ms));
        before - entries.len()
    }

    fn make_room(&self, entries: &mut Entries, now: i64) {
        let Some(max_keys) = self.max_keys else {
            return;
        };
        if entries.len() < max_keys {
            return;
        }

        let swept = Self::sweep_locked(entries, now, self.window_ms);
        if swept > 0 {
            tracing::debug!("Swept {} idle rate limit keys", swept);
        }

        while entries.len() >= max_keys {
            // 淘汰最近一次放行最早的 key
            let stalest = entries
                .iter()
                .min_by_key(|(_, timestamps)| timestamps.iter().max().copied().unwrap_or(i64::MIN))
                .map(|(key, _)| key.clone());
            match stalest {
                Some(key) => {
                    tracing::debug!("Evicting rate limit key {}", key);
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }

    fn valid(timestamps: &VecDeque<i64>, now: i64, window_ms: i64) -> impl Iterator<Item = i64> + '_ {
        timestamps
            .iter()
            .copied()
            .filter(move |&t| now - t < window_ms)
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
