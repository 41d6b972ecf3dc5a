use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by client address.
///
/// Each address gets `limit` requests per `window`, counted from its first
/// request; the count resets once the window has passed.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    capacity: usize,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration, capacity: usize) -> Self {
        Self {
            limit,
            window,
            capacity: capacity.max(1),
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a request from `key` and report whether it is allowed
    pub async fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now()).await
    }

    pub async fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().await;

        if let Some(entry) = windows.get_mut(key) {
            if now <= entry.reset_at {
                if entry.count >= self.limit {
                    return false;
                }
                entry.count += 1;
                return true;
            }
        } else if windows.len() >= self.capacity {
            self.make_room(&mut windows, now);
        }

        windows.insert(
            key.to_string(),
            Window {
                count: 1,
                reset_at: now + self.window,
            },
        );
        true
    }

    fn make_room(&self, windows: &mut HashMap<String, Window>, now: Instant) {
        let before = windows.len();
        windows.retain(|_, w| now <= w.reset_at);

        if windows.len() >= self.capacity {
            if let Some(victim) = windows
                .iter()
                .min_by_key(|(_, w)| w.reset_at)
                .map(|(k, _)| k.clone())
            {
                windows.remove(&victim);
            }
        }

        debug!(
            evicted = before - windows.len(),
            tracked = windows.len(),
            "Rate ledger at capacity"
        );
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }
}
