//! Per-client token-bucket limiter.
//!
//! Each client gets a bucket holding up to `burst` tokens, refilled at
//! `max_requests` per `window`. A request costs one token; an empty bucket
//! yields 429 with a `Retry-After` hint. Buckets idle for longer than
//! `cleanup_interval` are dropped by a background sweep.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::config::RateLimitSection;
use crate::context::ClientSource;
use crate::error::ApiError;

use super::RateLimiter;

#[derive(Debug, Clone, Copy)]
pub struct LimiterConfig {
    pub window: Duration,
    pub max_requests: u32,
    pub burst: u32,
    pub cleanup_interval: Duration,
}

impl From<&RateLimitSection> for LimiterConfig {
    fn from(s: &RateLimitSection) -> Self {
        Self {
            window: s.window(),
            max_requests: s.max_requests,
            burst: s.burst,
            cleanup_interval: s.cleanup_interval(),
        }
    }
}

#[derive(Debug)]
struct Bucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last: Instant,
}

impl Bucket {
    fn new(capacity: u32, refill_per_sec: f64, now: Instant) -> Self {
        let cap = capacity.max(1) as f64;
        Self {
            capacity: cap,
            tokens: cap,
            refill_per_sec,
            last: now,
        }
    }

    fn available(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last).as_secs_f64();
        (self.tokens + elapsed * self.refill_per_sec).min(self.capacity)
    }

    /// Take one token, or return the wait in whole seconds (min 1).
    fn try_take(&mut self, now: Instant) -> Result<(), u64> {
        self.tokens = self.available(now);
        self.last = now;
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let wait = ((1.0 - self.tokens) / self.refill_per_sec).ceil();
            Err(wait.max(1.0) as u64)
        }
    }
}

pub struct ClientRateLimiter {
    cfg: LimiterConfig,
    refill_per_sec: f64,
    clients: ClientSource,
    buckets: DashMap<String, Mutex<Bucket>>,
}

impl ClientRateLimiter {
    pub fn new(cfg: LimiterConfig, clients: ClientSource) -> Self {
        let window = cfg.window.as_secs_f64().max(f64::EPSILON);
        Self {
            refill_per_sec: cfg.max_requests.max(1) as f64 / window,
            cfg,
            clients,
            buckets: DashMap::new(),
        }
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.cfg
    }

    /// Charge one request to `client`. On reject returns Retry-After seconds.
    pub fn check(&self, client: &str) -> Result<(), u64> {
        let now = Instant::now();
        if let Some(b) = self.buckets.get(client) {
            let res = b.lock().try_take(now);
            return res;
        }
        let entry = self
            .buckets
            .entry(client.to_owned())
            .or_insert_with(|| Mutex::new(Bucket::new(self.cfg.burst, self.refill_per_sec, now)));
        let res = entry.value().lock().try_take(now);
        res
    }

    /// Drop buckets untouched for longer than the cleanup interval.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let idle = self.cfg.cleanup_interval;
        let before = self.buckets.len();
        self.buckets
            .retain(|_, b| now.saturating_duration_since(b.lock().last) <= idle);
        let removed = before.saturating_sub(self.buckets.len());
        if removed > 0 {
            tracing::debug!(
                removed,
                remaining = self.buckets.len(),
                "rate limiter swept idle clients"
            );
        }
        removed
    }

    /// Run `sweep` every cleanup interval until the limiter is dropped.
    pub fn spawn_cleanup(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.cfg.cleanup_interval.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            tick.tick().await;
            loop {
                tick.tick().await;
                let Some(limiter) = weak.upgrade() else {
                    break;
                };
                limiter.sweep();
            }
        })
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

impl RateLimiter for ClientRateLimiter {
    fn rate_limit(self: Arc<Self>, app: Router) -> Router {
        app.layer(middleware::from_fn_with_state(self, admit))
    }

    fn stats(&self) -> HashMap<String, u64> {
        let now = Instant::now();
        self.buckets
            .iter()
            .map(|e| (e.key().clone(), e.value().lock().available(now).floor() as u64))
            .collect()
    }
}

async fn admit(
    State(limiter): State<Arc<ClientRateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let client = match limiter.clients.identify(&req) {
        Ok(c) => c,
        Err(e) => return ApiError(e).into_response(),
    };
    match limiter.check(&client) {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            tracing::debug!(%client, retry_after, "rate limited");
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after.to_string())],
                "Too Many Requests",
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(burst: u32, max_requests: u32, window: Duration) -> ClientRateLimiter {
        ClientRateLimiter::new(
            LimiterConfig {
                window,
                max_requests,
                burst,
                cleanup_interval: Duration::from_secs(60),
            },
            ClientSource::Peer,
        )
    }

    #[test]
    fn burst_then_reject_with_retry_hint() {
        let l = limiter(2, 1, Duration::from_secs(10));
        assert!(l.check("10.0.0.1").is_ok());
        assert!(l.check("10.0.0.1").is_ok());
        let retry = l.check("10.0.0.1").unwrap_err();
        assert!((1..=10).contains(&retry));
        // other clients have their own bucket
        assert!(l.check("10.0.0.2").is_ok());
    }

    #[test]
    fn stats_report_remaining_tokens() {
        let l = limiter(5, 1, Duration::from_secs(3600));
        l.check("10.0.0.1").unwrap();
        l.check("10.0.0.1").unwrap();
        l.check("10.0.0.2").unwrap();
        let stats = l.stats();
        assert_eq!(stats["10.0.0.1"], 3);
        assert_eq!(stats["10.0.0.2"], 4);
    }

    #[test]
    fn sweep_keeps_recent_clients() {
        let l = limiter(5, 1, Duration::from_secs(1));
        l.check("10.0.0.1").unwrap();
        assert_eq!(l.sweep(), 0);
        assert_eq!(l.tracked_clients(), 1);
    }

    #[test]
    fn sweep_drops_idle_clients() {
        let l = ClientRateLimiter::new(
            LimiterConfig {
                window: Duration::from_secs(1),
                max_requests: 1,
                burst: 1,
                cleanup_interval: Duration::ZERO,
            },
            ClientSource::Peer,
        );
        l.check("10.0.0.1").unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(l.sweep(), 1);
        assert!(l.stats().is_empty());
    }
}
