use crate::api::handlers::types::ApiError;
use crate::api::state::AppState;
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::{debug, error};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);
const ENTRY_TTL: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct Bucket {
    window_start: Instant,
    window_count: u32,
    burst_count: u32,
    last_seen: Instant,
}

impl Bucket {
    fn new(now: Instant) -> Self {
        Self { window_start: now, window_count: 0, burst_count: 0, last_seen: now }
    }
}

#[derive(Debug)]
struct Buckets {
    per_ip: HashMap<IpAddr, Bucket>,
    last_cleanup: Instant,
}

impl Buckets {
    fn evict_idle(&mut self, now: Instant) {
        if now.duration_since(self.last_cleanup) < CLEANUP_INTERVAL {
            return;
        }
        self.last_cleanup = now;
        let cutoff = now.checked_sub(ENTRY_TTL).unwrap_or(now);
        self.per_ip.retain(|_, bucket| bucket.last_seen >= cutoff);
    }
}

/// Fixed one-second window per client IP: `rps` requests, then up to `burst` more until the window rolls.
#[derive(Debug)]
pub struct RateLimiter {
    inner: Mutex<Buckets>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Buckets { per_ip: HashMap::new(), last_cleanup: Instant::now() }) }
    }

    pub fn allow(&self, now: Instant, client_ip: IpAddr, rps: u32, burst: u32) -> bool {
        let Ok(mut buckets) = self.inner.lock() else {
            error!("rate limiter lock poisoned; denying request");
            return false;
        };
        buckets.evict_idle(now);
        let bucket = buckets.per_ip.entry(client_ip).or_insert_with(|| Bucket::new(now));
        bucket.last_seen = now;
        if now.duration_since(bucket.window_start) >= WINDOW {
            *bucket = Bucket::new(now);
        }
        if bucket.window_count < rps {
            bucket.window_count += 1;
            true
        } else if bucket.burst_count < burst {
            bucket.burst_count += 1;
            true
        } else {
            false
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let rps = state.rate_limit_rps.max(1);
    let burst = state.rate_limit_burst;
    let client_ip = addr.ip();

    if !state.rate_limiter.allow(Instant::now(), client_ip, rps, burst) {
        debug!("rate limit exceeded client_ip={} rps={} burst={}", client_ip, rps, burst);
        return ApiError::too_many_requests().into_response();
    }
    next.run(req).await
}
