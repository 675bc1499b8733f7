use log::debug;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use restake_core::application::TxObserver;
use restake_core::domain::TxReceipt;
use restake_core::foundation::RestakeError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub flows_ok: u64,
    pub flows_failed: u64,
    pub transactions_confirmed: u64,
    pub transactions_failed: u64,
    pub stream_subscribers: i64,
}

pub struct Metrics {
    registry: Registry,
    flow_requests_total: IntCounterVec,
    transactions_total: IntCounterVec,
    log_stream_subscribers: IntGauge,
    started_at: Instant,
    flows_ok: AtomicU64,
    flows_failed: AtomicU64,
    transactions_confirmed: AtomicU64,
    transactions_failed: AtomicU64,
}

fn metric_error(err: prometheus::Error) -> RestakeError {
    RestakeError::Message(format!("metrics: {err}"))
}

impl Metrics {
    pub fn new() -> Result<Self, RestakeError> {
        debug!("initializing prometheus metrics");
        let registry = Registry::new();
        let flow_requests_total =
            IntCounterVec::new(Opts::new("flow_requests_total", "Flow invocations by flow and outcome"), &["flow", "status"])
                .map_err(metric_error)?;
        let transactions_total =
            IntCounterVec::new(Opts::new("transactions_total", "Transactions by call kind and stage"), &["kind", "status"])
                .map_err(metric_error)?;
        let log_stream_subscribers =
            IntGauge::new("log_stream_subscribers", "Open operation log streams").map_err(metric_error)?;

        registry.register(Box::new(flow_requests_total.clone())).map_err(metric_error)?;
        registry.register(Box::new(transactions_total.clone())).map_err(metric_error)?;
        registry.register(Box::new(log_stream_subscribers.clone())).map_err(metric_error)?;

        Ok(Self {
            registry,
            flow_requests_total,
            transactions_total,
            log_stream_subscribers,
            started_at: Instant::now(),
            flows_ok: AtomicU64::new(0),
            flows_failed: AtomicU64::new(0),
            transactions_confirmed: AtomicU64::new(0),
            transactions_failed: AtomicU64::new(0),
        })
    }

    pub fn record_flow(&self, flow: &str, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        self.flow_requests_total.with_label_values(&[flow, status]).inc();
        let counter = if ok { &self.flows_ok } else { &self.flows_failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transaction(&self, kind: &str, status: &str) {
        self.transactions_total.with_label_values(&[kind, status]).inc();
        match status {
            "confirmed" => {
                self.transactions_confirmed.fetch_add(1, Ordering::Relaxed);
            }
            "failed" => {
                self.transactions_failed.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    /// Count an open log stream until the guard drops.
    pub fn stream_opened(self: &Arc<Self>) -> StreamGuard {
        self.log_stream_subscribers.inc();
        StreamGuard(Arc::clone(self))
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime: self.started_at.elapsed(),
            flows_ok: self.flows_ok.load(Ordering::Relaxed),
            flows_failed: self.flows_failed.load(Ordering::Relaxed),
            transactions_confirmed: self.transactions_confirmed.load(Ordering::Relaxed),
            transactions_failed: self.transactions_failed.load(Ordering::Relaxed),
            stream_subscribers: self.log_stream_subscribers.get(),
        }
    }

    pub fn encode(&self) -> Result<String, RestakeError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer).map_err(metric_error)?;
        String::from_utf8(buffer).map_err(|err| RestakeError::Message(err.to_string()))
    }
}

pub struct StreamGuard(Arc<Metrics>);

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.0.log_stream_subscribers.dec();
    }
}

impl TxObserver for Metrics {
    fn on_submitted(&self, label: &str) {
        self.record_transaction(label, "submitted");
    }

    fn on_confirmed(&self, label: &str, _receipt: &TxReceipt) {
        self.record_transaction(label, "confirmed");
    }

    fn on_failed(&self, label: &str, _error: &RestakeError) {
        self.record_transaction(label, "failed");
    }
}
