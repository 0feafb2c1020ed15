//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes a minimal set of counters/gauges relevant to relay runs.

use std::sync::Arc;

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::error::{Result, TelemetryError};

/// Terminal state of a relay run, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// File delivered to the requester.
    Relayed,
    /// The initial progress notification could not be sent.
    NotifyFailed,
    /// The download strategy failed.
    DownloadFailed,
    /// Archiving or forwarding failed.
    UploadFailed,
    /// The run panicked and was caught by the worker boundary.
    Panicked,
    /// Shutdown cancelled the run before it finished.
    Cancelled,
}

impl JobOutcome {
    /// Label value recorded in `relay_jobs_total`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relayed => "relayed",
            Self::NotifyFailed => "notify_failed",
            Self::DownloadFailed => "download_failed",
            Self::UploadFailed => "upload_failed",
            Self::Panicked => "panicked",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    relay_jobs_total: IntCounterVec,
    relay_downloads_total: IntCounterVec,
    relay_jobs_active: IntGauge,
    relay_jobs_rejected_total: IntCounter,
    relay_bytes_relayed_total: IntCounter,
}

/// Snapshot of selected gauges and counters, logged at shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Relay runs currently executing or waiting for a slot.
    pub jobs_active: i64,
    /// Submissions rejected because the pool was saturated or stopping.
    pub jobs_rejected_total: u64,
    /// Bytes delivered to requesters.
    pub bytes_relayed_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = counter_vec(
            "http_requests_total",
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let relay_jobs_total = counter_vec(
            "relay_jobs_total",
            "Relay runs finished by outcome",
            &["outcome"],
        )?;
        let relay_downloads_total = counter_vec(
            "relay_downloads_total",
            "Downloads attempted by platform and status",
            &["platform", "status"],
        )?;
        let relay_jobs_active = IntGauge::with_opts(Opts::new(
            "relay_jobs_active",
            "Relay runs admitted and not yet finished",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "relay_jobs_active",
            source,
        })?;
        let relay_jobs_rejected_total = counter(
            "relay_jobs_rejected_total",
            "Relay submissions rejected at admission",
        )?;
        let relay_bytes_relayed_total = counter(
            "relay_bytes_relayed_total",
            "Bytes delivered to requesting chats",
        )?;

        register(&registry, "http_requests_total", &http_requests_total)?;
        register(&registry, "relay_jobs_total", &relay_jobs_total)?;
        register(&registry, "relay_downloads_total", &relay_downloads_total)?;
        register(&registry, "relay_jobs_active", &relay_jobs_active)?;
        register(
            &registry,
            "relay_jobs_rejected_total",
            &relay_jobs_rejected_total,
        )?;
        register(
            &registry,
            "relay_bytes_relayed_total",
            &relay_bytes_relayed_total,
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                relay_jobs_total,
                relay_downloads_total,
                relay_jobs_active,
                relay_jobs_rejected_total,
                relay_bytes_relayed_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Record a finished relay run.
    pub fn inc_job(&self, outcome: JobOutcome) {
        self.inner
            .relay_jobs_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    /// Record a download attempt for `platform`.
    pub fn inc_download(&self, platform: &str, succeeded: bool) {
        let status = if succeeded { "ok" } else { "error" };
        self.inner
            .relay_downloads_total
            .with_label_values(&[platform, status])
            .inc();
    }

    /// Mark one more relay run as admitted.
    pub fn job_started(&self) {
        self.inner.relay_jobs_active.inc();
    }

    /// Mark an admitted relay run as finished.
    pub fn job_finished(&self) {
        self.inner.relay_jobs_active.dec();
    }

    /// Increment the rejected submission counter.
    pub fn inc_job_rejected(&self) {
        self.inner.relay_jobs_rejected_total.inc();
    }

    /// Add `bytes` to the relayed byte counter.
    pub fn add_bytes_relayed(&self, bytes: u64) {
        self.inner.relay_bytes_relayed_total.inc_by(bytes);
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the most relevant gauges and counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_active: self.inner.relay_jobs_active.get(),
            jobs_rejected_total: self.inner.relay_jobs_rejected_total.get(),
            bytes_relayed_total: self.inner.relay_bytes_relayed_total.get(),
        }
    }
}

fn counter(name: &'static str, help: &str) -> Result<IntCounter> {
    IntCounter::with_opts(Opts::new(name, help))
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}
