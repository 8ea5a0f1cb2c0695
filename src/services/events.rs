use crate::domain::delivery::{AttemptOutcome, Channel, DeliveryAttempt};
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::net::IpAddr;

/// Everything the pipeline reports about itself. Events are fire-and-forget;
/// a sink must never propagate a failure back into the pipeline.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    ValidationFailed { fields: Vec<&'static str> },
    RateLimited { email: String, origin: IpAddr, email_count: i64, origin_count: i64 },
    SubmissionStored { id: i64 },
    PersistenceFailed { error: String },
    DeliveryAttempted(DeliveryAttempt),
    DeliveryExhausted { channel: Channel, attempts: u32 },
    DispatchSettled { id: i64, guest_delivered: bool, admin_delivered: bool },
}

/// Observability handle threaded explicitly through the pipeline instead of a
/// process-wide logger singleton.
pub trait EventSink: Send + Sync + std::fmt::Debug {
    fn record(&self, event: &PipelineEvent);
}

#[derive(Clone, Debug)]
struct Metrics {
    submissions_total: Counter<u64>,
    delivery_attempts_total: Counter<u64>,
    delivery_duration_seconds: Histogram<f64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("rsvp-server");
        Self {
            submissions_total: meter
                .u64_counter("rsvp_submissions_total")
                .with_description("Submission pipeline outcomes")
                .build(),
            delivery_attempts_total: meter
                .u64_counter("rsvp_delivery_attempts_total")
                .with_description("Email delivery attempts by channel and outcome")
                .build(),
            delivery_duration_seconds: meter
                .f64_histogram("rsvp_delivery_duration_seconds")
                .with_description("Duration of individual email delivery attempts")
                .build(),
        }
    }
}

/// Production sink: structured logs via `tracing` plus OpenTelemetry metrics.
#[derive(Clone, Debug)]
pub struct TelemetrySink {
    metrics: Metrics,
}

impl TelemetrySink {
    #[must_use]
    pub fn new() -> Self {
        Self { metrics: Metrics::new() }
    }
}

impl Default for TelemetrySink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for TelemetrySink {
    fn record(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::ValidationFailed { fields } => {
                tracing::warn!(fields = ?fields, "Submission rejected by validation");
                self.metrics.submissions_total.add(1, &[KeyValue::new("outcome", "validation_failed")]);
            }
            PipelineEvent::RateLimited { email, origin, email_count, origin_count } => {
                tracing::warn!(
                    email = %email,
                    origin = %origin,
                    email_count,
                    origin_count,
                    security = true,
                    "Submission rate limit exceeded"
                );
                self.metrics.submissions_total.add(1, &[KeyValue::new("outcome", "rate_limited")]);
            }
            PipelineEvent::SubmissionStored { id } => {
                tracing::info!(id, "RSVP stored");
                self.metrics.submissions_total.add(1, &[KeyValue::new("outcome", "accepted")]);
            }
            PipelineEvent::PersistenceFailed { error } => {
                tracing::error!(error = %error, "Failed to persist RSVP");
                self.metrics.submissions_total.add(1, &[KeyValue::new("outcome", "persistence_failed")]);
            }
            PipelineEvent::DeliveryAttempted(attempt) => {
                let outcome = match &attempt.outcome {
                    AttemptOutcome::Delivered { provider_id } => {
                        tracing::debug!(
                            channel = %attempt.channel,
                            attempt = attempt.attempt,
                            provider_id = %provider_id,
                            elapsed_ms = %attempt.elapsed.as_millis(),
                            "Email delivered"
                        );
                        "success"
                    }
                    AttemptOutcome::Failed { error } => {
                        tracing::warn!(
                            channel = %attempt.channel,
                            attempt = attempt.attempt,
                            error = %error,
                            elapsed_ms = %attempt.elapsed.as_millis(),
                            "Email delivery attempt failed"
                        );
                        "failure"
                    }
                };
                let labels =
                    [KeyValue::new("channel", attempt.channel.as_str()), KeyValue::new("outcome", outcome)];
                self.metrics.delivery_attempts_total.add(1, &labels);
                self.metrics.delivery_duration_seconds.record(attempt.elapsed.as_secs_f64(), &labels);
            }
            PipelineEvent::DeliveryExhausted { channel, attempts } => {
                tracing::error!(channel = %channel, attempts, "Email delivery exhausted all attempts");
            }
            PipelineEvent::DispatchSettled { id, guest_delivered, admin_delivered } => {
                if *guest_delivered || *admin_delivered {
                    tracing::info!(id, guest_delivered, admin_delivered, "Notification dispatch settled");
                } else {
                    tracing::error!(id, "Both notification channels failed");
                }
            }
        }
    }
}
