use crate::domain::delivery::{AttemptOutcome, Channel, DeliveryAttempt, DeliveryResult};
use crate::services::events::{EventSink, PipelineEvent};
use crate::services::notification::provider::{EmailProvider, OutboundEmail};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Per-channel retry ceiling and backoff base. The delay before attempt k+1 is
/// k times the base delay.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

/// Delivers one payload through the provider with bounded retries and linear
/// backoff, reporting every attempt to the event sink.
#[derive(Clone, Debug)]
pub struct RetryingSender {
    provider: Arc<dyn EmailProvider>,
    sink: Arc<dyn EventSink>,
}

impl RetryingSender {
    #[must_use]
    pub fn new(provider: Arc<dyn EmailProvider>, sink: Arc<dyn EventSink>) -> Self {
        Self { provider, sink }
    }

    #[tracing::instrument(skip(self, email, policy), fields(channel = %channel))]
    pub async fn send(&self, channel: Channel, email: &OutboundEmail, policy: RetryPolicy) -> DeliveryResult {
        let max_attempts = policy.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            let started = Instant::now();
            let outcome = self.provider.send_email(email).await;
            let elapsed = started.elapsed();

            match outcome {
                Ok(receipt) => {
                    self.sink.record(&PipelineEvent::DeliveryAttempted(DeliveryAttempt {
                        channel,
                        attempt,
                        outcome: AttemptOutcome::Delivered { provider_id: receipt.id.clone() },
                        elapsed,
                    }));
                    return DeliveryResult::Delivered { provider_id: receipt.id, attempts: attempt };
                }
                Err(e) => {
                    last_error = e.to_string();
                    self.sink.record(&PipelineEvent::DeliveryAttempted(DeliveryAttempt {
                        channel,
                        attempt,
                        outcome: AttemptOutcome::Failed { error: last_error.clone() },
                        elapsed,
                    }));
                    if attempt < max_attempts {
                        tokio::time::sleep(policy.base_delay * attempt).await;
                    }
                }
            }
        }

        self.sink.record(&PipelineEvent::DeliveryExhausted { channel, attempts: max_attempts });
        DeliveryResult::Failed { error: last_error, attempts: max_attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notification::provider::{ProviderError, ProviderReceipt};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingSink {
        events: Mutex<Vec<PipelineEvent>>,
    }

    impl EventSink for RecordingSink {
        fn record(&self, event: &PipelineEvent) {
            self.events.lock().expect("sink lock").push(event.clone());
        }
    }

    /// Fails the first `failures` calls, then succeeds; records call instants.
    #[derive(Debug)]
    struct ScriptedProvider {
        failures: u32,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedProvider {
        fn new(failures: u32) -> Self {
            Self { failures, calls: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl EmailProvider for ScriptedProvider {
        async fn send_email(&self, _email: &OutboundEmail) -> Result<ProviderReceipt, ProviderError> {
            let mut calls = self.calls.lock().expect("calls lock");
            calls.push(Instant::now());
            let call_no = calls.len() as u32;
            if call_no <= self.failures {
                Err(ProviderError::Rejected(format!("simulated failure {call_no}")))
            } else {
                Ok(ProviderReceipt { id: format!("msg-{call_no}") })
            }
        }
    }

    fn email() -> OutboundEmail {
        OutboundEmail {
            from: "rsvp@example.com".to_string(),
            to: vec!["ana@example.com".to_string()],
            subject: "subject".to_string(),
            html: "<p>body</p>".to_string(),
            tags: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_the_receipt_of_the_first_successful_attempt() {
        let provider = Arc::new(ScriptedProvider::new(2));
        let sender = RetryingSender::new(Arc::clone(&provider) as Arc<dyn EmailProvider>, Arc::new(RecordingSink::default()));
        let policy = RetryPolicy { max_attempts: 3, base_delay: Duration::from_secs(1) };

        let result = sender.send(Channel::Guest, &email(), policy).await;

        match result {
            DeliveryResult::Delivered { provider_id, attempts } => {
                assert_eq!(provider_id, "msg-3");
                assert_eq!(attempts, 3);
            }
            DeliveryResult::Failed { error, .. } => panic!("expected delivery, got failure: {error}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_grows_linearly_with_the_attempt_number() {
        let provider = Arc::new(ScriptedProvider::new(2));
        let sender = RetryingSender::new(Arc::clone(&provider) as Arc<dyn EmailProvider>, Arc::new(RecordingSink::default()));
        let base = Duration::from_secs(1);
        let policy = RetryPolicy { max_attempts: 3, base_delay: base };

        sender.send(Channel::Guest, &email(), policy).await;

        let calls = provider.calls.lock().expect("calls lock").clone();
        assert_eq!(calls.len(), 3);
        assert!(calls[1] - calls[0] >= base);
        assert!(calls[2] - calls[1] >= base * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn carries_the_last_error_after_exhaustion() {
        let provider = Arc::new(ScriptedProvider::new(u32::MAX));
        let sink = Arc::new(RecordingSink::default());
        let sender = RetryingSender::new(provider, Arc::clone(&sink) as Arc<dyn EventSink>);
        let policy = RetryPolicy { max_attempts: 2, base_delay: Duration::from_millis(10) };

        let result = sender.send(Channel::Admin, &email(), policy).await;

        match result {
            DeliveryResult::Failed { error, attempts } => {
                assert_eq!(attempts, 2);
                assert!(error.contains("simulated failure 2"));
            }
            DeliveryResult::Delivered { .. } => panic!("expected failure"),
        }

        let events = sink.events.lock().expect("sink lock");
        let attempted = events.iter().filter(|e| matches!(e, PipelineEvent::DeliveryAttempted(_))).count();
        let exhausted = events.iter().filter(|e| matches!(e, PipelineEvent::DeliveryExhausted { .. })).count();
        assert_eq!(attempted, 2);
        assert_eq!(exhausted, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reports_every_attempt_with_its_number() {
        let provider = Arc::new(ScriptedProvider::new(1));
        let sink = Arc::new(RecordingSink::default());
        let sender = RetryingSender::new(provider, Arc::clone(&sink) as Arc<dyn EventSink>);
        let policy = RetryPolicy { max_attempts: 3, base_delay: Duration::from_millis(10) };

        sender.send(Channel::Guest, &email(), policy).await;

        let events = sink.events.lock().expect("sink lock");
        let attempts: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::DeliveryAttempted(a) => Some(a.attempt),
                _ => None,
            })
            .collect();
        assert_eq!(attempts, vec![1, 2]);
    }
}
