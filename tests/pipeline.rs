//! Black-box tests for the submission pipeline over in-memory collaborators.

use async_trait::async_trait;
use rsvp_server::api::schemas::RsvpForm;
use rsvp_server::config::{EmailConfig, EventConfig, RateLimitConfig};
use rsvp_server::domain::submission::Submission;
use rsvp_server::error::{AppError, Result};
use rsvp_server::services::events::{EventSink, PipelineEvent};
use rsvp_server::services::notification::composer::NotificationComposer;
use rsvp_server::services::notification::dispatcher::NotificationDispatcher;
use rsvp_server::services::notification::provider::{
    EmailProvider, OutboundEmail, ProviderError, ProviderReceipt,
};
use rsvp_server::services::notification::sender::RetryingSender;
use rsvp_server::services::rate_limit_service::RateLimitService;
use rsvp_server::services::rsvp_service::RsvpService;
use rsvp_server::services::store::SubmissionStore;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::OffsetDateTime;

const ORIGIN: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));

#[derive(Debug, Default)]
struct MemoryStore {
    rows: Mutex<Vec<Submission>>,
    fail_inserts: AtomicBool,
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert(&self, submission: &Submission) -> Result<i64> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::RowNotFound));
        }
        let mut rows = self.rows.lock().expect("store lock");
        rows.push(submission.clone());
        Ok(rows.len() as i64)
    }

    async fn count_by_email_since(&self, email: &str, floor: OffsetDateTime) -> Result<i64> {
        let rows = self.rows.lock().expect("store lock");
        Ok(rows.iter().filter(|s| s.email == email && s.submitted_at >= floor).count() as i64)
    }

    async fn count_by_origin_since(&self, origin: IpAddr, floor: OffsetDateTime) -> Result<i64> {
        let rows = self.rows.lock().expect("store lock");
        Ok(rows.iter().filter(|s| s.origin == origin && s.submitted_at >= floor).count() as i64)
    }
}

#[derive(Debug)]
struct ScriptedProvider {
    succeed: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedProvider {
    fn new(succeed: bool) -> Self {
        Self { succeed, calls: Mutex::new(Vec::new()) }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    fn recipients(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl EmailProvider for ScriptedProvider {
    async fn send_email(&self, email: &OutboundEmail) -> std::result::Result<ProviderReceipt, ProviderError> {
        let mut calls = self.calls.lock().expect("calls lock");
        calls.push(email.to.clone());
        let call_no = calls.len();
        if self.succeed {
            Ok(ProviderReceipt { id: format!("msg-{call_no}") })
        } else {
            Err(ProviderError::Rejected("simulated failure".to_string()))
        }
    }
}

#[derive(Debug, Default)]
struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingSink {
    fn dispatch_settled(&self) -> Option<(bool, bool)> {
        self.events.lock().expect("sink lock").iter().find_map(|e| match e {
            PipelineEvent::DispatchSettled { guest_delivered, admin_delivered, .. } => {
                Some((*guest_delivered, *admin_delivered))
            }
            _ => None,
        })
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &PipelineEvent) {
        self.events.lock().expect("sink lock").push(event.clone());
    }
}

struct Harness {
    service: RsvpService,
    store: Arc<MemoryStore>,
    provider: Arc<ScriptedProvider>,
    sink: Arc<RecordingSink>,
}

fn email_config() -> EmailConfig {
    EmailConfig {
        api_key: "test-key".to_string(),
        from: "rsvp@example.com".to_string(),
        admin_recipients: vec!["admin@example.com".to_string()],
        api_base_url: "https://api.resend.com".to_string(),
        send_timeout_secs: 10,
        guest_max_attempts: 3,
        guest_retry_base_ms: 10,
        admin_max_attempts: 2,
        admin_retry_base_ms: 5,
    }
}

fn event_config() -> EventConfig {
    EventConfig {
        wedding_date: "September 20, 2025".to_string(),
        venue_name: "Loft Diplomat".to_string(),
        venue_address: "Bucharest, Romania".to_string(),
        couple_names: "Dana & Thomas".to_string(),
    }
}

fn harness(rate_limit: RateLimitConfig, provider_succeeds: bool) -> Harness {
    let store = Arc::new(MemoryStore::default());
    let provider = Arc::new(ScriptedProvider::new(provider_succeeds));
    let sink = Arc::new(RecordingSink::default());

    let sender =
        RetryingSender::new(Arc::clone(&provider) as Arc<dyn EmailProvider>, Arc::clone(&sink) as Arc<dyn EventSink>);
    let dispatcher = NotificationDispatcher::new(
        NotificationComposer::new(event_config()),
        sender,
        Arc::clone(&sink) as Arc<dyn EventSink>,
        &email_config(),
    );
    let rate_limiter =
        RateLimitService::new(Arc::clone(&store) as Arc<dyn SubmissionStore>, rate_limit);
    let service = RsvpService::new(
        Arc::clone(&store) as Arc<dyn SubmissionStore>,
        rate_limiter,
        dispatcher,
        Arc::clone(&sink) as Arc<dyn EventSink>,
    );

    Harness { service, store, provider, sink }
}

fn limits(max_per_email: i64, max_per_origin: i64) -> RateLimitConfig {
    RateLimitConfig { max_per_email, max_per_origin, window_secs: 3600 }
}

fn valid_form() -> RsvpForm {
    RsvpForm {
        first_name: Some("Ana".to_string()),
        last_name: Some("Pop".to_string()),
        email: Some("ana@example.com".to_string()),
        attendance: Some("yes".to_string()),
        ..RsvpForm::default()
    }
}

/// Polls until the condition holds; sleeps auto-advance under the paused clock.
async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

#[tokio::test(start_paused = true)]
async fn accepted_submission_persists_and_notifies_both_channels() {
    let h = harness(limits(10, 10), true);

    let accepted = h.service.submit(&valid_form(), ORIGIN, None).await.expect("submission accepted");
    assert_eq!(accepted.id, 1);

    {
        let rows = h.store.rows.lock().expect("store lock");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "ana@example.com");
        assert_eq!(rows[0].origin, ORIGIN);
    }

    wait_until(|| h.provider.call_count() == 2).await;
    let recipients = h.provider.recipients();
    assert!(recipients.contains(&vec!["ana@example.com".to_string()]));
    assert!(recipients.contains(&vec!["admin@example.com".to_string()]));
}

#[tokio::test(start_paused = true)]
async fn notification_failures_never_fail_the_submission() {
    let h = harness(limits(10, 10), false);

    let accepted = h.service.submit(&valid_form(), ORIGIN, None).await.expect("submission accepted");
    assert_eq!(accepted.id, 1);
    assert_eq!(h.store.rows.lock().expect("store lock").len(), 1);

    wait_until(|| h.sink.dispatch_settled().is_some()).await;
    assert_eq!(h.sink.dispatch_settled(), Some((false, false)));

    // Guest channel retried 3 times, admin 2; both ran to completion.
    assert_eq!(h.provider.call_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn eleventh_submission_from_one_email_is_rejected() {
    let h = harness(limits(10, 1000), true);

    for _ in 0..10 {
        h.service.submit(&valid_form(), ORIGIN, None).await.expect("submission under the ceiling");
    }

    let rejection = h.service.submit(&valid_form(), ORIGIN, None).await;
    assert!(matches!(rejection, Err(AppError::RateLimited)));

    // No row persisted for the rejected attempt.
    assert_eq!(h.store.rows.lock().expect("store lock").len(), 10);

    // A different email at the same moment is unaffected.
    let mut other = valid_form();
    other.email = Some("ion@example.com".to_string());
    h.service.submit(&other, ORIGIN, None).await.expect("different email accepted");
}

#[tokio::test(start_paused = true)]
async fn validation_failure_reaches_neither_store_nor_provider() {
    let h = harness(limits(10, 10), true);

    let mut form = valid_form();
    form.email = Some("not-an-email".to_string());
    form.last_name = None;

    let rejection = h.service.submit(&form, ORIGIN, None).await;
    let Err(AppError::Validation(fields)) = rejection else {
        panic!("expected validation errors");
    };
    let names: Vec<&str> = fields.iter().map(|f| f.field).collect();
    assert_eq!(names, vec!["lastName", "email"]);

    assert!(h.store.rows.lock().expect("store lock").is_empty());
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn persistence_failure_is_fatal_and_sends_nothing() {
    let h = harness(limits(10, 10), true);
    h.store.fail_inserts.store(true, Ordering::SeqCst);

    let outcome = h.service.submit(&valid_form(), ORIGIN, None).await;
    assert!(matches!(outcome, Err(AppError::Database(_))));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.provider.call_count(), 0);

    let events = h.sink.events.lock().expect("sink lock");
    assert!(events.iter().any(|e| matches!(e, PipelineEvent::PersistenceFailed { .. })));
}

#[tokio::test(start_paused = true)]
async fn delivery_attempts_are_reported_through_the_sink() {
    let h = harness(limits(10, 10), false);

    h.service.submit(&valid_form(), ORIGIN, None).await.expect("submission accepted");
    wait_until(|| h.sink.dispatch_settled().is_some()).await;

    let events = h.sink.events.lock().expect("sink lock");
    let attempted = events.iter().filter(|e| matches!(e, PipelineEvent::DeliveryAttempted(_))).count();
    let exhausted = events.iter().filter(|e| matches!(e, PipelineEvent::DeliveryExhausted { .. })).count();
    assert_eq!(attempted, 5);
    assert_eq!(exhausted, 2);
}
