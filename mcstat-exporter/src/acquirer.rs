//! Retry and fallback policy around the two query sources.
//!
//! Each outer attempt tries the primary source, then the fallback source
//! once. When both fail the acquirer sleeps a fixed backoff and starts the
//! next attempt. The first successful record ends the acquisition.

use crate::validation;
use mcstat_query::{QueryError, SourceKind, StatusRecord, StatusSource, Target};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Outer attempts per acquisition.
pub const MAX_ATTEMPTS: u32 = 90;

/// Fixed pause after an attempt in which both sources failed.
pub const BACKOFF: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            backoff: BACKOFF,
        }
    }
}

/// Bookkeeping for the attempt in progress, used for log fields only.
struct AcquisitionAttempt {
    number: u32,
    started: Instant,
    last_source: Option<SourceKind>,
}

impl AcquisitionAttempt {
    fn new() -> Self {
        Self {
            number: 0,
            started: Instant::now(),
            last_source: None,
        }
    }

    fn failed(&mut self, source: Option<SourceKind>, err: &QueryError) {
        self.last_source = source;
        warn!(
            attempt = self.number,
            source = source.as_ref().map_or("none", SourceKind::as_str),
            kind = err.kind(),
            error = %err,
            "status query failed"
        );
    }
}

pub struct StatusAcquirer {
    primary: Arc<dyn StatusSource>,
    fallback: Arc<dyn StatusSource>,
    policy: RetryPolicy,
}

impl StatusAcquirer {
    pub fn new(primary: Arc<dyn StatusSource>, fallback: Arc<dyn StatusSource>) -> Self {
        Self {
            primary,
            fallback,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Acquire a fresh status record.
    ///
    /// Returns `None` once the attempt budget is spent without a success.
    /// Callers keep their previous record in that case.
    pub async fn acquire(&self, target: &Target) -> Option<StatusRecord> {
        let mut attempt = AcquisitionAttempt::new();

        for number in 1..=self.policy.max_attempts {
            attempt.number = number;

            if let Some((source, record)) = self.attempt_once(target, &mut attempt).await {
                info!(
                    attempt = number,
                    source = source.as_str(),
                    players_online = record.players_online,
                    players_sampled = record.sample_size(),
                    latency_ms = ?record.latency,
                    "status acquired"
                );
                return Some(record);
            }

            if number < self.policy.max_attempts {
                debug!(attempt = number, backoff = ?self.policy.backoff, "backing off");
                tokio::time::sleep(self.policy.backoff).await;
            }
        }

        warn!(
            server = %target,
            attempts = self.policy.max_attempts,
            elapsed = ?attempt.started.elapsed(),
            last_source = ?attempt.last_source,
            "acquisition exhausted, no status available"
        );
        None
    }

    /// One outer attempt: primary, then fallback. Both sources are skipped
    /// for an invalid target, which still costs the attempt.
    async fn attempt_once(
        &self,
        target: &Target,
        attempt: &mut AcquisitionAttempt,
    ) -> Option<(SourceKind, StatusRecord)> {
        if let Err(e) = validation::validate_target(target) {
            attempt.failed(None, &QueryError::InvalidTarget(e.to_string()));
            return None;
        }

        for source in [&self.primary, &self.fallback] {
            match source.fetch(target).await {
                Ok(record) => {
                    attempt.last_source = Some(source.kind());
                    return Some((source.kind(), record));
                }
                Err(e) => attempt.failed(Some(source.kind()), &e),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted source: fails until `succeed_on` calls have been made.
    struct FakeSource {
        kind: SourceKind,
        calls: AtomicU32,
        succeed_on: Option<u32>,
        record: StatusRecord,
    }

    impl FakeSource {
        fn failing(kind: SourceKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                calls: AtomicU32::new(0),
                succeed_on: None,
                record: StatusRecord::default(),
            })
        }

        fn succeeding_on(kind: SourceKind, call: u32, record: StatusRecord) -> Arc<Self> {
            Arc::new(Self {
                kind,
                calls: AtomicU32::new(0),
                succeed_on: Some(call),
                record,
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for FakeSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn fetch(&self, _target: &Target) -> mcstat_query::Result<StatusRecord> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.succeed_on {
                Some(n) if call >= n => Ok(self.record.clone()),
                _ => Err(QueryError::Protocol("scripted failure".to_string())),
            }
        }
    }

    fn target() -> Target {
        Target::new("mc.example.org", 25565)
    }

    fn primary_record() -> StatusRecord {
        StatusRecord {
            latency: Some(12.5),
            players_online: 1,
            players_max: Some(10),
            players: [("u1".to_string(), "Steve".to_string())].into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_success_skips_fallback() {
        let primary = FakeSource::succeeding_on(SourceKind::Primary, 1, primary_record());
        let fallback = FakeSource::failing(SourceKind::Fallback);
        let acquirer = StatusAcquirer::new(primary.clone(), fallback.clone());

        let record = acquirer.acquire(&target()).await.unwrap();

        assert_eq!(record, primary_record());
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_recovers_in_same_attempt() {
        let fallback_record = mcstat_query::fallback::parse_status(
            r#"{"players":{"online":3,"max":20,"list":[{"uuid":"a1","name":"Alice"}]}}"#,
        )
        .unwrap();
        let primary = FakeSource::failing(SourceKind::Primary);
        let fallback = FakeSource::succeeding_on(SourceKind::Fallback, 1, fallback_record);
        let acquirer = StatusAcquirer::new(primary.clone(), fallback.clone());

        let start = Instant::now();
        let record = acquirer.acquire(&target()).await.unwrap();

        assert_eq!(record.players_online, 3);
        assert_eq!(record.players_max, Some(20));
        assert_eq!(record.players.get("a1").map(String::as_str), Some("Alice"));
        assert_eq!(record.latency, None);
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
        // No backoff when the fallback rescues the attempt
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_after_exactly_max_attempts() {
        let primary = FakeSource::failing(SourceKind::Primary);
        let fallback = FakeSource::failing(SourceKind::Fallback);
        let acquirer = StatusAcquirer::new(primary.clone(), fallback.clone());

        let start = Instant::now();
        let outcome = acquirer.acquire(&target()).await;

        assert!(outcome.is_none());
        assert_eq!(primary.calls(), MAX_ATTEMPTS);
        assert_eq!(fallback.calls(), MAX_ATTEMPTS);
        // One backoff between consecutive attempts, none after the last
        assert_eq!(start.elapsed(), BACKOFF * (MAX_ATTEMPTS - 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_backoffs() {
        let primary = FakeSource::succeeding_on(SourceKind::Primary, 3, primary_record());
        let fallback = FakeSource::failing(SourceKind::Fallback);
        let acquirer = StatusAcquirer::new(primary.clone(), fallback.clone());

        let start = Instant::now();
        let record = acquirer.acquire(&target()).await;

        assert!(record.is_some());
        assert_eq!(primary.calls(), 3);
        assert_eq!(fallback.calls(), 2);
        assert_eq!(start.elapsed(), BACKOFF * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_target_consumes_attempts_without_queries() {
        let primary = FakeSource::succeeding_on(SourceKind::Primary, 1, primary_record());
        let fallback = FakeSource::succeeding_on(SourceKind::Fallback, 1, primary_record());
        let acquirer = StatusAcquirer::new(primary.clone(), fallback.clone()).with_policy(
            RetryPolicy {
                max_attempts: 4,
                backoff: Duration::from_secs(1),
            },
        );

        let start = Instant::now();
        let outcome = acquirer.acquire(&Target::new("", 25565)).await;

        assert!(outcome.is_none());
        assert_eq!(primary.calls(), 0);
        assert_eq!(fallback.calls(), 0);
        assert_eq!(start.elapsed(), Duration::from_secs(3));

        let outcome = acquirer.acquire(&Target::new("mc.example.org", 0)).await;
        assert!(outcome.is_none());
        assert_eq!(primary.calls(), 0);
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 90);
        assert_eq!(policy.backoff, Duration::from_secs(15));
    }
}
