use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use aid_domain::ObjectIdentity;

use crate::errors::ErrorKind;

/// What the ledger decided about one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerVerdict {
    /// The failure was accounted; the object stays retryable.
    Recorded { attempt: u32 },
    /// A failure inside the cooldown window; observed but not accounted.
    Throttled,
    /// The retry budget is exhausted (or the failure was
    /// operation-critical): mark the object as a terminal sync error.
    Surrender,
    /// System-critical failure: the agent must terminate.
    Abort,
}

#[derive(Debug, Clone, Copy)]
struct FailureRecord {
    count: u32,
    last_attempt: Instant,
}

/// Per-object retry accounting with cooldown.
///
/// A record exists only between an object's first accounted failure and its
/// success, surrender or the agent's death. The failure count increments at
/// most once per cooldown window.
#[derive(Debug)]
pub struct FailureLedger {
    max_operation_retry: u32,
    retry_cooldown: Duration,
    records: Mutex<HashMap<ObjectIdentity, FailureRecord>>,
}

impl FailureLedger {
    pub fn new(max_operation_retry: u32, retry_cooldown: Duration) -> Self {
        FailureLedger {
            max_operation_retry,
            retry_cooldown,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_operation_retry(&self) -> u32 {
        self.max_operation_retry
    }

    fn records(&self) -> MutexGuard<'_, HashMap<ObjectIdentity, FailureRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn on_success(&self, id: &ObjectIdentity) {
        self.records().remove(id);
    }

    pub fn on_failure(&self, id: &ObjectIdentity, kind: ErrorKind) -> LedgerVerdict {
        match kind {
            ErrorKind::Transient | ErrorKind::Unknown => self.retry_until_max(id),
            ErrorKind::OperationCritical => {
                self.records().remove(id);
                LedgerVerdict::Surrender
            }
            ErrorKind::SystemCritical => LedgerVerdict::Abort,
        }
    }

    fn retry_until_max(&self, id: &ObjectIdentity) -> LedgerVerdict {
        let now = Instant::now();
        let mut records = self.records();
        if let Some(record) = records.get(id) {
            if now.duration_since(record.last_attempt) < self.retry_cooldown {
                return LedgerVerdict::Throttled;
            }
        }
        let count = records.get(id).map(|r| r.count).unwrap_or(0) + 1;
        if count >= self.max_operation_retry {
            records.remove(id);
            LedgerVerdict::Surrender
        } else {
            records.insert(
                id.clone(),
                FailureRecord {
                    count,
                    last_attempt: now,
                },
            );
            LedgerVerdict::Recorded { attempt: count }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object() -> ObjectIdentity {
        ObjectIdentity::new("BridgeDomain", &["t1".to_string(), "bd1".to_string()])
    }

    #[tokio::test(start_paused = true)]
    async fn surrenders_after_max_retries_across_cooldown_windows() {
        let ledger = FailureLedger::new(3, Duration::from_secs(10));
        let id = object();

        // t=0, t=11, t=22: three accounted failures, the third surrenders.
        assert_eq!(
            ledger.on_failure(&id, ErrorKind::Transient),
            LedgerVerdict::Recorded { attempt: 1 }
        );
        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(
            ledger.on_failure(&id, ErrorKind::Transient),
            LedgerVerdict::Recorded { attempt: 2 }
        );
        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(
            ledger.on_failure(&id, ErrorKind::Transient),
            LedgerVerdict::Surrender
        );

        // t=33: the record was cleared, so a fourth failure opens a fresh one.
        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(
            ledger.on_failure(&id, ErrorKind::Transient),
            LedgerVerdict::Recorded { attempt: 1 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failures_inside_the_cooldown_window_are_not_accounted() {
        let ledger = FailureLedger::new(2, Duration::from_secs(10));
        let id = object();

        assert_eq!(
            ledger.on_failure(&id, ErrorKind::Unknown),
            LedgerVerdict::Recorded { attempt: 1 }
        );
        for _ in 0..5 {
            tokio::time::advance(Duration::from_secs(1)).await;
            assert_eq!(
                ledger.on_failure(&id, ErrorKind::Unknown),
                LedgerVerdict::Throttled
            );
        }
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(
            ledger.on_failure(&id, ErrorKind::Unknown),
            LedgerVerdict::Surrender
        );
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_the_record() {
        let ledger = FailureLedger::new(2, Duration::from_secs(10));
        let id = object();

        assert_eq!(
            ledger.on_failure(&id, ErrorKind::Transient),
            LedgerVerdict::Recorded { attempt: 1 }
        );
        ledger.on_success(&id);
        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(
            ledger.on_failure(&id, ErrorKind::Transient),
            LedgerVerdict::Recorded { attempt: 1 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn operation_critical_surrenders_immediately() {
        let ledger = FailureLedger::new(5, Duration::from_secs(10));
        let id = object();

        assert_eq!(
            ledger.on_failure(&id, ErrorKind::Transient),
            LedgerVerdict::Recorded { attempt: 1 }
        );
        assert_eq!(
            ledger.on_failure(&id, ErrorKind::OperationCritical),
            LedgerVerdict::Surrender
        );
        // The record is gone afterwards.
        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(
            ledger.on_failure(&id, ErrorKind::Transient),
            LedgerVerdict::Recorded { attempt: 1 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn system_critical_aborts_without_touching_records() {
        let ledger = FailureLedger::new(5, Duration::from_secs(10));
        let id = object();
        assert_eq!(
            ledger.on_failure(&id, ErrorKind::SystemCritical),
            LedgerVerdict::Abort
        );
    }
}
