//! Delivery policy and per-pass outcome.

use crate::error::SubscriberError;
use crate::notify::SubscriptionId;
use serde::{Deserialize, Serialize};

/// How a notification pass reacts to a failing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPolicy {
    /// The first failure aborts the pass and is returned from `set_state`.
    /// Subscribers after the failing one are not notified.
    #[default]
    Propagate,
    /// Every subscriber is notified. Failures are logged and collected in
    /// the [`NotifyReport`].
    Isolate,
}

/// A subscriber failure recorded under [`DeliveryPolicy::Isolate`].
#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    /// Registration that failed
    pub id: SubscriptionId,
    /// Name reported by the subscriber
    pub subscriber: String,
    /// The error the subscriber returned
    pub error: SubscriberError,
}

/// Outcome of one notification pass.
#[derive(Debug, Clone, Default)]
pub struct NotifyReport {
    /// Number of subscribers that accepted the notification.
    pub delivered: usize,
    /// Subscribers that returned an error (isolated delivery only).
    pub failures: Vec<DeliveryFailure>,
}

impl NotifyReport {
    /// True when no subscriber failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of subscribers the pass reached.
    pub fn attempted(&self) -> usize {
        self.delivered + self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_propagates() {
        assert_eq!(DeliveryPolicy::default(), DeliveryPolicy::Propagate);
    }

    #[test]
    fn test_report_counts() {
        let mut report = NotifyReport::default();
        assert!(report.is_clean());

        report.delivered = 2;
        report.failures.push(DeliveryFailure {
            id: SubscriptionId::new(1),
            subscriber: "flaky".to_string(),
            error: SubscriberError::new("boom"),
        });

        assert!(!report.is_clean());
        assert_eq!(report.attempted(), 3);
    }
}
