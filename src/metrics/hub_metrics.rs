//! Notification metrics using OpenTelemetry.

use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use std::time::Instant;

/// Metrics collector for hub operations.
///
/// # Examples
///
/// ```rust,no_run
/// use state_hub::metrics::HubMetrics;
/// use opentelemetry::global;
///
/// let metrics = HubMetrics::new(global::meter("state-hub"));
///
/// let timer = metrics.start_pass();
/// // ... notify subscribers ...
/// metrics.record_pass(timer, 3, 0);
/// ```
#[derive(Clone)]
pub struct HubMetrics {
    set_state_calls: Counter<u64>,
    delivered: Counter<u64>,
    failed: Counter<u64>,
    pass_duration: Histogram<f64>,
    active_subscribers: Gauge<i64>,
    validation_failures: Counter<u64>,
}

impl HubMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let set_state_calls = meter
            .u64_counter("state_hub.set_state.calls")
            .with_description("Total number of notification passes started")
            .build();

        let delivered = meter
            .u64_counter("state_hub.notifications.delivered")
            .with_description("Notifications accepted by subscribers")
            .build();

        let failed = meter
            .u64_counter("state_hub.notifications.failed")
            .with_description("Notifications rejected by subscribers")
            .build();

        let pass_duration = meter
            .f64_histogram("state_hub.pass.duration")
            .with_description("Duration of notification passes in seconds")
            .with_unit("s")
            .build();

        let active_subscribers = meter
            .i64_gauge("state_hub.subscribers.active")
            .with_description("Number of active registrations")
            .build();

        let validation_failures = meter
            .u64_counter("state_hub.validation.failures")
            .with_description("Number of states rejected by validation")
            .build();

        Self {
            set_state_calls,
            delivered,
            failed,
            pass_duration,
            active_subscribers,
            validation_failures,
        }
    }

    /// Start timing a notification pass.
    ///
    /// Pass the returned `Instant` to [`record_pass`](Self::record_pass).
    pub fn start_pass(&self) -> Instant {
        self.set_state_calls.add(1, &[]);
        Instant::now()
    }

    /// Record the outcome of a pass started with `start_pass`.
    pub fn record_pass(&self, start: Instant, delivered: usize, failed: usize) {
        self.delivered.add(delivered as u64, &[]);
        self.failed.add(failed as u64, &[]);
        self.pass_duration.record(start.elapsed().as_secs_f64(), &[]);
    }

    /// Record a state rejected by validation.
    pub fn record_validation_failure(&self) {
        self.validation_failures.add(1, &[]);
    }

    /// Update the number of active registrations.
    pub fn update_subscriber_count(&self, count: usize) {
        self.active_subscribers
            .record(i64::try_from(count).unwrap_or(i64::MAX), &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NotificationHub;
    use opentelemetry::global;

    #[test]
    fn test_metrics_operations() {
        let metrics = HubMetrics::new(global::meter("test"));

        let timer = metrics.start_pass();
        metrics.record_pass(timer, 2, 1);
        metrics.record_validation_failure();
        metrics.update_subscriber_count(5);
    }

    #[test]
    fn test_hub_with_metrics() {
        let hub = NotificationHub::<String>::builder()
            .with_metrics(global::meter("test"))
            .build()
            .unwrap();

        let id = hub.on_change("noop", |_: &String| {});
        hub.set_state("x".to_string()).unwrap();
        hub.unsubscribe_id(id);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_hub_metrics_follow_handle_drops() {
        let hub = NotificationHub::<String>::builder()
            .with_metrics(global::meter("test"))
            .build()
            .unwrap();

        let handle = hub.subscribe_scoped(crate::notify::subscriber::from_fn(
            "scoped",
            |_: &String| {},
        ));
        hub.set_state("x".to_string()).unwrap();
        drop(handle);

        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.set_state("y".to_string()).unwrap().delivered, 0);
    }
}
