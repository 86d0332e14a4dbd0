//! The notification hub: current state plus ordered subscribers.

use crate::core::{DeliveryFailure, DeliveryPolicy, NotificationHubBuilder, NotifyReport};
use crate::error::{HubError, Result, ValidationError};
use crate::notify::{Subscriber, SubscriberRegistry, SubscriptionHandle, SubscriptionId, subscriber};
use arc_swap::ArcSwap;
use std::sync::Arc;

#[cfg(feature = "history")]
use crate::features::StateHistory;

#[cfg(feature = "metrics")]
use crate::metrics::HubMetrics;

/// Type alias for validator functions.
pub(crate) type Validator<T> =
    Arc<dyn Fn(&T) -> std::result::Result<(), ValidationError> + Send + Sync>;

/// Holds a current state and pushes every change to its subscribers.
///
/// Each [`set_state`](Self::set_state) call stores the new state and then
/// notifies every registered subscriber, synchronously and in registration
/// order, before returning.
///
/// A pass iterates a snapshot of the registry taken when it starts. No lock
/// is held while a subscriber runs, so subscribers may subscribe, unsubscribe
/// or even call `set_state` on the same hub. Registry changes made during a
/// pass only affect later passes. A nested `set_state` runs its own pass over
/// the registry as it is at that moment.
///
/// Clones share state and subscribers.
///
/// # Examples
///
/// ```rust
/// use state_hub::prelude::*;
/// use state_hub::notify::subscriber;
///
/// # fn main() -> Result<()> {
/// let hub: NotificationHub = NotificationHub::new();
///
/// let a = subscriber::from_fn("A", |s: &String| println!("A got {}", s));
/// let b = subscriber::from_fn("B", |s: &String| println!("B got {}", s));
/// hub.subscribe(a.clone());
/// hub.subscribe(b);
///
/// hub.set_state("S1".to_string())?; // A then B
///
/// hub.unsubscribe(&a);
/// hub.set_state("S2".to_string())?; // only B
/// assert_eq!(hub.get_state(), "S2");
/// # Ok(())
/// # }
/// ```
pub struct NotificationHub<T = String> {
    /// The current state, wrapped in ArcSwap for lock-free reads
    state: Arc<ArcSwap<T>>,
    /// Ordered subscriber registry
    subscribers: SubscriberRegistry<T>,
    /// What a failing subscriber does to the pass
    policy: DeliveryPolicy,
    /// Optional validator run before a state is committed
    validator: Option<Validator<T>>,
    #[cfg(feature = "history")]
    pub(crate) history: Option<StateHistory<T>>,
    #[cfg(feature = "metrics")]
    metrics: Option<HubMetrics>,
}

impl<T> NotificationHub<T>
where
    T: Send + Sync + 'static,
{
    /// Create a hub whose initial state is `T::default()`.
    ///
    /// For the default `String` state that is the empty string.
    pub fn new() -> Self
    where
        T: Default,
    {
        Self::with_state(T::default())
    }

    /// Create a hub with an explicit initial state and default settings.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use state_hub::prelude::*;
    ///
    /// let hub = NotificationHub::with_state(42u32);
    /// assert_eq!(hub.get_state(), 42);
    /// ```
    pub fn with_state(initial: T) -> Self {
        Self {
            state: Arc::new(ArcSwap::new(Arc::new(initial))),
            subscribers: SubscriberRegistry::new(),
            policy: DeliveryPolicy::default(),
            validator: None,
            #[cfg(feature = "history")]
            history: None,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Create a new builder for constructing a hub.
    pub fn builder() -> NotificationHubBuilder<T> {
        NotificationHubBuilder::new()
    }

    /// Assemble a hub from builder parts.
    pub(crate) fn from_parts(
        initial: T,
        policy: DeliveryPolicy,
        validator: Option<Validator<T>>,
    ) -> Self {
        Self {
            policy,
            validator,
            ..Self::with_state(initial)
        }
    }

    /// Start recording committed states, beginning with the current one.
    #[cfg(feature = "history")]
    pub(crate) fn attach_history(mut self, history: StateHistory<T>) -> Self {
        history.record(self.state(), Some("initial".to_string()));
        self.history = Some(history);
        self
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn attach_metrics(mut self, metrics: HubMetrics) -> Self {
        let gauge = metrics.clone();
        self.subscribers
            .on_count_change(Arc::new(move |count: usize| gauge.update_subscriber_count(count)));
        self.metrics = Some(metrics);
        self
    }

    /// Register a subscriber at the end of the notification order.
    ///
    /// The same subscriber may be registered more than once; it is then
    /// notified once per registration.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> SubscriptionId {
        self.subscribers.subscribe(subscriber)
    }

    /// Register a subscriber that stays registered while the returned
    /// handle is alive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use state_hub::prelude::*;
    /// use state_hub::notify::subscriber;
    ///
    /// let hub: NotificationHub = NotificationHub::new();
    /// let handle = hub.subscribe_scoped(subscriber::from_fn("tmp", |_: &String| {}));
    /// assert_eq!(hub.subscriber_count(), 1);
    ///
    /// drop(handle);
    /// assert_eq!(hub.subscriber_count(), 0);
    /// ```
    pub fn subscribe_scoped(&self, subscriber: Arc<dyn Subscriber<T>>) -> SubscriptionHandle<T> {
        self.subscribers.subscribe_scoped(subscriber)
    }

    /// Register a named closure.
    pub fn on_change<F>(&self, name: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe(subscriber::from_fn(name, callback))
    }

    /// Remove the first registration of `subscriber`, compared by identity.
    ///
    /// Unknown subscribers are ignored. Returns whether anything was removed.
    pub fn unsubscribe<S: ?Sized>(&self, subscriber: &Arc<S>) -> bool {
        self.subscribers.unsubscribe(subscriber)
    }

    /// Remove exactly the registration identified by `id`.
    ///
    /// Unknown or already removed ids are ignored. Returns whether anything
    /// was removed.
    pub fn unsubscribe_id(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe_id(id)
    }

    /// Store a new state and notify every subscriber with it.
    ///
    /// The state is validated first (when a validator is configured), then
    /// committed, then delivered. Delivery happens in registration order and
    /// completes before this call returns.
    ///
    /// # Errors
    ///
    /// - `StateRejected` if validation fails. The current state is unchanged
    ///   and nobody is notified.
    /// - `SubscriberFailed` if a subscriber fails under
    ///   [`DeliveryPolicy::Propagate`]. The new state is already committed;
    ///   subscribers after the failing one are not notified in this pass.
    pub fn set_state(&self, new_state: T) -> Result<NotifyReport> {
        if let Some(validator) = &self.validator {
            if let Err(e) = validator(&new_state) {
                tracing::warn!(error = %e, "state rejected by validator");
                #[cfg(feature = "metrics")]
                if let Some(metrics) = &self.metrics {
                    metrics.record_validation_failure();
                }
                return Err(e.into());
            }
        }

        self.commit(Arc::new(new_state), "set_state".to_string())
    }

    /// Make `state` current, record it, and run a notification pass.
    #[cfg_attr(not(feature = "history"), allow(unused_variables))]
    pub(crate) fn commit(&self, state: Arc<T>, source: String) -> Result<NotifyReport> {
        self.state.store(Arc::clone(&state));

        #[cfg(feature = "history")]
        if let Some(history) = &self.history {
            history.record(Arc::clone(&state), Some(source));
        }

        self.publish(&state)
    }

    /// Deliver `state` to a snapshot of the registry.
    fn publish(&self, state: &T) -> Result<NotifyReport> {
        let snapshot = self.subscribers.snapshot();

        #[cfg(feature = "metrics")]
        let timer = self.metrics.as_ref().map(|m| m.start_pass());

        let mut report = NotifyReport::default();
        for entry in snapshot {
            match entry.subscriber.notify(state) {
                Ok(()) => {
                    tracing::trace!(id = %entry.id, subscriber = entry.subscriber.name(), "delivered");
                    report.delivered += 1;
                }
                Err(error) => match self.policy {
                    DeliveryPolicy::Propagate => {
                        tracing::debug!(
                            id = %entry.id,
                            subscriber = entry.subscriber.name(),
                            delivered = report.delivered,
                            "notification pass aborted by subscriber failure"
                        );
                        #[cfg(feature = "metrics")]
                        if let (Some(metrics), Some(start)) = (&self.metrics, timer) {
                            metrics.record_pass(start, report.delivered, 1);
                        }
                        return Err(HubError::SubscriberFailed {
                            id: entry.id,
                            subscriber: entry.subscriber.name().to_string(),
                            source: error,
                        });
                    }
                    DeliveryPolicy::Isolate => {
                        tracing::warn!(
                            id = %entry.id,
                            subscriber = entry.subscriber.name(),
                            error = %error,
                            "subscriber failed, continuing notification pass"
                        );
                        report.failures.push(DeliveryFailure {
                            id: entry.id,
                            subscriber: entry.subscriber.name().to_string(),
                            error,
                        });
                    }
                },
            }
        }

        tracing::debug!(
            delivered = report.delivered,
            failed = report.failures.len(),
            "notification pass complete"
        );

        #[cfg(feature = "metrics")]
        if let (Some(metrics), Some(start)) = (&self.metrics, timer) {
            metrics.record_pass(start, report.delivered, report.failures.len());
        }

        Ok(report)
    }

    /// Get a copy of the current state.
    ///
    /// Never notifies anyone and never blocks.
    pub fn get_state(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.state.load())
    }

    /// Get a reference-counted handle to the current state.
    ///
    /// Lock-free, and avoids cloning `T`.
    pub fn state(&self) -> Arc<T> {
        self.state.load_full()
    }

    /// Get the number of active registrations.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.subscriber_count()
    }

    /// The policy applied to failing subscribers.
    pub fn delivery_policy(&self) -> DeliveryPolicy {
        self.policy
    }
}

impl<T> Default for NotificationHub<T>
where
    T: Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NotificationHub<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            subscribers: self.subscribers.clone(),
            policy: self.policy,
            validator: self.validator.clone(),
            #[cfg(feature = "history")]
            history: self.history.clone(),
            #[cfg(feature = "metrics")]
            metrics: self.metrics.clone(),
        }
    }
}
