//! Builder for constructing NotificationHub instances.

use crate::core::hub::Validator;
use crate::core::{DeliveryPolicy, HubSettings, NotificationHub};
use crate::error::{HubError, Result, ValidationError};
use std::sync::Arc;

#[cfg(feature = "validation")]
use crate::core::Validate;

#[cfg(feature = "history")]
use crate::features::StateHistory;

#[cfg(feature = "metrics")]
use crate::metrics::HubMetrics;

/// Builder for constructing a `NotificationHub`.
///
/// # Examples
///
/// ```rust
/// use state_hub::prelude::*;
///
/// # fn main() -> Result<()> {
/// let hub = NotificationHub::builder()
///     .with_initial_state("idle".to_string())
///     .with_delivery_policy(DeliveryPolicy::Isolate)
///     .with_validation(|state: &String| {
///         if state.is_empty() {
///             return Err(ValidationError::custom("state must not be empty"));
///         }
///         Ok(())
///     })
///     .build()?;
///
/// assert_eq!(hub.get_state(), "idle");
/// # Ok(())
/// # }
/// ```
pub struct NotificationHubBuilder<T> {
    initial: Option<T>,
    policy: DeliveryPolicy,
    validator: Option<Validator<T>>,
    history_capacity: Option<usize>,
    #[cfg(feature = "metrics")]
    metrics: Option<HubMetrics>,
}

impl<T> NotificationHubBuilder<T>
where
    T: Send + Sync + 'static,
{
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            initial: None,
            policy: DeliveryPolicy::default(),
            validator: None,
            history_capacity: None,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Set the state the hub starts with.
    ///
    /// Without this, `build` uses `T::default()`.
    pub fn with_initial_state(mut self, initial: T) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Choose how failing subscribers affect a notification pass.
    pub fn with_delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Add a validation function every new state must pass.
    ///
    /// The validator also runs once against the initial state in `build`.
    pub fn with_validation<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Validate every new state with its [`Validate`] implementation.
    #[cfg(feature = "validation")]
    pub fn with_validate(self) -> Self
    where
        T: Validate,
    {
        self.with_validation(|state: &T| state.validate())
    }

    /// Keep a bounded history of committed states, enabling rollback.
    #[cfg(feature = "history")]
    pub fn with_history(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Record notification metrics with the provided meter.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(HubMetrics::new(meter));
        self
    }

    /// Apply loaded settings.
    ///
    /// Sets the delivery policy, and the history capacity when one is given.
    /// Settings are applied in call order with the other builder methods.
    pub fn with_settings(mut self, settings: &HubSettings) -> Self {
        self.policy = settings.delivery;
        if settings.history_capacity.is_some() {
            self.history_capacity = settings.history_capacity;
        }
        self
    }

    /// Build the hub.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The initial state fails validation
    /// - A history capacity of zero was requested
    pub fn build(self) -> Result<NotificationHub<T>>
    where
        T: Default,
    {
        let initial = self.initial.unwrap_or_default();

        if let Some(validator) = &self.validator {
            validator(&initial)?;
        }

        if self.history_capacity == Some(0) {
            return Err(HubError::InvalidSettings(
                "history capacity must be greater than 0".to_string(),
            ));
        }

        #[cfg(not(feature = "history"))]
        if self.history_capacity.is_some() {
            tracing::warn!("history capacity configured but the `history` feature is disabled");
        }

        let hub = NotificationHub::from_parts(initial, self.policy, self.validator);

        #[cfg(feature = "history")]
        let hub = match self.history_capacity {
            Some(capacity) => hub.attach_history(StateHistory::new(capacity)),
            None => hub,
        };

        #[cfg(feature = "metrics")]
        let hub = match self.metrics {
            Some(metrics) => hub.attach_metrics(metrics),
            None => hub,
        };

        Ok(hub)
    }
}

impl<T> Default for NotificationHubBuilder<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
