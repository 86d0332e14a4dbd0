//! State history with rollback.
//!
//! Tracks committed states and lets a hub re-publish an earlier one.

use crate::core::NotificationHub;
use crate::core::NotifyReport;
use crate::error::{HubError, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

/// Upper bound on the slots reserved up front; larger histories grow on demand.
const PREALLOCATED_VERSIONS: usize = 16;

/// A versioned state snapshot.
pub struct StateVersion<T> {
    /// Version number (monotonically increasing)
    pub version: u64,
    /// Timestamp when this version was committed
    pub timestamp: DateTime<Utc>,
    /// The state value
    pub state: Arc<T>,
    /// Optional description of why this version was created
    pub source: Option<String>,
}

impl<T> Clone for StateVersion<T> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            timestamp: self.timestamp,
            state: Arc::clone(&self.state),
            source: self.source.clone(),
        }
    }
}

struct HistoryInner<T> {
    versions: VecDeque<StateVersion<T>>,
    next_version: u64,
}

/// Bounded history of committed states.
///
/// Once `max_size` versions are held, recording a new one drops the oldest.
///
/// # Examples
///
/// ```rust
/// use state_hub::features::StateHistory;
/// use std::sync::Arc;
///
/// let history: StateHistory<String> = StateHistory::new(10);
/// history.record(Arc::new("on".to_string()), None);
/// assert_eq!(history.len(), 1);
/// ```
pub struct StateHistory<T> {
    inner: Arc<RwLock<HistoryInner<T>>>,
    max_size: usize,
}

impl<T> StateHistory<T> {
    /// Create a new history keeping at most `max_size` versions.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HistoryInner {
                versions: VecDeque::with_capacity(max_size.min(PREALLOCATED_VERSIONS)),
                next_version: 0,
            })),
            max_size,
        }
    }

    /// Record a new version and return its number.
    pub fn record(&self, state: Arc<T>, source: Option<String>) -> u64 {
        let mut inner = self.inner.write();
        let version = inner.next_version;
        inner.next_version += 1;

        inner.versions.push_back(StateVersion {
            version,
            timestamp: Utc::now(),
            state,
            source,
        });

        while inner.versions.len() > self.max_size {
            inner.versions.pop_front();
        }

        version
    }

    /// Maximum number of versions kept.
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Get the current version number.
    pub fn current_version(&self) -> u64 {
        self.inner.read().next_version.saturating_sub(1)
    }

    /// Get the number of versions held.
    pub fn len(&self) -> usize {
        self.inner.read().versions.len()
    }

    /// Check if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a specific version by number.
    pub fn get_version(&self, version: u64) -> Option<StateVersion<T>> {
        self.inner
            .read()
            .versions
            .iter()
            .find(|v| v.version == version)
            .cloned()
    }

    /// Get the `count` most recent versions, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<StateVersion<T>> {
        self.inner
            .read()
            .versions
            .iter()
            .rev()
            .take(count)
            .cloned()
            .collect()
    }

    /// State `steps` versions back from the newest (1 = previous).
    ///
    /// Returns `None` if stepping back that far exceeds the history.
    pub fn rollback_steps(&self, steps: usize) -> Option<Arc<T>> {
        let inner = self.inner.read();
        if inner.versions.len() <= steps {
            return None;
        }
        let index = inner.versions.len() - steps - 1;
        inner.versions.get(index).map(|v| Arc::clone(&v.state))
    }
}

impl<T> Clone for StateHistory<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            max_size: self.max_size,
        }
    }
}

impl<T> NotificationHub<T>
where
    T: Send + Sync + 'static,
{
    /// The history attached to this hub, if it was built with one.
    pub fn history(&self) -> Option<&StateHistory<T>> {
        self.history.as_ref()
    }

    /// Re-publish the state from `steps` versions back.
    ///
    /// The restored state becomes current, is recorded as a new version and
    /// is delivered to subscribers like any other state change. Validation
    /// is skipped since the state was accepted when it was first recorded.
    ///
    /// # Errors
    ///
    /// - `HistoryDisabled` if the hub has no history
    /// - `InsufficientHistory` if `steps` reaches past the oldest version
    /// - `SubscriberFailed` under [`DeliveryPolicy::Propagate`](crate::core::DeliveryPolicy)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use state_hub::prelude::*;
    ///
    /// # fn main() -> Result<()> {
    /// let hub = NotificationHub::<String>::builder().with_history(8).build()?;
    /// hub.set_state("one".to_string())?;
    /// hub.set_state("two".to_string())?;
    ///
    /// hub.rollback(1)?;
    /// assert_eq!(hub.get_state(), "one");
    /// # Ok(())
    /// # }
    /// ```
    pub fn rollback(&self, steps: usize) -> Result<NotifyReport> {
        let history = self.history.as_ref().ok_or(HubError::HistoryDisabled)?;
        let state = history
            .rollback_steps(steps)
            .ok_or_else(|| HubError::InsufficientHistory {
                requested: steps,
                available: history.len().saturating_sub(1),
            })?;

        tracing::debug!(steps, "rolling back state");
        self.commit(state, format!("rollback {} steps", steps))
    }

    /// Re-publish the state recorded as `version`.
    ///
    /// # Errors
    ///
    /// - `HistoryDisabled` if the hub has no history
    /// - `VersionNotFound` if the version was never recorded or was evicted
    /// - `SubscriberFailed` under [`DeliveryPolicy::Propagate`](crate::core::DeliveryPolicy)
    pub fn rollback_to_version(&self, version: u64) -> Result<NotifyReport> {
        let history = self.history.as_ref().ok_or(HubError::HistoryDisabled)?;
        let state = history
            .get_version(version)
            .map(|v| v.state)
            .ok_or(HubError::VersionNotFound(version))?;

        tracing::debug!(version, "rolling back state to version");
        self.commit(state, format!("rollback to version {}", version))
    }
}
