//! Ordered subscriber registry with snapshot reads.

use super::subscriber::{Subscriber, identity};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

/// Unique identifier for a registration.
///
/// Returned by every subscribe call. Registering the same subscriber twice
/// yields two distinct ids, so removing by id is never ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// One registration: the id it was issued and the subscriber it points at.
pub(crate) struct Entry<T> {
    pub(crate) id: SubscriptionId,
    pub(crate) subscriber: Arc<dyn Subscriber<T>>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            subscriber: Arc::clone(&self.subscriber),
        }
    }
}

/// Called with the new registration count after every change.
pub(crate) type CountListener = Arc<dyn Fn(usize) + Send + Sync>;

/// Internal registry state.
struct RegistryInner<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
    count_listener: Option<CountListener>,
}

impl<T> RegistryInner<T> {
    /// Take the registration out of the list.
    ///
    /// The caller must release the lock before dropping the returned entry:
    /// the subscriber's destructor may re-enter the registry.
    fn remove_id(&mut self, id: SubscriptionId) -> Option<Entry<T>> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    fn count_change(&self) -> Option<(CountListener, usize)> {
        self.count_listener
            .as_ref()
            .map(|listener| (Arc::clone(listener), self.entries.len()))
    }
}

fn report_count(change: Option<(CountListener, usize)>) {
    if let Some((listener, count)) = change {
        listener(count);
    }
}

/// Handle for a subscription that unsubscribes when dropped.
///
/// Returned by [`SubscriberRegistry::subscribe_scoped`]. The handle only holds
/// a weak reference, so it never keeps the registry alive.
#[must_use = "dropping the handle immediately unsubscribes"]
pub struct SubscriptionHandle<T> {
    id: SubscriptionId,
    registry: Option<Weak<RwLock<RegistryInner<T>>>>,
}

impl<T> SubscriptionHandle<T> {
    /// The id of the registration this handle guards.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Keep the subscription for the lifetime of the registry.
    ///
    /// Returns the id so it can still be removed explicitly.
    pub fn detach(mut self) -> SubscriptionId {
        self.registry = None;
        self.id
    }
}

impl<T> Drop for SubscriptionHandle<T> {
    fn drop(&mut self) {
        let Some(inner) = self.registry.take().and_then(|weak| weak.upgrade()) else {
            return;
        };
        let (removed, change) = {
            let mut guard = inner.write();
            let removed = guard.remove_id(self.id);
            (removed, guard.count_change())
        };
        if removed.is_some() {
            tracing::debug!(id = %self.id, "subscription handle dropped, unsubscribed");
            report_count(change);
        }
    }
}

impl<T> fmt::Debug for SubscriptionHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("attached", &self.registry.is_some())
            .finish()
    }
}

/// Ordered registry of subscribers.
///
/// Subscribers are kept in registration order. Duplicates are allowed.
/// Notification passes iterate a [`snapshot`](Self::snapshot) taken under the
/// read lock, so subscribers are always invoked with no lock held and may
/// freely subscribe or unsubscribe from inside their callback.
///
/// # Examples
///
/// ```rust
/// use state_hub::notify::{SubscriberRegistry, subscriber};
///
/// let registry: SubscriberRegistry<String> = SubscriberRegistry::new();
/// let printer = subscriber::from_fn("printer", |s: &String| println!("{}", s));
///
/// let id = registry.subscribe(printer.clone());
/// assert_eq!(registry.subscriber_count(), 1);
///
/// registry.unsubscribe_id(id);
/// assert_eq!(registry.subscriber_count(), 0);
/// ```
pub struct SubscriberRegistry<T> {
    inner: Arc<RwLock<RegistryInner<T>>>,
}

impl<T> SubscriberRegistry<T> {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner {
                entries: Vec::new(),
                next_id: 0,
                count_listener: None,
            })),
        }
    }

    /// Report the registration count to `listener` after every change,
    /// including removals made by dropped [`SubscriptionHandle`]s.
    ///
    /// The listener runs with no lock held.
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    pub(crate) fn on_count_change(&self, listener: CountListener) {
        let change = {
            let mut inner = self.inner.write();
            inner.count_listener = Some(listener);
            inner.count_change()
        };
        report_count(change);
    }

    /// Append a subscriber to the end of the registry.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> SubscriptionId {
        let (id, change) = {
            let mut inner = self.inner.write();
            let id = SubscriptionId::new(inner.next_id);
            inner.next_id += 1;
            tracing::debug!(id = %id, subscriber = subscriber.name(), "subscribed");
            inner.entries.push(Entry { id, subscriber });
            (id, inner.count_change())
        };
        report_count(change);
        id
    }

    /// Append a subscriber and return a handle that unsubscribes on drop.
    pub fn subscribe_scoped(&self, subscriber: Arc<dyn Subscriber<T>>) -> SubscriptionHandle<T> {
        let id = self.subscribe(subscriber);
        SubscriptionHandle {
            id,
            registry: Some(Arc::downgrade(&self.inner)),
        }
    }

    /// Remove the first registration of `subscriber`, compared by identity.
    ///
    /// Returns `false` (and does nothing) when it is not registered.
    pub fn unsubscribe<S: ?Sized>(&self, subscriber: &Arc<S>) -> bool {
        let target = identity(subscriber);
        let (entry, change) = {
            let mut inner = self.inner.write();
            let Some(index) = inner
                .entries
                .iter()
                .position(|entry| identity(&entry.subscriber) == target)
            else {
                return false;
            };
            let entry = inner.entries.remove(index);
            (entry, inner.count_change())
        };
        tracing::debug!(id = %entry.id, subscriber = entry.subscriber.name(), "unsubscribed");
        report_count(change);
        true
    }

    /// Remove exactly the registration identified by `id`.
    ///
    /// Returns `false` when the id is unknown or was already removed.
    pub fn unsubscribe_id(&self, id: SubscriptionId) -> bool {
        let (removed, change) = {
            let mut inner = self.inner.write();
            let removed = inner.remove_id(id);
            (removed, inner.count_change())
        };
        let Some(entry) = removed else {
            return false;
        };
        tracing::debug!(id = %id, subscriber = entry.subscriber.name(), "unsubscribed");
        report_count(change);
        true
    }

    /// Copy of the current registrations, in order.
    pub(crate) fn snapshot(&self) -> Vec<Entry<T>> {
        self.inner.read().entries.clone()
    }

    /// Get the number of active registrations.
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Ids of the active registrations, in notification order.
    pub fn subscription_ids(&self) -> Vec<SubscriptionId> {
        self.inner.read().entries.iter().map(|entry| entry.id).collect()
    }
}

impl<T> Default for SubscriberRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SubscriberRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
