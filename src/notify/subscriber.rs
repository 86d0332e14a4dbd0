//! The subscriber capability and closure adapters.

use crate::error::SubscriberError;
use std::marker::PhantomData;
use std::sync::Arc;

/// A receiver of state-change notifications.
///
/// Implementors are registered with a [`NotificationHub`](crate::core::NotificationHub)
/// as `Arc<dyn Subscriber<T>>`. Two registrations refer to the same subscriber
/// when their `Arc`s point to the same allocation.
///
/// # Examples
///
/// ```rust
/// use state_hub::prelude::*;
/// use std::sync::Arc;
///
/// struct Printer;
///
/// impl Subscriber<String> for Printer {
///     fn notify(&self, state: &String) -> std::result::Result<(), SubscriberError> {
///         println!("state is now {}", state);
///         Ok(())
///     }
/// }
///
/// let hub: NotificationHub = NotificationHub::new();
/// hub.subscribe(Arc::new(Printer));
/// ```
pub trait Subscriber<T: ?Sized>: Send + Sync {
    /// Receive the new state.
    ///
    /// # Errors
    ///
    /// An error either aborts the current pass or is recorded in the pass
    /// report, depending on the hub's [`DeliveryPolicy`](crate::core::DeliveryPolicy).
    fn notify(&self, state: &T) -> Result<(), SubscriberError>;

    /// Name used in logs and failure reports.
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// A named subscriber backed by a closure that cannot fail.
///
/// Built with [`from_fn`].
pub struct FnSubscriber<T: ?Sized, F> {
    name: String,
    callback: F,
    _state: PhantomData<fn(&T)>,
}

impl<T, F> Subscriber<T> for FnSubscriber<T, F>
where
    T: ?Sized,
    F: Fn(&T) + Send + Sync,
{
    fn notify(&self, state: &T) -> Result<(), SubscriberError> {
        (self.callback)(state);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A named subscriber backed by a closure that may fail.
///
/// Built with [`from_fallible_fn`].
pub struct FallibleFnSubscriber<T: ?Sized, F> {
    name: String,
    callback: F,
    _state: PhantomData<fn(&T)>,
}

impl<T, F> Subscriber<T> for FallibleFnSubscriber<T, F>
where
    T: ?Sized,
    F: Fn(&T) -> Result<(), SubscriberError> + Send + Sync,
{
    fn notify(&self, state: &T) -> Result<(), SubscriberError> {
        (self.callback)(state)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wrap an infallible closure as a named subscriber.
///
/// # Examples
///
/// ```rust
/// use state_hub::notify::subscriber;
///
/// let printer = subscriber::from_fn("printer", |state: &String| {
///     println!("got {}", state);
/// });
/// ```
pub fn from_fn<T, F>(name: impl Into<String>, callback: F) -> Arc<FnSubscriber<T, F>>
where
    T: ?Sized,
    F: Fn(&T) + Send + Sync,
{
    Arc::new(FnSubscriber {
        name: name.into(),
        callback,
        _state: PhantomData,
    })
}

/// Wrap a closure that may fail as a named subscriber.
pub fn from_fallible_fn<T, F>(
    name: impl Into<String>,
    callback: F,
) -> Arc<FallibleFnSubscriber<T, F>>
where
    T: ?Sized,
    F: Fn(&T) -> Result<(), SubscriberError> + Send + Sync,
{
    Arc::new(FallibleFnSubscriber {
        name: name.into(),
        callback,
        _state: PhantomData,
    })
}

/// Identity of an `Arc` allocation, ignoring any vtable metadata.
pub(crate) fn identity<S: ?Sized>(subscriber: &Arc<S>) -> *const () {
    Arc::as_ptr(subscriber).cast::<()>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_from_fn_notifies() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        let sub = from_fn("counter", move |_: &String| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(sub.notify(&"x".to_string()).is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(sub.name(), "counter");
    }

    #[test]
    fn test_fallible_fn_reports_error() {
        let sub = from_fallible_fn("strict", |state: &String| {
            if state.is_empty() {
                Err(SubscriberError::new("empty state"))
            } else {
                Ok(())
            }
        });

        assert!(sub.notify(&"ok".to_string()).is_ok());
        let err = sub.notify(&String::new()).unwrap_err();
        assert_eq!(err.message(), "empty state");
    }

    #[test]
    fn test_default_name() {
        struct Silent;
        impl Subscriber<str> for Silent {
            fn notify(&self, _state: &str) -> Result<(), SubscriberError> {
                Ok(())
            }
        }
        assert_eq!(Silent.name(), "anonymous");
    }

    #[test]
    fn test_identity_ignores_coercion() {
        let concrete = from_fn("a", |_: &String| {});
        let erased: Arc<dyn Subscriber<String>> = concrete.clone();
        let other = from_fn("a", |_: &String| {});

        assert_eq!(identity(&concrete), identity(&erased));
        assert_ne!(identity(&concrete), identity(&other));
    }

    #[test]
    fn test_from_fn_erases_with_borrowed_name() {
        let label = String::from("borrowed");
        let erased: Arc<dyn Subscriber<String>> = from_fn(label.as_str(), |_: &String| {});
        drop(label);

        assert_eq!(erased.name(), "borrowed");
        assert!(erased.notify(&"x".to_string()).is_ok());
    }
}
