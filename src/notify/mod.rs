//! Subscriber registration and notification.
//!
//! Provides the [`Subscriber`] capability and the ordered registry the hub
//! notifies on every state change.

mod registry;
pub mod subscriber;

pub use registry::{SubscriberRegistry, SubscriptionHandle, SubscriptionId};
pub use subscriber::{FallibleFnSubscriber, FnSubscriber, Subscriber};
