//! # state-hub
//!
//! Synchronous subject/observer notification with ordered delivery.
//!
//! ## Overview
//!
//! A [`NotificationHub`](core::NotificationHub) holds a current state and an
//! ordered list of subscribers. Every `set_state` stores the new value and
//! then calls each subscriber, in registration order, before returning.
//!
//! - **Ordered delivery**: subscribers are notified in the order they subscribed
//! - **Snapshot passes**: changes to the registry made during a pass apply to
//!   the next pass, never the current one
//! - **Lock-free reads**: the current state lives in an `arc-swap`
//! - **Identity or token removal**: unsubscribe by `Arc` identity, by
//!   [`SubscriptionId`](notify::SubscriptionId), or by dropping a handle
//! - **Failure policy**: propagate the first subscriber failure, or isolate
//!   subscribers from each other
//!
//! ## Quick Start
//!
//! ```rust
//! use state_hub::prelude::*;
//! use state_hub::notify::subscriber;
//!
//! # fn main() -> Result<()> {
//! let hub: NotificationHub = NotificationHub::new();
//!
//! let a = subscriber::from_fn("A", |s: &String| println!("Observer A: {}", s));
//! hub.subscribe(a.clone());
//! hub.on_change("B", |s: &String| println!("Observer B: {}", s));
//!
//! hub.set_state("State 1".to_string())?;
//!
//! hub.unsubscribe(&a);
//! hub.set_state("State 2".to_string())?;
//!
//! assert_eq!(hub.get_state(), "State 2");
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `validation` (default): the [`Validate`](core::Validate) trait
//! - `history`: bounded state history and rollback
//! - `metrics`: OpenTelemetry metrics for notification passes

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod notify;

#[cfg(feature = "history")]
pub mod features;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        DeliveryPolicy, HubSettings, NotificationHub, NotificationHubBuilder, NotifyReport,
    };
    pub use crate::error::{HubError, Result, SubscriberError, ValidationError};
    pub use crate::notify::{Subscriber, SubscriptionHandle, SubscriptionId};

    #[cfg(feature = "validation")]
    pub use crate::core::Validate;
}
