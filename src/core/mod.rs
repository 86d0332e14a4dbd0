//! Core hub types.

mod builder;
mod delivery;
mod hub;
mod settings;

#[cfg(feature = "validation")]
mod validation;

pub use builder::NotificationHubBuilder;
pub use delivery::{DeliveryFailure, DeliveryPolicy, NotifyReport};
pub use hub::NotificationHub;
pub use settings::HubSettings;

#[cfg(feature = "validation")]
pub use validation::Validate;
