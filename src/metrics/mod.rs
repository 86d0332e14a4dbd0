//! Built-in metrics for notification passes.
//!
//! Provides OpenTelemetry metrics tracking:
//! - `set_state` calls
//! - Delivered and failed notifications
//! - Pass duration
//! - Active subscribers
//! - Validation failures
//!
//! # Examples
//!
//! ```rust,no_run
//! use state_hub::prelude::*;
//! use opentelemetry::global;
//!
//! # fn main() -> Result<()> {
//! let meter = global::meter("my-app");
//!
//! let hub = NotificationHub::<String>::builder()
//!     .with_metrics(meter)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod hub_metrics;

pub use hub_metrics::HubMetrics;
