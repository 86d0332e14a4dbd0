//! Optional advanced features.

#[cfg(feature = "history")]
pub mod history;

#[cfg(feature = "history")]
pub use history::{StateHistory, StateVersion};
