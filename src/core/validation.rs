//! State validation support.

use crate::error::ValidationError;

/// Trait for state validation.
///
/// Implement this on your state type and call
/// [`NotificationHubBuilder::with_validate`](crate::core::NotificationHubBuilder::with_validate)
/// to reject invalid states before they are committed or delivered.
///
/// # Examples
///
/// ```rust
/// use state_hub::core::Validate;
/// use state_hub::error::ValidationError;
///
/// #[derive(Debug, Clone, Default)]
/// struct Thermostat {
///     target_celsius: f32,
/// }
///
/// impl Validate for Thermostat {
///     fn validate(&self) -> Result<(), ValidationError> {
///         if !(5.0..=30.0).contains(&self.target_celsius) {
///             return Err(ValidationError::invalid_state(
///                 "target-range",
///                 "target must be between 5 and 30 degrees",
///             ));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validate {
    /// Validate the state.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what validation failed.
    fn validate(&self) -> Result<(), ValidationError>;
}
