//! Alert notification abstraction.
//!
//! A `Notifier` delivers one message per newly listed (date, movie, theatre).
//! Failures come back as values; callers log them and carry on.

mod twilio;
mod types;

pub use twilio::TwilioNotifier;
pub use types::*;
