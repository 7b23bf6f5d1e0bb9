pub mod health;
pub use self::health::health;

pub mod customers;

// common functions for the handlers
use regex::Regex;

/// Returns `true` when `email` has the `local@domain` shape with at least one
/// dot in the domain.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}
