//! Lenient cell coercion. Malformed values become missing, never errors.

pub mod datetime;
pub mod numeric;
