//! Terminal output helpers shared by command handlers.

use std::fmt::Display;

use serde::Serialize;

use crate::error::Result;

/// Print a section header.
pub fn section(title: &str) {
    println!();
    println!("{title}");
}

/// Print an aligned `label: value` line.
pub fn field(label: &str, value: impl Display) {
    println!("  {label:<20} {value}");
}

/// Print a success line.
pub fn success(message: &str) {
    println!("✓ {message}");
}

/// Print a warning line.
pub fn warning(message: &str) {
    println!("! {message}");
}

/// Print `value` as one line of JSON.
///
/// # Errors
/// Returns an error if `value` cannot be serialized.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
