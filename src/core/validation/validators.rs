//! Reusable field validators
//!
//! Each validator receives the field name and its value and returns the
//! violation message on failure.

use validator::ValidateEmail;

fn label(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Validator: value must not be the empty string
pub fn not_empty() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &str| {
        if value.is_empty() {
            Err(format!("{} must not be empty.", label(field)))
        } else {
            Ok(())
        }
    }
}

/// Validator: value must have at least `min` characters
pub fn min_length(min: usize) -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &str| {
        if value.chars().count() < min {
            Err(format!(
                "{} must be at least {} characters long.",
                label(field),
                min
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: value must look like an e-mail address
pub fn email() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |_: &str, value: &str| {
        if value.validate_email() {
            Ok(())
        } else {
            Err("E-mail is invalid.".to_string())
        }
    }
}
