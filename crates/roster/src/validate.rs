//! Form validation for candidate records.
//!
//! Every field is checked independently and all failures are reported
//! together, so a front end can show each field's message at once. Within a
//! field the first failing rule wins.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::record::{Candidate, NewRecord};

/// Email shape accepted by the form (the WHATWG `input[type=email]` rule).
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("valid email regex")
});

/// A form field that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// The name field.
    Name,
    /// The email field.
    Email,
    /// The age field.
    Age,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Age];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Email => write!(f, "email"),
            Self::Age => write!(f, "age"),
        }
    }
}

/// Field-scoped validation messages, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field, replacing any earlier one.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// The message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether the field failed.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over failed fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Validate a candidate and produce a storable payload.
///
/// Values are trimmed before checking and the trimmed values are returned.
///
/// # Errors
///
/// Returns every failing field with its message when any rule is violated.
pub fn validate(candidate: &Candidate) -> Result<NewRecord, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = candidate.name.trim();
    if let Err(message) = check_name(name) {
        errors.insert(Field::Name, message);
    }

    let email = candidate.email.trim();
    if let Err(message) = check_email(email) {
        errors.insert(Field::Email, message);
    }

    let age = match parse_age(candidate.age.trim()) {
        Ok(age) => Some(age),
        Err(message) => {
            errors.insert(Field::Age, message);
            None
        }
    };

    match age {
        Some(age) if errors.is_empty() => Ok(NewRecord {
            name: name.to_string(),
            email: email.to_string(),
            age,
        }),
        _ => Err(errors),
    }
}

fn check_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("Name is required");
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        return Err("Email is required");
    }
    if !EMAIL_RE.is_match(email) {
        return Err("Invalid email address");
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_age(age: &str) -> Result<u32, &'static str> {
    if age.is_empty() {
        return Err("Age is required");
    }
    let value: f64 = age.parse().map_err(|_| "Age must be a number")?;
    if !value.is_finite() {
        return Err("Age must be a number");
    }
    if value <= 0.0 {
        return Err("Age must be a positive number");
    }
    if value.fract() != 0.0 {
        return Err("Age must be an integer");
    }
    if value > f64::from(u32::MAX) {
        return Err("Age is out of range");
    }
    Ok(value as u32)
}
