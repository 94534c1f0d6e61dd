//! Configuration and form validation support

use config::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Trait for validating configuration values
pub trait ValidateConfig: Serialize + for<'de> Deserialize<'de> {
    /// Validate the configuration
    ///
    /// Returns Ok(()) if valid, or an error describing what's wrong
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Common configuration validation helpers
pub mod validators {
    use config::ConfigError;

    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::Message(format!("{field}: cannot be empty")));
        }
        Ok(())
    }

    /// Validate URL format
    pub fn validate_url(url: &str, field: &str) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| ConfigError::Message(format!("{field}: invalid URL - {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "{field}: URL scheme must be http or https"
            )));
        }
        Ok(())
    }

    /// Validate that a route-like value starts with a slash
    pub fn validate_path(path: &str, field: &str) -> Result<(), ConfigError> {
        if !path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "{field}: must start with '/'"
            )));
        }
        Ok(())
    }

    /// Validate that a value is within range
    pub fn validate_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<(), ConfigError> {
        if value < min || value > max {
            return Err(ConfigError::Message(format!(
                "{field}: must be between {min} and {max}"
            )));
        }
        Ok(())
    }
}

/// Field name to message map produced by form validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`; the first message for a field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Record the outcome of a single-field check
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, message) in other.fields {
            self.fields.entry(field).or_insert(message);
        }
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let summary = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&summary)
    }
}

impl std::error::Error for ValidationErrors {}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z .'\-]*$").expect("name pattern is valid"));

static LETTERS_AND_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z ]+$").expect("letters pattern is valid"));

/// Single-field rules shared by the login, registration and intake forms
pub mod fields {
    use super::{EMAIL_PATTERN, LETTERS_AND_SPACES, NAME_PATTERN};

    pub const MIN_PASSWORD_LEN: usize = 8;

    pub fn name(value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("Name is required".into());
        }
        if value.chars().count() < 2 {
            return Err("Name must be at least 2 characters long".into());
        }
        if !NAME_PATTERN.is_match(value) {
            return Err("Name can only contain letters, spaces, and . ' -".into());
        }
        Ok(())
    }

    pub fn email(value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("Email is required".into());
        }
        if !EMAIL_PATTERN.is_match(value) {
            return Err("Please enter a valid email address".into());
        }
        Ok(())
    }

    /// Login only checks presence; strength is enforced at registration
    pub fn password_present(value: &str) -> Result<(), String> {
        if value.is_empty() {
            return Err("Password is required".into());
        }
        Ok(())
    }

    pub fn password(value: &str) -> Result<(), String> {
        password_present(value)?;
        if value.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            ));
        }
        Ok(())
    }

    pub fn phone(value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("Phone number is required".into());
        }
        optional_phone(value)
    }

    pub fn optional_phone(value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        if value.len() != 10 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err("Invalid phone number format. Please enter a 10-digit number.".into());
        }
        Ok(())
    }

    pub fn age(value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("Age is required".into());
        }
        match value.parse::<u32>() {
            Ok(age) if (1..=120).contains(&age) => Ok(()),
            _ => Err("Please enter a valid age between 1 and 120".into()),
        }
    }

    pub fn symptoms(values: &[String]) -> Result<(), String> {
        if values.iter().all(|s| s.trim().is_empty()) {
            return Err("Please select at least one symptom".into());
        }
        Ok(())
    }

    pub fn required(value: &str, message: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err(message.to_string());
        }
        Ok(())
    }

    pub fn description(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Detailed description is required".into());
        }
        if !value.contains(' ') {
            return Err("Please enter a valid description with spaces.".into());
        }
        Ok(())
    }

    pub fn address(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Address is required".into());
        }
        if value.chars().count() < 5 {
            return Err("Please enter a valid address (at least 5 characters).".into());
        }
        Ok(())
    }

    pub fn city(value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("City is required".into());
        }
        if !LETTERS_AND_SPACES.is_match(value) {
            return Err("City must contain only letters and spaces.".into());
        }
        Ok(())
    }

    pub fn state(value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("State is required".into());
        }
        if !LETTERS_AND_SPACES.is_match(value) {
            return Err("State must contain only letters and spaces.".into());
        }
        Ok(())
    }

    pub fn pincode(value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("Pincode is required".into());
        }
        if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err("Please enter a valid 6-digit pincode".into());
        }
        Ok(())
    }
}
