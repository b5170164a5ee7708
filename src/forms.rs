//! Input forms for creating drivers and updating their license numbers.
//!
//! Both the admin HTML pages and the JSON API submit these forms, so the
//! field rules and error messages are the same on either surface.

use model::store::NewDriver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

const USERNAME_MAX_LENGTH: usize = 150;
const PASSWORD_MIN_LENGTH: usize = 8;
const LICENSE_PREFIX_LETTERS: usize = 3;
const LICENSE_DIGITS: usize = 5;

fn error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    if value.chars().count() > USERNAME_MAX_LENGTH {
        return Err(error(
            "max_length",
            format!(
                "Ensure this value has at most {} characters.",
                USERNAME_MAX_LENGTH
            ),
        ));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !value.chars().all(allowed) {
        return Err(error(
            "invalid_username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_new_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    if value.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(error(
            "password_too_short",
            format!(
                "This password is too short. It must contain at least {} characters.",
                PASSWORD_MIN_LENGTH
            ),
        ));
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return Err(error(
            "password_entirely_numeric",
            "This password is entirely numeric.".to_string(),
        ));
    }
    Ok(())
}

/// Accepts exactly three uppercase Latin letters followed by five digits.
fn validate_license_number(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let chars: Vec<char> = value.chars().collect();
    let well_formed = chars.len() == LICENSE_PREFIX_LETTERS + LICENSE_DIGITS
        && chars[..LICENSE_PREFIX_LETTERS]
            .iter()
            .all(|c| c.is_ascii_uppercase())
        && chars[LICENSE_PREFIX_LETTERS..]
            .iter()
            .all(|c| c.is_ascii_digit());
    if !well_formed {
        return Err(error(
            "invalid_license_number",
            "License number must consist of 3 uppercase letters followed by 5 digits, e.g. AAA55555."
                .to_string(),
        ));
    }
    Ok(())
}

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Error lists for every named field, empty where the field is valid.
    pub fn for_fields(&self, fields: &[&str]) -> BTreeMap<String, Vec<String>> {
        fields
            .iter()
            .map(|field| (field.to_string(), self.get(field).to_vec()))
            .collect()
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                form_errors.add(&field.to_string(), message);
            }
        }
        form_errors
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Form for creating a driver account.
#[derive(Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct DriverCreationForm {
    #[validate(
        length(min = 1, message = "This field is required."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(
        length(min = 1, message = "This field is required."),
        custom(function = "validate_new_password")
    )]
    pub password1: String,
    #[validate(
        length(min = 1, message = "This field is required."),
        must_match(other = "password1", message = "The two password fields didn't match.")
    )]
    pub password2: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub last_name: String,
    #[validate(
        length(min = 1, message = "This field is required."),
        custom(function = "validate_license_number")
    )]
    pub license_number: String,
}

impl fmt::Debug for DriverCreationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverCreationForm")
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("license_number", &self.license_number)
            .finish_non_exhaustive()
    }
}

impl DriverCreationForm {
    pub const FIELDS: [&'static str; 6] = [
        "username",
        "password1",
        "password2",
        "first_name",
        "last_name",
        "license_number",
    ];

    /// Validates the submission and returns the driver to create.
    ///
    /// Surrounding whitespace is stripped from every value except the two
    /// passwords, which are taken verbatim.
    pub fn clean(&self) -> Result<NewDriver, FormErrors> {
        let cleaned = Self {
            username: self.username.trim().to_string(),
            password1: self.password1.clone(),
            password2: self.password2.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            license_number: self.license_number.trim().to_string(),
        };
        cleaned.validate()?;

        Ok(NewDriver::new(cleaned.username)
            .password(cleaned.password1)
            .names(cleaned.first_name, cleaned.last_name)
            .license_number(cleaned.license_number))
    }
}

/// Form for changing a driver's license number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct DriverLicenseUpdateForm {
    #[validate(
        length(min = 1, message = "This field is required."),
        custom(function = "validate_license_number")
    )]
    pub license_number: String,
}

impl DriverLicenseUpdateForm {
    pub const FIELDS: [&'static str; 1] = ["license_number"];

    /// Returns the trimmed license number when it is well formed.
    pub fn clean(&self) -> Result<String, FormErrors> {
        let cleaned = Self {
            license_number: self.license_number.trim().to_string(),
        };
        cleaned.validate()?;
        Ok(cleaned.license_number)
    }
}
