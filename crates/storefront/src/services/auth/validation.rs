//! Client-side signup validation.

use petal_core::{Email, PhoneNumber};

use super::FieldErrors;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw signup form input.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

/// A signup form that passed validation.
#[derive(Debug, Clone)]
pub(crate) struct ValidSignup<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: Email,
    pub phone: PhoneNumber,
    pub password: &'a str,
}

impl SignupForm {
    /// Validate every field, collecting one message per failing field.
    ///
    /// # Errors
    ///
    /// Returns the collected [`FieldErrors`] if any field is invalid.
    pub(crate) fn validate(&self) -> Result<ValidSignup<'_>, FieldErrors> {
        let mut errors = FieldErrors::new();

        let first_name = required(&mut errors, "first_name", &self.first_name, "First name");
        let last_name = required(&mut errors, "last_name", &self.last_name, "Last name");

        let email = required(&mut errors, "email", &self.email, "Email")
            .and_then(|raw| Email::parse(raw).ok());
        if email.is_none() {
            errors.insert("email", "Please enter a valid email address");
        }

        let phone = required(&mut errors, "phone", &self.phone, "Phone number")
            .and_then(|raw| PhoneNumber::parse(raw).ok());
        if phone.is_none() {
            errors.insert(
                "phone",
                format!("Phone number must be exactly {} digits", PhoneNumber::DIGITS),
            );
        }

        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.insert(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }

        if self.confirm_password != self.password {
            errors.insert("confirm_password", "Passwords do not match");
        }

        match (first_name, last_name, email, phone) {
            (Some(first_name), Some(last_name), Some(email), Some(phone)) if errors.is_empty() => {
                Ok(ValidSignup {
                    first_name,
                    last_name,
                    email,
                    phone,
                    password: &self.password,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Validate the login form fields.
///
/// # Errors
///
/// Returns [`FieldErrors`] if either field is blank.
pub(crate) fn validate_login(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    required(&mut errors, "email", email, "Email");
    if password.is_empty() {
        errors.insert("password", "Password is required");
    }
    errors.into_result()
}

fn required<'a>(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &'a str,
    label: &str,
) -> Option<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.insert(field, format!("{label} is required"));
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> SignupForm {
        SignupForm {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            password: "rosebud123".to_string(),
            confirm_password: "rosebud123".to_string(),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let form = valid_form();
        let valid = form.validate().unwrap();
        assert_eq!(valid.email.as_str(), "asha@example.com");
        assert_eq!(valid.phone.as_str(), "9876543210");
    }

    #[test]
    fn test_short_password_is_the_only_error() {
        let form = SignupForm {
            password: "short".to_string(),
            confirm_password: "short".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 8 characters")
        );
    }

    #[test]
    fn test_required_fields() {
        let errors = SignupForm::default().validate().unwrap_err();
        assert_eq!(errors.get("first_name"), Some("First name is required"));
        assert_eq!(errors.get("last_name"), Some("Last name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("phone"), Some("Phone number is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[test]
    fn test_bad_email_phone_and_mismatch() {
        let form = SignupForm {
            email: "asha@".to_string(),
            phone: "98765".to_string(),
            confirm_password: "rosebud124".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
        assert_eq!(
            errors.get("phone"),
            Some("Phone number must be exactly 10 digits")
        );
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match"));
    }

    #[test]
    fn test_validate_login_requires_both_fields() {
        let errors = validate_login(" ", "").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(validate_login("a@b.co", "x").is_ok());
    }
}
