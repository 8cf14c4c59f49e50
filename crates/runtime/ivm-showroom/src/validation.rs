//! Contact form validation rules

use crate::state::{FieldErrors, FormDraft, FormField};
use regex::Regex;
use std::sync::OnceLock;

pub const MIN_PHONE_DIGITS: usize = 10;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern compiles")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

fn digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn is_valid_phone(phone: &str) -> bool {
    digits(phone).len() >= MIN_PHONE_DIGITS
}

/// Group digits as `080 123 4567`, dropping anything past ten digits.
pub fn format_phone(value: &str) -> String {
    let d = digits(value);
    match d.len() {
        0..=3 => d,
        4..=6 => format!("{} {}", &d[..3], &d[3..]),
        7..=10 => format!("{} {} {}", &d[..3], &d[3..6], &d[6..]),
        _ => format!("{} {} {}", &d[..3], &d[3..6], &d[6..10]),
    }
}

/// Error for a single field as the user types; `None` means "clear it".
/// Empty input is not flagged until submit.
pub fn live_error(field: FormField, value: &str) -> Option<&'static str> {
    match field {
        FormField::Email if !value.is_empty() && !is_valid_email(value) => {
            Some("Please enter a valid email address")
        }
        FormField::Phone if !value.is_empty() && !is_valid_phone(value) => {
            Some("Please enter a valid phone number (min 10 digits)")
        }
        _ => None,
    }
}

/// Full validation run on submit.
pub fn validate(draft: &FormDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let mut flag = |field: FormField, message: &str| {
        errors.insert(field.key().to_string(), message.to_string());
    };

    if draft.name.trim().is_empty() {
        flag(FormField::Name, "Full Name is required");
    }

    if draft.email.trim().is_empty() {
        flag(FormField::Email, "Email Address is required");
    } else if !is_valid_email(&draft.email) {
        flag(FormField::Email, "Please enter a valid email address");
    }

    if draft.phone.trim().is_empty() {
        flag(FormField::Phone, "Phone Number is required");
    } else if !is_valid_phone(&draft.phone) {
        flag(FormField::Phone, "Please enter a valid phone number (min 10 digits)");
    }

    if draft.model_interest.is_empty() {
        flag(FormField::ModelInterest, "Please select a model of interest");
    }
    if draft.purpose.is_empty() {
        flag(FormField::Purpose, "Please select your purpose");
    }
    if draft.message.trim().is_empty() {
        flag(FormField::Message, "Message is required");
    }

    errors
}
