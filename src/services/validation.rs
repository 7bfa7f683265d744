// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile form validation.

use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;
use validator::{Validate, ValidationError, ValidationErrors};

pub const PHONE_REQUIRED: &str = "Phone number is required";
pub const PHONE_WITH_CODE: &str =
    "Phone number with country code should have 10-13 digits after +";
pub const PHONE_TEN_DIGITS: &str = "Phone number should be exactly 10 digits (e.g., 9876543210)";
pub const INSTITUTION_INVALID: &str = "Please enter a valid college/university name";
pub const EMAIL_INVALID: &str = "Invalid email address. Please sign in again.";

/// A phone number with separators removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

/// Why a phone number was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneError {
    Missing,
    BadCountryCodeLength,
    NotTenDigits,
}

impl PhoneError {
    pub fn message(&self) -> &'static str {
        match self {
            PhoneError::Missing => PHONE_REQUIRED,
            PhoneError::BadCountryCodeLength => PHONE_WITH_CODE,
            PhoneError::NotTenDigits => PHONE_TEN_DIGITS,
        }
    }
}

impl fmt::Display for PhoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for PhoneError {}

impl PhoneNumber {
    /// Strip whitespace, dashes and parentheses, then check the digit count:
    /// `+` followed by 10–13 digits, or exactly 10 digits.
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        if raw.trim().is_empty() {
            return Err(PhoneError::Missing);
        }

        let cleaned: String = raw
            .chars()
            .filter(|c| !(c.is_whitespace() || matches!(c, '-' | '(' | ')')))
            .collect();

        match cleaned.strip_prefix('+') {
            Some(digits) => {
                if !(10..=13).contains(&digits.len()) || !all_ascii_digits(digits) {
                    return Err(PhoneError::BadCountryCodeLength);
                }
            }
            None => {
                if cleaned.len() != 10 || !all_ascii_digits(&cleaned) {
                    return Err(PhoneError::NotTenDigits);
                }
            }
        }

        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

fn all_ascii_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    PhoneNumber::parse(phone).map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new("phone");
        err.message = Some(Cow::Borrowed(e.message()));
        err
    })
}

/// Profile completion form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileCompletionRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[serde(default, alias = "college")]
    #[validate(length(min = 2, message = "Please enter a valid college/university name"))]
    pub institution: String,
}

impl ProfileCompletionRequest {
    /// Trim both inputs the way the form does before validating.
    pub fn trimmed(self) -> Self {
        Self {
            phone: self.phone.trim().to_string(),
            institution: self.institution.trim().to_string(),
        }
    }

    /// Validate and return the normalized phone number.
    ///
    /// Phone errors are reported before institution errors.
    pub fn check(&self) -> Result<PhoneNumber, String> {
        if let Err(errors) = self.validate() {
            return Err(first_message(&errors));
        }
        PhoneNumber::parse(&self.phone).map_err(|e| e.message().to_string())
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    ["phone", "institution"]
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid profile details".to_string())
}
