// Booking form validation

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-field validation failures. Every rule is evaluated on submit so the
/// caller can surface all of them at once.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("this field is required")]
    RequiredField,

    #[error("this value is not in a valid format")]
    InvalidFormat,

    #[error("this value is below the minimum allowed")]
    BelowMinimum,
}

/// The fields of the booking form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    PassengerName,
    Email,
    PhoneNumber,
    SeatCount,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::PassengerName => "passengerName",
            Field::Email => "email",
            Field::PhoneNumber => "phoneNumber",
            Field::SeatCount => "numberOfSeats",
        };
        write!(f, "{}", label)
    }
}

/// Field-to-failure map handed back when submission is rejected. The form
/// stays in its editing state until this is empty.
pub type FieldErrors = BTreeMap<Field, ValidationError>;

/// A validated booking submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub passenger_name: String,
    pub email: String,
    pub phone_number: String,
    pub seat_count: u32,
}

/// Raw form state as the user typed it.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub passenger_name: String,
    pub email: String,
    pub phone_number: String,
    pub seat_count: u32,
}

impl BookingForm {
    /// Run every rule and either hand back a `BookingRequest` or the full
    /// set of violations. Rules are not short-circuited.
    pub fn validate(&self) -> Result<BookingRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.passenger_name.trim();
        if name.is_empty() {
            errors.insert(Field::PassengerName, ValidationError::RequiredField);
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert(Field::Email, ValidationError::RequiredField);
        } else if !email_shape_ok(email) {
            errors.insert(Field::Email, ValidationError::InvalidFormat);
        }

        let phone = self.phone_number.trim();
        if phone.is_empty() {
            errors.insert(Field::PhoneNumber, ValidationError::RequiredField);
        }

        if self.seat_count < 1 {
            errors.insert(Field::SeatCount, ValidationError::BelowMinimum);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(BookingRequest {
            passenger_name: name.to_string(),
            email: email.to_string(),
            phone_number: phone.to_string(),
            seat_count: self.seat_count,
        })
    }
}

/// Permissive email shape: exactly one `@`, a non-empty local part, and at
/// least one `.` inside the domain (not at its edges).
fn email_shape_ok(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = match parts.next() {
        Some(domain) => domain,
        None => return false,
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn valid_form() -> BookingForm {
        BookingForm {
            passenger_name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            phone_number: "+91 98765 43210".to_string(),
            seat_count: 2,
        }
    }

    #[test]
    fn test_valid_form_is_accepted() {
        let request = valid_form().validate().unwrap();
        assert_eq!(request.passenger_name, "Asha Verma");
        assert_eq!(request.seat_count, 2);
    }

    #[test]
    fn test_whitespace_only_fields_are_required() {
        let form = BookingForm {
            passenger_name: "   ".to_string(),
            phone_number: "\t".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get(&Field::PassengerName),
            Some(&ValidationError::RequiredField)
        );
        assert_eq!(
            errors.get(&Field::PhoneNumber),
            Some(&ValidationError::RequiredField)
        );
    }

    #[test]
    fn test_all_violations_reported_at_once() {
        // Empty name, malformed email, empty phone, zero seats: all four
        // failures must surface together, not just the first.
        let form = BookingForm {
            passenger_name: String::new(),
            email: "abc".to_string(),
            phone_number: String::new(),
            seat_count: 0,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors.get(&Field::PassengerName),
            Some(&ValidationError::RequiredField)
        );
        assert_eq!(
            errors.get(&Field::Email),
            Some(&ValidationError::InvalidFormat)
        );
        assert_eq!(
            errors.get(&Field::PhoneNumber),
            Some(&ValidationError::RequiredField)
        );
        assert_eq!(
            errors.get(&Field::SeatCount),
            Some(&ValidationError::BelowMinimum)
        );
    }

    #[test_case("asha@example.com", true; "#1 plain address")]
    #[test_case("a@b.c", true; "#2 minimal shape")]
    #[test_case("first.last@mail.example.org", true; "#3 dots in local and domain")]
    #[test_case("abc", false; "#4 no at sign")]
    #[test_case("a@bc", false; "#5 no dot after at")]
    #[test_case("@b.c", false; "#6 empty local part")]
    #[test_case("a@.com", false; "#7 domain starts with dot")]
    #[test_case("a@com.", false; "#8 domain ends with dot")]
    #[test_case("a@b@c.com", false; "#9 two at signs")]
    fn test_email_shape(email: &str, expected: bool) {
        assert_eq!(email_shape_ok(email), expected);
    }

    #[test]
    fn test_rejected_form_produces_no_request() {
        let form = BookingForm {
            email: "not-an-email".to_string(),
            ..valid_form()
        };
        assert!(form.validate().is_err());
    }
}
