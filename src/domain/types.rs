//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (positive identifiers, trimmed
//! search terms, normalized phone numbers) so that once a value reaches the
//! domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use phonenumber::{Mode, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::{ValidateEmail, ValidationError};

/// Wire and form format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Phone number did not meet expected format.
    #[error("invalid phone number")]
    InvalidPhone,
    /// Provided uuid failed format validation.
    #[error("invalid uuid value")]
    InvalidUuid,
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| TypeConstraintError::NonPositiveId)?;
                Self::new(value)
            }
        }
    };
}

id_newtype!(CompanyId, "Unique identifier for a company.");
id_newtype!(CustomerId, "Unique identifier for a customer.");
id_newtype!(SupplierId, "Unique identifier for a supplier.");
id_newtype!(RegionId, "Unique identifier for a region.");
id_newtype!(TermOfPaymentId, "Unique identifier for a term of payment.");
id_newtype!(GroupCustomerId, "Unique identifier for a parent group customer.");
id_newtype!(InvoiceId, "Unique identifier for an invoice.");
id_newtype!(PurchaseOrderId, "Unique identifier for a purchase order.");
id_newtype!(BankMutationId, "Unique identifier for a bank mutation.");
id_newtype!(ReturnId, "Unique identifier for a goods return.");
id_newtype!(ParameterId, "Unique identifier for a master parameter.");

/// Trimmed, non-empty free-text search term.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(value: &str) -> Option<Self> {
        Self::new(value).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for SearchTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses a phone number and formats it as E.164.
pub fn normalize_phone_to_e164(value: &str) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    let parsed = parse(None, trimmed).map_err(|_| TypeConstraintError::InvalidPhone)?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}

/// `validator` hook for optional phone inputs: blank passes, anything else
/// must parse as an international number.
pub fn validate_optional_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    normalize_phone_to_e164(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("phone"))
}

/// `validator` hook for optional email inputs.
pub fn validate_optional_email(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.to_string().validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

/// `validator` hook for required `YYYY-MM-DD` dates.
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| ValidationError::new("date"))
}

/// Same as [`validate_date`] but blank passes.
pub fn validate_optional_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_date(value)
}

/// Normalizes a phone input, leaving unparseable or blank values untouched so
/// validation can report them.
pub fn normalize_optional_phone(value: &str) -> String {
    normalize_phone_to_e164(value).unwrap_or_else(|_| value.trim().to_string())
}

/// Per-render token used to refuse duplicate form submissions.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for SubmissionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubmissionId {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| TypeConstraintError::InvalidUuid)
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_reject_non_positive_values() {
        assert_eq!(CompanyId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(CompanyId::new(-4), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(CompanyId::new(7).map(CompanyId::get), Ok(7));
        assert_eq!("12".parse::<InvoiceId>().map(i32::from), Ok(12));
        assert!("abc".parse::<InvoiceId>().is_err());
    }

    #[test]
    fn search_term_trims_and_rejects_blank() {
        assert_eq!(SearchTerm::parse("  acme ").unwrap().as_str(), "acme");
        assert!(SearchTerm::parse("   ").is_none());
        assert!(SearchTerm::parse("").is_none());
    }

    #[test]
    fn phone_is_normalized_to_e164() {
        assert_eq!(
            normalize_phone_to_e164("+62 21 555 0199").unwrap(),
            "+62215550199"
        );
        assert_eq!(
            normalize_phone_to_e164("not a phone"),
            Err(TypeConstraintError::InvalidPhone)
        );
        assert!(validate_optional_phone("  ").is_ok());
        assert!(validate_optional_phone("12").is_err());
        assert!(validate_optional_email("").is_ok());
        assert!(validate_optional_email("ops@acme.example").is_ok());
        assert!(validate_optional_email("ops@").is_err());
    }

    #[test]
    fn dates_use_iso_format() {
        assert!(validate_date("2024-02-29").is_ok());
        assert!(validate_date("2023-02-29").is_err());
        assert!(validate_date("").is_err());
        assert!(validate_optional_date(" ").is_ok());
    }

    #[test]
    fn submission_id_round_trips_through_text() {
        let id = SubmissionId::generate();
        let parsed: SubmissionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("nope".parse::<SubmissionId>().is_err());
    }
}
