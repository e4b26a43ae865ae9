//! Customers
//!
//! Delivery details collected at checkout. Details are remembered between orders so that a
//! returning customer can send an order without filling the form again.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::{Storage, StorageError};

/// Storage key holding the saved customer details.
pub const CUSTOMER_STORAGE_KEY: &str = "customerDetails";

/// Form fields subject to validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Customer name
    Name,
    /// Phone number
    Phone,
    /// Email address
    Email,
    /// Street address
    Address,
    /// City
    City,
    /// Postal index number
    Pincode,
    /// State
    State,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Name => "Name",
            Field::Phone => "Phone number",
            Field::Email => "Email",
            Field::Address => "Address",
            Field::City => "City",
            Field::Pincode => "Pincode",
            Field::State => "State",
        })
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The field was blank.
    #[error("{0} is required")]
    Required(Field),

    /// The phone number did not contain exactly ten digits.
    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhone,

    /// The email address was malformed.
    #[error("Please enter a valid email address")]
    InvalidEmail,

    /// The pincode was not exactly six digits.
    #[error("Please enter a valid 6-digit pincode")]
    InvalidPincode,
}

impl FieldError {
    /// The field this error belongs to.
    pub fn field(&self) -> Field {
        match self {
            FieldError::Required(field) => *field,
            FieldError::InvalidPhone => Field::Phone,
            FieldError::InvalidEmail => Field::Email,
            FieldError::InvalidPincode => Field::Pincode,
        }
    }
}

/// Every validation failure found on a form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} invalid field(s): {}", .0.len(), join(.0))]
pub struct ValidationErrors(SmallVec<[FieldError; 4]>);

impl ValidationErrors {
    /// The individual failures, in form order.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// The failure for a field, if any.
    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|error| error.field() == field)
    }
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Delivery details for an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerDetails {
    /// Full name
    pub name: String,

    /// Phone number, any formatting
    pub phone: String,

    /// Email address
    pub email: String,

    /// Street address
    pub address: String,

    /// City
    pub city: String,

    /// Six digit postal code
    pub pincode: String,

    /// State
    pub state: String,

    /// Free-form delivery notes for the current order only; never saved.
    #[serde(skip)]
    pub additional_info: Option<String>,
}

impl CustomerDetails {
    /// Checks every field and collects all failures.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing each invalid field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = SmallVec::new();

        if is_blank(&self.name) {
            errors.push(FieldError::Required(Field::Name));
        }

        if is_blank(&self.phone) {
            errors.push(FieldError::Required(Field::Phone));
        } else if self.phone.chars().filter(char::is_ascii_digit).count() != 10 {
            errors.push(FieldError::InvalidPhone);
        }

        if is_blank(&self.email) {
            errors.push(FieldError::Required(Field::Email));
        } else if !is_email(&self.email) {
            errors.push(FieldError::InvalidEmail);
        }

        if is_blank(&self.address) {
            errors.push(FieldError::Required(Field::Address));
        }

        if is_blank(&self.city) {
            errors.push(FieldError::Required(Field::City));
        }

        if is_blank(&self.pincode) {
            errors.push(FieldError::Required(Field::Pincode));
        } else if !is_pincode(&self.pincode) {
            errors.push(FieldError::InvalidPincode);
        }

        if is_blank(&self.state) {
            errors.push(FieldError::Required(Field::State));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Overlays the non-blank fields of `other` onto these details.
    #[must_use]
    pub fn merged_with(mut self, other: CustomerDetails) -> Self {
        fn overlay(target: &mut String, value: String) {
            if !is_blank(&value) {
                *target = value;
            }
        }

        overlay(&mut self.name, other.name);
        overlay(&mut self.phone, other.phone);
        overlay(&mut self.email, other.email);
        overlay(&mut self.address, other.address);
        overlay(&mut self.city, other.city);
        overlay(&mut self.pincode, other.pincode);
        overlay(&mut self.state, other.state);

        if other.additional_info.is_some() {
            self.additional_info = other.additional_info;
        }

        self
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

fn is_pincode(value: &str) -> bool {
    value.len() == 6 && value.chars().all(|c| c.is_ascii_digit())
}

/// Errors from saving or forgetting customer details.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The details failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The details could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The details could not be serialised.
    #[error("failed to encode customer details: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Saved customer details and returning-customer state.
#[derive(Debug)]
pub struct CustomerProfile<S: Storage> {
    storage: S,
    details: CustomerDetails,
    returning: bool,
}

impl<S: Storage> CustomerProfile<S> {
    /// Loads saved details from `storage`.
    ///
    /// The customer is treated as returning when saved details exist and parse. Corrupt or
    /// unreadable details are treated as absent.
    pub fn load(storage: S) -> Self {
        let saved = match storage.get(CUSTOMER_STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<CustomerDetails>(&raw)
                .map_err(|error| warn!(%error, "saved customer details are corrupt; ignoring"))
                .ok(),
            Ok(None) => None,
            Err(error) => {
                warn!(%error, "could not read saved customer details");
                None
            }
        };

        Self {
            storage,
            returning: saved.is_some(),
            details: saved.unwrap_or_default(),
        }
    }

    /// Current details: the saved ones, or the last ones passed to [`Self::save`].
    pub fn details(&self) -> &CustomerDetails {
        &self.details
    }

    /// Whether details were saved by an earlier session.
    pub fn is_returning(&self) -> bool {
        self.returning
    }

    /// Validates and saves `details`. Additional info is kept for this session only.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] if validation fails or the details cannot be written.
    pub fn save(&mut self, details: CustomerDetails) -> Result<(), ProfileError> {
        details.validate()?;

        let json = serde_json::to_string(&details)?;
        self.storage.set(CUSTOMER_STORAGE_KEY, &json)?;

        debug!("saved customer details");

        self.details = details;

        Ok(())
    }

    /// Deletes saved details and resets returning-customer state.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] if the storage backend fails.
    pub fn forget(&mut self) -> Result<(), ProfileError> {
        self.storage.remove(CUSTOMER_STORAGE_KEY)?;

        self.details = CustomerDetails::default();
        self.returning = false;

        Ok(())
    }

    /// Consume the profile, returning its storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::storage::MemoryStorage;

    use super::*;

    fn valid_details() -> CustomerDetails {
        CustomerDetails {
            name: "Arjun Kumar".to_string(),
            phone: "98765-43210".to_string(),
            email: "arjun@example.in".to_string(),
            address: "12 Anna Salai".to_string(),
            city: "Chennai".to_string(),
            pincode: "600002".to_string(),
            state: "Tamil Nadu".to_string(),
            additional_info: None,
        }
    }

    #[test]
    fn valid_details_pass() {
        assert_eq!(valid_details().validate(), Ok(()));
    }

    #[test]
    fn blank_form_reports_every_required_field() {
        let errors = CustomerDetails::default().validate().err();

        assert_eq!(errors.as_ref().map(|errors| errors.errors().len()), Some(7));
        assert_eq!(
            errors.as_ref().and_then(|errors| errors.get(Field::Pincode)),
            Some(&FieldError::Required(Field::Pincode))
        );
    }

    #[test]
    fn phone_counts_digits_only() {
        let mut details = valid_details();

        details.phone = "98765 4321".to_string();
        assert_eq!(
            details.validate().err().as_ref().and_then(|e| e.get(Field::Phone)),
            Some(&FieldError::InvalidPhone)
        );

        details.phone = "(987) 654-3210".to_string();
        assert_eq!(details.validate(), Ok(()));
    }

    #[test]
    fn country_code_prefix_is_rejected() {
        let mut details = valid_details();

        for phone in ["+91 98765-43210", "919876543210", "0 98765 43210"] {
            details.phone = phone.to_string();

            assert_eq!(
                details.validate().err().as_ref().and_then(|e| e.get(Field::Phone)),
                Some(&FieldError::InvalidPhone),
                "expected {phone:?} to be rejected"
            );
        }
    }

    #[test]
    fn email_shape_is_checked() {
        let invalid = [
            "arjun",
            "arjun@",
            "@example.in",
            "arjun@example",
            "ar jun@example.in",
            "a@b@c.in",
        ];

        for bad in invalid {
            let mut details = valid_details();
            details.email = bad.to_string();

            assert!(details.validate().is_err(), "expected {bad:?} to be rejected");
        }
    }

    #[test]
    fn pincode_must_be_six_digits() {
        let mut details = valid_details();

        details.pincode = "60000".to_string();
        assert!(details.validate().is_err());

        details.pincode = "60000a".to_string();
        assert!(details.validate().is_err());
    }

    #[test]
    fn merge_overlays_non_blank_fields() {
        let update = CustomerDetails {
            city: "Coimbatore".to_string(),
            additional_info: Some("Ring the bell".to_string()),
            ..CustomerDetails::default()
        };

        let merged = valid_details().merged_with(update);

        assert_eq!(merged.city, "Coimbatore");
        assert_eq!(merged.name, "Arjun Kumar");
        assert_eq!(merged.additional_info.as_deref(), Some("Ring the bell"));
    }

    #[test]
    fn new_profile_is_not_returning() {
        let profile = CustomerProfile::load(MemoryStorage::new());

        assert!(!profile.is_returning());
        assert_eq!(profile.details(), &CustomerDetails::default());
    }

    #[test]
    fn saved_details_make_a_returning_customer() -> TestResult {
        let mut profile = CustomerProfile::load(MemoryStorage::new());

        profile.save(CustomerDetails {
            additional_info: Some("Leave at gate".to_string()),
            ..valid_details()
        })?;

        let reloaded = CustomerProfile::load(profile.into_storage());

        assert!(reloaded.is_returning());
        assert_eq!(reloaded.details(), &valid_details());
        assert_eq!(reloaded.details().additional_info, None);

        Ok(())
    }

    #[test]
    fn invalid_details_are_not_saved() -> TestResult {
        let mut profile = CustomerProfile::load(MemoryStorage::new());

        let result = profile.save(CustomerDetails::default());

        assert!(matches!(result, Err(ProfileError::Validation(_))));
        assert_eq!(profile.into_storage().get(CUSTOMER_STORAGE_KEY)?, None);

        Ok(())
    }

    #[test]
    fn forget_resets_returning_state() -> TestResult {
        let storage = MemoryStorage::new().with_value(
            CUSTOMER_STORAGE_KEY,
            &serde_json::to_string(&valid_details())?,
        );
        let mut profile = CustomerProfile::load(storage);

        assert!(profile.is_returning());

        profile.forget()?;

        assert!(!profile.is_returning());
        assert_eq!(profile.into_storage().get(CUSTOMER_STORAGE_KEY)?, None);

        Ok(())
    }

    #[test]
    fn partial_saved_details_fill_with_blanks() {
        let storage =
            MemoryStorage::new().with_value(CUSTOMER_STORAGE_KEY, r#"{"name":"Arjun"}"#);

        let profile = CustomerProfile::load(storage);

        assert!(profile.is_returning());
        assert_eq!(profile.details().name, "Arjun");
        assert!(profile.details().city.is_empty());
    }

    #[test]
    fn corrupt_saved_details_are_ignored() {
        let storage = MemoryStorage::new().with_value(CUSTOMER_STORAGE_KEY, "nope");

        let profile = CustomerProfile::load(storage);

        assert!(!profile.is_returning());
    }
}
