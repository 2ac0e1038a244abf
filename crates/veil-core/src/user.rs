//! Personal data supplied with a removal submission.

use crate::error::VeilError;
use serde::{Deserialize, Serialize};

/// The subject of a removal request.
///
/// Every field is optional on the wire so that a missing email can be
/// reported as a validation error rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserData {
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Contact email (required)
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
}

impl UserData {
    /// Build user data with an email and name.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            email: Some(email.into()),
            phone: None,
            address: None,
        }
    }

    /// `"first last"`, trimmed, with absent parts omitted.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    /// The email, if present and not blank.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }

    /// Ensure the data carries what every removal request needs.
    ///
    /// # Errors
    /// Returns `VeilError::Validation` if the email is missing or blank.
    pub fn validate(&self) -> Result<(), VeilError> {
        if self.email().is_none() {
            return Err(VeilError::Validation(
                "User data with email is required".to_string(),
            ));
        }
        Ok(())
    }
}
