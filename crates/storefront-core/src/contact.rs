//! Contact Details
//!
//! Buyer contact fields collected before checkout, with the validation and
//! phone normalization the payment gateway prefill requires.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Default dialing code prepended to local phone numbers
const DEFAULT_COUNTRY_CODE: &str = "91";

/// Contact fields entered on the checkout form
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    /// 10-digit local phone number (separators tolerated)
    pub phone: String,
}

/// Contact normalized for the gateway prefill
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayContact {
    pub name: String,
    pub email: String,
    /// `+<countrycode><number>` form, e.g. `+919876543210`
    pub contact: String,
}

impl ContactDetails {
    /// Validate all fields, reporting the first violation
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::MissingName);
        }
        if !is_plausible_email(self.email.trim()) {
            return Err(CoreError::InvalidEmail(self.email.clone()));
        }
        if self.local_digits().len() != 10 {
            return Err(CoreError::InvalidPhone(self.phone.clone()));
        }
        Ok(())
    }

    /// Normalize into the gateway prefill shape
    ///
    /// Fails with the same errors as [`validate`](Self::validate).
    pub fn gateway_contact(&self) -> Result<GatewayContact> {
        self.validate()?;
        Ok(GatewayContact {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            contact: format!("+{}{}", DEFAULT_COUNTRY_CODE, self.local_digits()),
        })
    }

    /// Digits of the phone field with separators stripped
    fn local_digits(&self) -> String {
        self.phone
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect()
    }
}

/// Lightweight email plausibility check: something@domain.tld
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, email: &str, phone: &str) -> ContactDetails {
        ContactDetails {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    #[test]
    fn test_valid_contact() {
        assert!(contact("Asha", "asha@example.com", "9876543210").validate().is_ok());
    }

    #[test]
    fn test_separators_tolerated() {
        let c = contact("Asha", "asha@example.com", "98765-43210");
        assert_eq!(
            c.gateway_contact().unwrap().contact,
            "+919876543210"
        );
    }

    #[test]
    fn test_missing_name_rejected() {
        assert_eq!(
            contact("  ", "asha@example.com", "9876543210").validate(),
            Err(CoreError::MissingName)
        );
    }

    #[test]
    fn test_bad_email_rejected() {
        for email in ["asha", "asha@", "@example.com", "asha@nodot", "a b@example.com"] {
            assert!(contact("Asha", email, "9876543210").validate().is_err(), "{email}");
        }
    }

    #[test]
    fn test_wrong_length_phone_rejected() {
        assert!(contact("Asha", "asha@example.com", "12345").validate().is_err());
        assert!(contact("Asha", "asha@example.com", "98765432100").validate().is_err());
    }
}
