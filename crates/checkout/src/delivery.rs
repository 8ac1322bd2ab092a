use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult};

/// Delivery details collected by the first checkout phase.
///
/// Stored exactly as submitted; only presence of the required fields is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address: String,
    pub city: String,
    pub zip: String,
}

impl DeliveryInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// All required fields must be non-empty. Email format is a UI concern.
    pub fn validate(&self) -> DomainResult<()> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("address", &self.address),
            ("city", &self.city),
            ("zip", &self.zip),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "delivery form is missing: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> DeliveryInfo {
        DeliveryInfo {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: None,
            address: "12 St James's Square".into(),
            city: "London".into(),
            zip: "SW1Y 4JH".into(),
        }
    }

    #[test]
    fn complete_form_is_valid_without_phone() {
        assert!(info().validate().is_ok());
        assert_eq!(info().full_name(), "Ada Lovelace");
    }

    #[test]
    fn empty_required_fields_are_listed() {
        let form = DeliveryInfo {
            email: String::new(),
            zip: String::new(),
            city: "  ".into(),
            ..info()
        };
        match form.validate() {
            Err(DomainError::Validation(msg)) => {
                assert!(msg.contains("email"));
                assert!(msg.contains("zip"));
                assert!(!msg.contains("city"));
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn email_format_is_not_enforced() {
        let form = DeliveryInfo {
            email: "not-an-email".into(),
            ..info()
        };
        assert!(form.validate().is_ok());
    }
}
