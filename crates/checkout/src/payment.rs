//! Payment capture.
//!
//! There is no payment network behind this storefront: card details are captured,
//! checked for presence, and handed to a [`PaymentAuthorizer`]. The default
//! authorizer approves everything; a real gateway can be substituted without
//! touching the checkout flow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::{DomainError, DomainResult, Money};

/// Card details from the payment form. Never persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub card_name: String,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

impl PaymentDetails {
    pub fn validate(&self) -> DomainResult<()> {
        let required = [
            ("card_name", &self.card_name),
            ("card_number", &self.card_number),
            ("expiry", &self.expiry),
            ("cvv", &self.cvv),
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
                "payment form is missing: {}",
                missing.join(", ")
            )))
        }
    }

    /// Last four digits of the card number, ignoring spaces and dashes.
    pub fn last4(&self) -> String {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }
}

impl core::fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("card_name", &self.card_name)
            .field("card_number", &format_args!("****{}", self.last4()))
            .field("expiry", &self.expiry)
            .field("cvv", &"***")
            .finish()
    }
}

/// Proof that a payment was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAuthorization {
    pub reference: String,
    pub amount: Money,
    pub card_last4: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("payment authorizer unavailable: {0}")]
    Unavailable(String),
}

/// Authorizes a payment for an amount.
pub trait PaymentAuthorizer: Send + Sync {
    fn authorize(
        &self,
        payment: &PaymentDetails,
        amount: Money,
    ) -> Result<PaymentAuthorization, PaymentError>;
}

/// Accepts any (already validated) card details.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedPaymentAuthorizer;

impl PaymentAuthorizer for SimulatedPaymentAuthorizer {
    fn authorize(
        &self,
        payment: &PaymentDetails,
        amount: Money,
    ) -> Result<PaymentAuthorization, PaymentError> {
        let card_last4 = payment.last4();
        Ok(PaymentAuthorization {
            reference: format!("SIM-{card_last4}-{}", amount.cents()),
            amount,
            card_last4,
        })
    }
}
