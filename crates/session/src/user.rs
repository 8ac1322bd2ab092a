use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, UserId};

/// Signed-in shopper. Not authenticated; the id comes from whoever performed the login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::invalid_id("user id cannot be empty"));
        }
        if self.email.trim().is_empty() {
            return Err(DomainError::validation("user email cannot be empty"));
        }
        Ok(())
    }
}
