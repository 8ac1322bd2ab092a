//! Navigation intents handed to the external router.
//!
//! The core never routes by itself; each operation reports where the UI should go
//! next and whether that is a normal step forward or a guard-driven redirect.

use serde::{Deserialize, Serialize};

use crate::id::ProductId;

/// Named destination the external router can activate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", content = "param", rename_all = "snake_case")]
pub enum Destination {
    Home,
    Shop,
    /// Shop listing filtered to one category (the category's display name).
    Category(String),
    Product(ProductId),
    Cart,
    CheckoutDelivery,
    CheckoutPayment,
    CheckoutConfirmation,
    Account,
}

impl Destination {
    /// Route path for this destination.
    pub fn path(&self) -> String {
        match self {
            Destination::Home => "/".to_string(),
            Destination::Shop => "/shop".to_string(),
            Destination::Category(name) => format!("/category/{name}"),
            Destination::Product(id) => format!("/product/{id}"),
            Destination::Cart => "/cart".to_string(),
            Destination::CheckoutDelivery => "/checkout/delivery".to_string(),
            Destination::CheckoutPayment => "/checkout/payment".to_string(),
            Destination::CheckoutConfirmation => "/checkout/confirmation".to_string(),
            Destination::Account => "/account".to_string(),
        }
    }
}

impl core::fmt::Display for Destination {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of a user action, from the router's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "to", rename_all = "snake_case")]
pub enum Navigation {
    /// Remain on the current view (re-render only).
    Stay,
    /// Normal forward step to the given view.
    Navigate(Destination),
    /// A guard failed; send the user to the precursor view instead.
    Redirect(Destination),
}

impl Navigation {
    pub fn destination(&self) -> Option<&Destination> {
        match self {
            Navigation::Stay => None,
            Navigation::Navigate(d) | Navigation::Redirect(d) => Some(d),
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Navigation::Redirect(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_router_table() {
        assert_eq!(Destination::Home.path(), "/");
        assert_eq!(Destination::Category("Men".into()).path(), "/category/Men");
        assert_eq!(Destination::Product(ProductId::new("m1")).path(), "/product/m1");
        assert_eq!(Destination::CheckoutPayment.path(), "/checkout/payment");
    }

    #[test]
    fn redirect_reports_destination() {
        let nav = Navigation::Redirect(Destination::Cart);
        assert!(nav.is_redirect());
        assert_eq!(nav.destination(), Some(&Destination::Cart));
        assert_eq!(Navigation::Stay.destination(), None);
    }
}
