/// Store-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// ISO currency code reported on every ecommerce event.
    pub currency: String,
    /// Store name reported as item and purchase affiliation.
    pub affiliation: String,
    /// Prefix for every persisted key.
    pub storage_namespace: String,
    pub shipping_tier: String,
    pub payment_type: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            affiliation: "Storefront Online".to_string(),
            storage_namespace: "storefront".to_string(),
            shipping_tier: "Standard".to_string(),
            payment_type: "Credit Card".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Defaults overridden by `STOREFRONT_CURRENCY`, `STOREFRONT_AFFILIATION` and
    /// `STOREFRONT_STORAGE_NAMESPACE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |name: &str, default: String| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        Self {
            currency: var("STOREFRONT_CURRENCY", defaults.currency),
            affiliation: var("STOREFRONT_AFFILIATION", defaults.affiliation),
            storage_namespace: var("STOREFRONT_STORAGE_NAMESPACE", defaults.storage_namespace),
            shipping_tier: defaults.shipping_tier,
            payment_type: defaults.payment_type,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = affiliation.into();
        self
    }

    pub fn with_storage_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.storage_namespace = namespace.into();
        self
    }

    pub fn with_shipping_tier(mut self, tier: impl Into<String>) -> Self {
        self.shipping_tier = tier.into();
        self
    }

    pub fn with_payment_type(mut self, payment_type: impl Into<String>) -> Self {
        self.payment_type = payment_type.into();
        self
    }

    /// Namespaced storage key.
    pub fn key(&self, name: &str) -> String {
        format!("{}.{name}", self.storage_namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("STOREFRONT_CURRENCY", "EUR"),
            ("STOREFRONT_STORAGE_NAMESPACE", "  shop-eu "),
            ("STOREFRONT_AFFILIATION", ""),
        ]
        .into_iter()
        .collect();

        let config = StorefrontConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.storage_namespace, "shop-eu");
        // Blank values fall back to the default.
        assert_eq!(config.affiliation, "Storefront Online");
    }

    #[test]
    fn keys_are_namespaced() {
        let config = StorefrontConfig::default().with_storage_namespace("test");
        assert_eq!(config.key("cart"), "test.cart");
    }
}
