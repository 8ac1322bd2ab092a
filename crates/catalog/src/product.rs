use core::str::FromStr;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, Money, ProductId};

/// Highest rating a product may carry.
pub const MAX_RATING: f32 = 5.0;

/// Fixed set of catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Men,
    Women,
    Kids,
    Accessories,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Men,
        Category::Women,
        Category::Kids,
        Category::Accessories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Men => "Men",
            Category::Women => "Women",
            Category::Kids => "Kids",
            Category::Accessories => "Accessories",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("unknown category '{s}'")))
    }
}

/// Category filter used by the shop listing ("All" tab or a single category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }

    /// Human-readable list name, used for analytics list ids.
    pub fn list_name(&self) -> String {
        match self {
            CategoryFilter::All => "All Products".to_string(),
            CategoryFilter::Only(c) => format!("{c} Collection"),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub category: Category,
    pub description: String,
    pub image: String,
    pub rating: f32,
    pub reviews: u32,
}

impl Product {
    /// Check the per-record rules of the catalog source.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::invalid_id("product id cannot be empty"));
        }

        if self.name.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "product {}: name cannot be empty",
                self.id
            )));
        }

        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(DomainError::validation(format!(
                "product {}: rating {} outside 0-{MAX_RATING}",
                self.id, self.rating
            )));
        }

        Ok(())
    }
}
