//! The catalog store: read-only products indexed by id.

use std::collections::HashMap;

use thiserror::Error;

use storefront_core::{DomainError, ProductId};

use crate::product::{CategoryFilter, Product};

const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog source is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid catalog entry: {0}")]
    Invalid(#[from] DomainError),

    #[error("duplicate product id '{0}' in catalog source")]
    DuplicateId(ProductId),
}

/// Static, read-only collection of products, keyed by id.
///
/// Order of the source is preserved for listings.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog, validating each record and id uniqueness.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (pos, product) in products.iter().enumerate() {
            product.validate()?;
            if index.insert(product.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }

        tracing::debug!(products = products.len(), "catalog loaded");
        Ok(Self { products, index })
    }

    /// Parse a JSON array of product records.
    pub fn from_json(source: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(source)?;
        Self::from_products(products)
    }

    /// The catalog shipped with this crate.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).and_then(|&pos| self.products.get(pos))
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.index.contains_key(id)
    }

    /// Products matching `filter`, in catalog order.
    pub fn filter(&self, filter: CategoryFilter) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| filter.matches(p.category))
            .collect()
    }

    /// First `limit` products, as shown on the home page.
    pub fn featured(&self, limit: usize) -> &[Product] {
        &self.products[..limit.min(self.products.len())]
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Category;
    use storefront_core::Money;

    fn product(id: &str, cents: u64, category: Category) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Money::from_cents(cents),
            category,
            description: String::new(),
            image: String::new(),
            rating: 4.0,
            reviews: 3,
        }
    }

    fn sample() -> Catalog {
        Catalog::from_products(vec![
            product("m1", 8999, Category::Men),
            product("w1", 12000, Category::Women),
            product("m2", 4500, Category::Men),
            product("a1", 2500, Category::Accessories),
        ])
        .unwrap()
    }

    #[test]
    fn lookup_by_id() {
        let catalog = sample();
        assert_eq!(catalog.get(&ProductId::new("w1")).unwrap().price, Money::from_cents(12000));
        assert!(catalog.get(&ProductId::new("nope")).is_none());
        assert!(catalog.contains(&ProductId::new("a1")));
    }

    #[test]
    fn filter_preserves_catalog_order() {
        let catalog = sample();
        let men: Vec<&str> = catalog
            .filter(CategoryFilter::Only(Category::Men))
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(men, vec!["m1", "m2"]);
        assert_eq!(catalog.filter(CategoryFilter::All).len(), 4);
        assert!(catalog.filter(CategoryFilter::Only(Category::Kids)).is_empty());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Catalog::from_products(vec![
            product("m1", 100, Category::Men),
            product("m1", 200, Category::Men),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id.as_str() == "m1"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(Catalog::from_json("{"), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn featured_is_bounded() {
        let catalog = sample();
        assert_eq!(catalog.featured(2).len(), 2);
        assert_eq!(catalog.featured(99).len(), 4);
    }

    #[test]
    fn bundled_catalog_loads_and_covers_every_category() {
        let catalog = Catalog::bundled().unwrap();
        assert!(!catalog.is_empty());
        for c in Category::ALL {
            assert!(!catalog.filter(CategoryFilter::Only(c)).is_empty(), "no products in {c}");
        }
        assert_eq!(
            catalog.get(&ProductId::new("m1")).unwrap().price,
            Money::from_cents(8999)
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn category() -> impl Strategy<Value = Category> {
            prop::sample::select(Category::ALL.to_vec())
        }

        proptest! {
            /// Property: filtering partitions the catalog by category.
            #[test]
            fn category_filters_partition_catalog(cats in prop::collection::vec(category(), 0..40)) {
                let products = cats
                    .iter()
                    .enumerate()
                    .map(|(i, c)| product(&format!("p{i}"), 100, *c))
                    .collect();
                let catalog = Catalog::from_products(products).unwrap();

                let total: usize = Category::ALL
                    .iter()
                    .map(|c| catalog.filter(CategoryFilter::Only(*c)).len())
                    .sum();
                prop_assert_eq!(total, catalog.len());
                prop_assert_eq!(catalog.filter(CategoryFilter::All).len(), catalog.len());
            }
        }
    }
}
