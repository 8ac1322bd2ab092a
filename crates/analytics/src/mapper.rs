//! Pure mapping from storefront facts to [`AnalyticsEvent`] payloads.

use storefront_cart::{CartItem, SHIPPING_FEE};
use storefront_catalog::{CategoryFilter, Product};
use storefront_checkout::Order;
use storefront_core::{Destination, Money, UserId};

use crate::event::{
    AnalyticsEvent, AnalyticsItem, Commerce, ItemList, PageView, PaymentCommerce,
    PurchaseCommerce, ShippingCommerce,
};

/// Stateless event mapper, parameterized by store-wide labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMapper {
    currency: String,
    affiliation: String,
}

impl EventMapper {
    pub fn new(currency: impl Into<String>, affiliation: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            affiliation: affiliation.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn affiliation(&self) -> &str {
        &self.affiliation
    }

    fn item(&self, product: &Product, index: usize, quantity: u32) -> AnalyticsItem {
        AnalyticsItem {
            item_id: product.id.clone(),
            item_name: product.name.clone(),
            affiliation: self.affiliation.clone(),
            index,
            item_category: product.category.to_string(),
            price: product.price,
            quantity,
        }
    }

    fn cart_items(&self, items: &[CartItem]) -> Vec<AnalyticsItem> {
        items
            .iter()
            .enumerate()
            .map(|(index, line)| self.item(&line.product, index, line.quantity))
            .collect()
    }

    fn item_list(&self, filter: CategoryFilter, items: Vec<AnalyticsItem>) -> ItemList {
        let name = filter.list_name();
        ItemList {
            item_list_id: list_id(&name),
            item_list_name: name,
            items,
        }
    }

    pub fn page_view(&self, destination: &Destination, title: impl Into<String>) -> AnalyticsEvent {
        AnalyticsEvent::PageView(PageView {
            page_path: destination.path(),
            page_title: title.into(),
        })
    }

    pub fn view_item_list(&self, filter: CategoryFilter, products: &[&Product]) -> AnalyticsEvent {
        let items = products
            .iter()
            .enumerate()
            .map(|(index, p)| self.item(p, index, 1))
            .collect();
        AnalyticsEvent::ViewItemList {
            ecommerce: self.item_list(filter, items),
        }
    }

    pub fn select_item(&self, filter: CategoryFilter, product: &Product, index: usize) -> AnalyticsEvent {
        AnalyticsEvent::SelectItem {
            ecommerce: self.item_list(filter, vec![self.item(product, index, 1)]),
        }
    }

    pub fn view_item(&self, product: &Product) -> AnalyticsEvent {
        AnalyticsEvent::ViewItem {
            ecommerce: Commerce {
                currency: self.currency.clone(),
                value: product.price,
                items: vec![self.item(product, 0, 1)],
            },
        }
    }

    /// `quantity` is the delta added, not the resulting line quantity.
    pub fn add_to_cart(&self, product: &Product, quantity: u32) -> AnalyticsEvent {
        AnalyticsEvent::AddToCart {
            ecommerce: Commerce {
                currency: self.currency.clone(),
                value: product.price.times(quantity),
                items: vec![self.item(product, 0, quantity)],
            },
        }
    }

    /// Value is the merchandise subtotal (no shipping).
    pub fn view_cart(&self, items: &[CartItem]) -> AnalyticsEvent {
        AnalyticsEvent::ViewCart {
            ecommerce: Commerce {
                currency: self.currency.clone(),
                value: items.iter().map(CartItem::line_total).sum(),
                items: self.cart_items(items),
            },
        }
    }

    pub fn begin_checkout(&self, items: &[CartItem], total: Money) -> AnalyticsEvent {
        AnalyticsEvent::BeginCheckout {
            ecommerce: Commerce {
                currency: self.currency.clone(),
                value: total,
                items: self.cart_items(items),
            },
        }
    }

    pub fn add_shipping_info(
        &self,
        items: &[CartItem],
        total: Money,
        shipping_tier: &str,
    ) -> AnalyticsEvent {
        AnalyticsEvent::AddShippingInfo {
            ecommerce: ShippingCommerce {
                currency: self.currency.clone(),
                value: total,
                shipping_tier: shipping_tier.to_string(),
                items: self.cart_items(items),
            },
        }
    }

    pub fn add_payment_info(&self, order: &Order, payment_type: &str) -> AnalyticsEvent {
        AnalyticsEvent::AddPaymentInfo {
            ecommerce: PaymentCommerce {
                currency: self.currency.clone(),
                value: order.total,
                payment_type: payment_type.to_string(),
                items: self.cart_items(&order.items),
            },
        }
    }

    /// Tax is 10% of the order total; shipping is the flat fee.
    pub fn purchase(&self, order: &Order) -> AnalyticsEvent {
        AnalyticsEvent::Purchase {
            ecommerce: PurchaseCommerce {
                transaction_id: order.id.clone(),
                affiliation: self.affiliation.clone(),
                currency: self.currency.clone(),
                value: order.total,
                tax: order.tax(),
                shipping: SHIPPING_FEE,
                items: self.cart_items(&order.items),
            },
        }
    }

    pub fn view_order_confirmation(&self, order: &Order) -> AnalyticsEvent {
        AnalyticsEvent::ViewOrderConfirmation {
            order_id: order.id.clone(),
        }
    }

    pub fn login(&self, user_id: &UserId) -> AnalyticsEvent {
        AnalyticsEvent::Login {
            user_id: user_id.clone(),
            method: "email".to_string(),
        }
    }

    pub fn logout(&self, user_id: &UserId) -> AnalyticsEvent {
        AnalyticsEvent::Logout {
            user_id: user_id.clone(),
        }
    }

    pub fn form_interaction(&self, form_id: &str, field: &str) -> AnalyticsEvent {
        AnalyticsEvent::FormInteraction {
            form_id: form_id.to_string(),
            form_field: field.to_string(),
            action: "input".to_string(),
        }
    }

    pub fn newsletter_signup(&self, location: &str) -> AnalyticsEvent {
        AnalyticsEvent::NewsletterSignup {
            location: location.to_string(),
        }
    }
}

/// "Men Collection" -> "men_collection"
fn list_id(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storefront_catalog::Category;
    use storefront_checkout::DeliveryInfo;
    use storefront_core::{OrderId, ProductId};

    fn mapper() -> EventMapper {
        EventMapper::new("USD", "Storefront Online")
    }

    fn product(id: &str, cents: u64, category: Category) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Money::from_cents(cents),
            category,
            description: String::new(),
            image: String::new(),
            rating: 4.5,
            reviews: 20,
        }
    }

    fn line(id: &str, cents: u64, quantity: u32) -> CartItem {
        CartItem {
            product: product(id, cents, Category::Men),
            quantity,
        }
    }

    fn order() -> Order {
        Order::place(
            OrderId::new("ORD-0001"),
            vec![line("m1", 8999, 3)],
            DeliveryInfo {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.com".into(),
                phone: None,
                address: "12 St James's Square".into(),
                city: "London".into(),
                zip: "SW1Y 4JH".into(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn add_to_cart_carries_delta_quantity_and_value() {
        let p = product("m1", 8999, Category::Men);
        let event = mapper().add_to_cart(&p, 2);

        assert_eq!(event.value(), Some(Money::from_cents(17_998)));
        let item = &event.items()[0];
        assert_eq!(item.quantity, 2);
        assert_eq!(item.item_category, "Men");
        assert_eq!(item.affiliation, "Storefront Online");
    }

    #[test]
    fn purchase_reports_tax_and_shipping() {
        let event = mapper().purchase(&order());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "purchase");
        assert_eq!(json["ecommerce"]["transaction_id"], "ORD-0001");
        assert_eq!(json["ecommerce"]["value"], 279.97);
        assert_eq!(json["ecommerce"]["tax"], 28.0);
        assert_eq!(json["ecommerce"]["shipping"], 10.0);
        assert_eq!(json["ecommerce"]["items"][0]["quantity"], 3);
    }

    #[test]
    fn view_cart_value_excludes_shipping() {
        let items = vec![line("m1", 8999, 1), line("m2", 4500, 2)];
        let event = mapper().view_cart(&items);
        assert_eq!(event.value(), Some(Money::from_cents(17_999)));
        let indexes: Vec<usize> = event.items().iter().map(|i| i.index).collect();
        assert_eq!(indexes, vec![0, 1]);
    }

    #[test]
    fn item_list_ids_derive_from_the_filter() {
        let a = product("a1", 2500, Category::Accessories);
        let event = mapper().view_item_list(CategoryFilter::Only(Category::Accessories), &[&a]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["ecommerce"]["item_list_id"], "accessories_collection");
        assert_eq!(json["ecommerce"]["item_list_name"], "Accessories Collection");

        let all = mapper().select_item(CategoryFilter::All, &a, 4);
        let json = serde_json::to_value(&all).unwrap();
        assert_eq!(json["ecommerce"]["item_list_id"], "all_products");
        assert_eq!(json["ecommerce"]["items"][0]["index"], 4);
    }

    #[test]
    fn login_uses_email_method() {
        let json = serde_json::to_value(mapper().login(&UserId::new("u-42"))).unwrap();
        assert_eq!(json["user_id"], "u-42");
        assert_eq!(json["method"], "email");
    }

    #[test]
    fn page_view_uses_destination_path() {
        let event = mapper().page_view(&Destination::CheckoutPayment, "Payment");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["page_path"], "/checkout/payment");
    }
}
