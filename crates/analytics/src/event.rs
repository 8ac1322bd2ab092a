use serde::Serialize;

use storefront_core::{Money, OrderId, ProductId, UserId};
use storefront_events::Event;

/// One line of an ecommerce item list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsItem {
    pub item_id: ProductId,
    pub item_name: String,
    pub affiliation: String,
    pub index: usize,
    pub item_category: String,
    pub price: Money,
    pub quantity: u32,
}

/// `view_item_list` / `select_item` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemList {
    pub item_list_id: String,
    pub item_list_name: String,
    pub items: Vec<AnalyticsItem>,
}

/// Body shared by the value-carrying commerce events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Commerce {
    pub currency: String,
    pub value: Money,
    pub items: Vec<AnalyticsItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingCommerce {
    pub currency: String,
    pub value: Money,
    pub shipping_tier: String,
    pub items: Vec<AnalyticsItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentCommerce {
    pub currency: String,
    pub value: Money,
    pub payment_type: String,
    pub items: Vec<AnalyticsItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseCommerce {
    pub transaction_id: OrderId,
    pub affiliation: String,
    pub currency: String,
    pub value: Money,
    pub tax: Money,
    pub shipping: Money,
    pub items: Vec<AnalyticsItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub page_path: String,
    pub page_title: String,
}

/// Everything the storefront can push to the data layer.
///
/// Serializes flat, with the event name under `"event"`:
/// `{"event":"add_to_cart","ecommerce":{"currency":"USD","value":179.98,...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    PageView(PageView),
    ViewItemList { ecommerce: ItemList },
    SelectItem { ecommerce: ItemList },
    ViewItem { ecommerce: Commerce },
    AddToCart { ecommerce: Commerce },
    ViewCart { ecommerce: Commerce },
    BeginCheckout { ecommerce: Commerce },
    AddShippingInfo { ecommerce: ShippingCommerce },
    AddPaymentInfo { ecommerce: PaymentCommerce },
    Purchase { ecommerce: PurchaseCommerce },
    ViewOrderConfirmation { order_id: OrderId },
    Login { user_id: UserId, method: String },
    Logout { user_id: UserId },
    FormInteraction { form_id: String, form_field: String, action: String },
    NewsletterSignup { location: String },
}

impl AnalyticsEvent {
    /// The data-layer event name.
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::PageView(_) => "page_view",
            AnalyticsEvent::ViewItemList { .. } => "view_item_list",
            AnalyticsEvent::SelectItem { .. } => "select_item",
            AnalyticsEvent::ViewItem { .. } => "view_item",
            AnalyticsEvent::AddToCart { .. } => "add_to_cart",
            AnalyticsEvent::ViewCart { .. } => "view_cart",
            AnalyticsEvent::BeginCheckout { .. } => "begin_checkout",
            AnalyticsEvent::AddShippingInfo { .. } => "add_shipping_info",
            AnalyticsEvent::AddPaymentInfo { .. } => "add_payment_info",
            AnalyticsEvent::Purchase { .. } => "purchase",
            AnalyticsEvent::ViewOrderConfirmation { .. } => "view_order_confirmation",
            AnalyticsEvent::Login { .. } => "login",
            AnalyticsEvent::Logout { .. } => "logout",
            AnalyticsEvent::FormInteraction { .. } => "form_interaction",
            AnalyticsEvent::NewsletterSignup { .. } => "newsletter_signup",
        }
    }

    /// Items carried by the event, if it is an ecommerce event.
    pub fn items(&self) -> &[AnalyticsItem] {
        match self {
            AnalyticsEvent::ViewItemList { ecommerce } | AnalyticsEvent::SelectItem { ecommerce } => {
                &ecommerce.items
            }
            AnalyticsEvent::ViewItem { ecommerce }
            | AnalyticsEvent::AddToCart { ecommerce }
            | AnalyticsEvent::ViewCart { ecommerce }
            | AnalyticsEvent::BeginCheckout { ecommerce } => &ecommerce.items,
            AnalyticsEvent::AddShippingInfo { ecommerce } => &ecommerce.items,
            AnalyticsEvent::AddPaymentInfo { ecommerce } => &ecommerce.items,
            AnalyticsEvent::Purchase { ecommerce } => &ecommerce.items,
            _ => &[],
        }
    }

    /// Monetary value, if the event carries one.
    pub fn value(&self) -> Option<Money> {
        match self {
            AnalyticsEvent::ViewItem { ecommerce }
            | AnalyticsEvent::AddToCart { ecommerce }
            | AnalyticsEvent::ViewCart { ecommerce }
            | AnalyticsEvent::BeginCheckout { ecommerce } => Some(ecommerce.value),
            AnalyticsEvent::AddShippingInfo { ecommerce } => Some(ecommerce.value),
            AnalyticsEvent::AddPaymentInfo { ecommerce } => Some(ecommerce.value),
            AnalyticsEvent::Purchase { ecommerce } => Some(ecommerce.value),
            _ => None,
        }
    }
}

impl Event for AnalyticsEvent {
    fn event_type(&self) -> &'static str {
        self.name()
    }

    fn version(&self) -> u32 {
        1
    }
}
