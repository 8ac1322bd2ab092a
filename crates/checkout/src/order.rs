use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_cart::{CartItem, SHIPPING_FEE};
use storefront_core::{Money, OrderId};

use crate::delivery::DeliveryInfo;

/// Reported tax rate: 10% of the order total, in basis points.
pub const TAX_RATE_BPS: u32 = 1_000;

/// Immutable record of a completed checkout.
///
/// `items` is a snapshot of the cart at placement; later cart changes never reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<CartItem>,
    pub delivery: DeliveryInfo,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Snapshot `items` into a new order. Totals are derived from the lines.
    pub fn place(
        id: OrderId,
        items: Vec<CartItem>,
        delivery: DeliveryInfo,
        placed_at: DateTime<Utc>,
    ) -> Self {
        let subtotal: Money = items.iter().map(CartItem::line_total).sum();
        let shipping = if items.is_empty() {
            Money::ZERO
        } else {
            SHIPPING_FEE
        };

        Self {
            id,
            items,
            delivery,
            subtotal,
            shipping,
            total: subtotal + shipping,
            placed_at,
        }
    }

    /// Tax reported to analytics. Informational only; not added to the total.
    pub fn tax(&self) -> Money {
        self.total.basis_points(TAX_RATE_BPS)
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Source of order ids.
pub trait OrderIdGenerator: Send + Sync {
    fn next_id(&self) -> OrderId;
}

/// `ORD-<unix millis>-<random hex>-<seq>`.
///
/// The millisecond timestamp orders ids in time, the random component separates
/// processes started in the same millisecond, and the per-generator sequence keeps
/// ids unique within one process even when the clock does not move.
#[derive(Debug, Default)]
pub struct TimeOrderedIdGenerator {
    sequence: AtomicU64,
}

impl TimeOrderedIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderIdGenerator for TimeOrderedIdGenerator {
    fn next_id(&self) -> OrderId {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let millis = Utc::now().timestamp_millis();
        // Low bits of a v7 UUID are random.
        let random = (Uuid::now_v7().as_u128() & 0xFFFF_FFFF) as u32;
        OrderId::new(format!("ORD-{millis}-{random:08X}-{seq}"))
    }
}

/// Deterministic ids (`ORD-0001`, `ORD-0002`, ...) for tests and scripted sessions.
#[derive(Debug)]
pub struct SequentialOrderIdGenerator {
    next: AtomicU64,
}

impl SequentialOrderIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialOrderIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderIdGenerator for SequentialOrderIdGenerator {
    fn next_id(&self) -> OrderId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        OrderId::new(format!("ORD-{n:04}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use storefront_catalog::{Category, Product};
    use storefront_core::ProductId;

    fn line(id: &str, cents: u64, quantity: u32) -> CartItem {
        CartItem {
            product: Product {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                price: Money::from_cents(cents),
                category: Category::Women,
                description: String::new(),
                image: String::new(),
                rating: 4.2,
                reviews: 7,
            },
            quantity,
        }
    }

    fn delivery() -> DeliveryInfo {
        DeliveryInfo {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            phone: Some("555-0100".into()),
            address: "1 Navy Way".into(),
            city: "Arlington".into(),
            zip: "22201".into(),
        }
    }

    #[test]
    fn place_derives_totals_and_tax() {
        let order = Order::place(
            OrderId::new("ORD-0001"),
            vec![line("m1", 8999, 3)],
            delivery(),
            Utc::now(),
        );

        assert_eq!(order.subtotal, Money::from_cents(26_997));
        assert_eq!(order.shipping, SHIPPING_FEE);
        assert_eq!(order.total, Money::from_cents(27_997));
        // 2799.7 cents rounds half up to 2800.
        assert_eq!(order.tax(), Money::from_cents(2_800));
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn sequential_ids_are_padded_and_increasing() {
        let ids = SequentialOrderIdGenerator::new();
        assert_eq!(ids.next_id().as_str(), "ORD-0001");
        assert_eq!(ids.next_id().as_str(), "ORD-0002");

        let later = SequentialOrderIdGenerator::starting_at(12_345);
        assert_eq!(later.next_id().as_str(), "ORD-12345");
    }

    #[test]
    fn time_ordered_ids_are_unique_within_a_process() {
        let ids = TimeOrderedIdGenerator::new();
        let generated: HashSet<String> = (0..500).map(|_| ids.next_id().into_inner()).collect();
        assert_eq!(generated.len(), 500);
        assert!(generated.iter().all(|id| id.starts_with("ORD-")));
    }

    #[test]
    fn order_round_trips_through_json() {
        let order = Order::place(
            OrderId::new("ORD-0007"),
            vec![line("w1", 12_000, 1), line("a1", 2_500, 2)],
            delivery(),
            Utc::now(),
        );
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }
}
