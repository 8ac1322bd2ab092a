use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use storefront_catalog::Product;
use storefront_core::{Aggregate, DomainError, DomainResult, Money, ProductId};
use storefront_events::Event;

/// Flat shipping surcharge applied to every non-empty cart.
pub const SHIPPING_FEE: Money = Money::from_cents(1000);

/// Cart line: a product snapshot plus a positive quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// price × quantity
    pub fn line_total(&self) -> Money {
        self.product.price.times(self.quantity)
    }
}

/// Aggregate: the session's cart.
///
/// # Invariants
/// - At most one line per product id.
/// - Every line's quantity is ≥ 1.
/// - Lines keep insertion order (first added stays first).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    version: u64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from a persisted snapshot, rejecting snapshots that break the
    /// cart invariants.
    pub fn restore(items: Vec<CartItem>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(DomainError::invariant(format!(
                    "cart line {} has zero quantity",
                    item.id()
                )));
            }
            if !seen.insert(item.id()) {
                return Err(DomainError::invariant(format!(
                    "cart contains product {} more than once",
                    item.id()
                )));
            }
        }

        Ok(Self { items, version: 0 })
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Owned copy of the lines, for order snapshots and persistence.
    pub fn snapshot(&self) -> Vec<CartItem> {
        self.items.clone()
    }

    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines (the navigation badge).
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Subtotal plus [`SHIPPING_FEE`]; zero for an empty cart.
    pub fn total(&self) -> Money {
        if self.is_empty() {
            Money::ZERO
        } else {
            self.subtotal() + SHIPPING_FEE
        }
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq)]
pub struct AddItem {
    pub product: Product,
    pub quantity: u32,
}

/// Command: UpdateQuantity (relative change).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateQuantity {
    pub product_id: ProductId,
    pub delta: i64,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveItem {
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand {
    AddItem(AddItem),
    UpdateQuantity(UpdateQuantity),
    RemoveItem(RemoveItem),
    Clear,
}

/// Event: ItemAdded. `quantity` is the delta that was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub product: Product,
    pub quantity: u32,
}

/// Event: QuantityChanged. `quantity` is the new absolute quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityChanged {
    pub product_id: ProductId,
    pub previous: u32,
    pub quantity: u32,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CartEvent {
    ItemAdded(ItemAdded),
    QuantityChanged(QuantityChanged),
    ItemRemoved(ItemRemoved),
    CartCleared,
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "cart.item_added",
            CartEvent::QuantityChanged(_) => "cart.quantity_changed",
            CartEvent::ItemRemoved(_) => "cart.item_removed",
            CartEvent::CartCleared => "cart.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = DomainError;

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::ItemAdded(e) => match self.position(&e.product.id) {
                Some(pos) => {
                    if let Some(item) = self.items.get_mut(pos) {
                        item.quantity = item.quantity.saturating_add(e.quantity);
                    }
                }
                None => self.items.push(CartItem {
                    product: e.product.clone(),
                    quantity: e.quantity,
                }),
            },
            CartEvent::QuantityChanged(e) => {
                if let Some(item) = self.items.iter_mut().find(|i| i.id() == &e.product_id) {
                    item.quantity = e.quantity.max(1);
                }
            }
            CartEvent::ItemRemoved(e) => {
                self.items.retain(|item| item.id() != &e.product_id);
            }
            CartEvent::CartCleared => {
                self.items.clear();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem(cmd) => self.handle_add(cmd),
            CartCommand::UpdateQuantity(cmd) => Ok(self.handle_update(cmd)),
            CartCommand::RemoveItem(cmd) => Ok(self.handle_remove(cmd)),
            CartCommand::Clear => Ok(self.handle_clear()),
        }
    }
}

impl Cart {
    fn handle_add(&self, cmd: &AddItem) -> Result<Vec<CartEvent>, DomainError> {
        if cmd.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }

        Ok(vec![CartEvent::ItemAdded(ItemAdded {
            product: cmd.product.clone(),
            quantity: cmd.quantity,
        })])
    }

    fn handle_update(&self, cmd: &UpdateQuantity) -> Vec<CartEvent> {
        // Unknown ids are a silent no-op.
        let Some(item) = self.get(&cmd.product_id) else {
            return vec![];
        };

        let wanted = i64::from(item.quantity).saturating_add(cmd.delta);
        let quantity = wanted.clamp(1, i64::from(u32::MAX)) as u32;
        if quantity == item.quantity {
            return vec![];
        }

        vec![CartEvent::QuantityChanged(QuantityChanged {
            product_id: cmd.product_id.clone(),
            previous: item.quantity,
            quantity,
        })]
    }

    fn handle_remove(&self, cmd: &RemoveItem) -> Vec<CartEvent> {
        match self.get(&cmd.product_id) {
            Some(item) => vec![CartEvent::ItemRemoved(ItemRemoved {
                product_id: cmd.product_id.clone(),
                quantity: item.quantity,
            })],
            None => vec![],
        }
    }

    fn handle_clear(&self) -> Vec<CartEvent> {
        if self.is_empty() {
            vec![]
        } else {
            vec![CartEvent::CartCleared]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_catalog::Category;

    fn product(id: &str, cents: u64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Money::from_cents(cents),
            category: Category::Men,
            description: String::new(),
            image: String::new(),
            rating: 4.0,
            reviews: 10,
        }
    }

    fn add(cart: &mut Cart, p: &Product, quantity: u32) -> Vec<CartEvent> {
        cart.execute(&CartCommand::AddItem(AddItem {
            product: p.clone(),
            quantity,
        }))
        .unwrap()
    }

    fn update(cart: &mut Cart, id: &str, delta: i64) -> Vec<CartEvent> {
        cart.execute(&CartCommand::UpdateQuantity(UpdateQuantity {
            product_id: ProductId::new(id),
            delta,
        }))
        .unwrap()
    }

    fn remove(cart: &mut Cart, id: &str) -> Vec<CartEvent> {
        cart.execute(&CartCommand::RemoveItem(RemoveItem {
            product_id: ProductId::new(id),
        }))
        .unwrap()
    }

    #[test]
    fn add_new_product_appends_line() {
        let mut cart = Cart::new();
        let events = add(&mut cart, &product("m1", 8999), 1);

        assert_eq!(events.len(), 1);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn add_existing_product_merges_quantity_in_place() {
        let mut cart = Cart::new();
        let m1 = product("m1", 8999);
        add(&mut cart, &m1, 1);
        add(&mut cart, &product("w1", 12000), 1);

        let events = add(&mut cart, &m1, 2);
        match &events[0] {
            CartEvent::ItemAdded(e) => assert_eq!(e.quantity, 2),
            _ => panic!("Expected ItemAdded event"),
        }

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, vec!["m1", "w1"]);
        assert_eq!(cart.get(&ProductId::new("m1")).unwrap().quantity, 3);
    }

    #[test]
    fn add_rejects_zero_quantity() {
        let cart = Cart::new();
        let err = cart
            .handle(&CartCommand::AddItem(AddItem {
                product: product("m1", 100),
                quantity: 0,
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn scenario_a_totals() {
        let mut cart = Cart::new();
        let m1 = product("m1", 8999);
        add(&mut cart, &m1, 1);
        add(&mut cart, &m1, 2);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.subtotal(), Money::from_cents(26_997));
        assert_eq!(cart.total(), Money::from_cents(27_997));
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let cart = Cart::new();
        assert_eq!(cart.subtotal(), Money::ZERO);
        assert_eq!(cart.total(), Money::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn update_clamps_at_one() {
        let mut cart = Cart::new();
        add(&mut cart, &product("m1", 100), 3);

        let events = update(&mut cart, "m1", -10);
        assert_eq!(
            events,
            vec![CartEvent::QuantityChanged(QuantityChanged {
                product_id: ProductId::new("m1"),
                previous: 3,
                quantity: 1,
            })]
        );
        assert_eq!(cart.items()[0].quantity, 1);

        // Already at the floor: nothing to do.
        assert!(update(&mut cart, "m1", -1).is_empty());
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut cart = Cart::new();
        add(&mut cart, &product("m1", 100), 1);
        let before = cart.clone();

        assert!(update(&mut cart, "ghost", 5).is_empty());
        assert_eq!(cart, before);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut cart = Cart::new();
        add(&mut cart, &product("m1", 100), 1);
        add(&mut cart, &product("a1", 200), 1);

        assert_eq!(remove(&mut cart, "m1").len(), 1);
        let after_once = cart.items().to_vec();
        assert!(remove(&mut cart, "m1").is_empty());
        assert_eq!(cart.items(), after_once.as_slice());
    }

    #[test]
    fn clear_empties_cart_and_is_noop_when_empty() {
        let mut cart = Cart::new();
        add(&mut cart, &product("m1", 100), 2);

        assert_eq!(cart.execute(&CartCommand::Clear).unwrap(), vec![CartEvent::CartCleared]);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::ZERO);
        assert!(cart.execute(&CartCommand::Clear).unwrap().is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_live_cart() {
        let mut cart = Cart::new();
        add(&mut cart, &product("m1", 100), 1);
        let snapshot = cart.snapshot();

        add(&mut cart, &product("m1", 100), 4);
        assert_eq!(snapshot[0].quantity, 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn restore_rejects_broken_snapshots() {
        let line = CartItem {
            product: product("m1", 100),
            quantity: 1,
        };
        assert!(Cart::restore(vec![line.clone()]).is_ok());

        let dup = Cart::restore(vec![line.clone(), line.clone()]).unwrap_err();
        assert!(matches!(dup, DomainError::InvariantViolation(_)));

        let zero = CartItem { quantity: 0, ..line };
        assert!(Cart::restore(vec![zero]).is_err());
    }

    #[test]
    fn cart_item_persists_as_flat_record() {
        let line = CartItem {
            product: product("m1", 8999),
            quantity: 2,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], "m1");
        assert_eq!(json["price"], 89.99);
        assert_eq!(json["quantity"], 2);

        let back: CartItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, line);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut cart = Cart::new();
        add(&mut cart, &product("m1", 100), 1);
        let before = cart.clone();

        let cmd = CartCommand::UpdateQuantity(UpdateQuantity {
            product_id: ProductId::new("m1"),
            delta: 4,
        });
        let events1 = cart.handle(&cmd).unwrap();
        let events2 = cart.handle(&cmd).unwrap();

        assert_eq!(cart, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn version_increments_on_apply() {
        let mut cart = Cart::new();
        assert_eq!(cart.version(), 0);
        add(&mut cart, &product("m1", 100), 1);
        assert_eq!(cart.version(), 1);
        update(&mut cart, "m1", 1);
        assert_eq!(cart.version(), 2);
        // No-op commands leave the version alone.
        remove(&mut cart, "ghost");
        assert_eq!(cart.version(), 2);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        const IDS: [&str; 4] = ["m1", "w1", "k1", "a1"];

        fn catalog_product(idx: usize) -> Product {
            product(IDS[idx], 1000 + idx as u64 * 250)
        }

        #[derive(Debug, Clone)]
        enum Op {
            Add(usize, u32),
            Update(usize, i64),
            Remove(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0..IDS.len(), 1u32..10).prop_map(|(i, q)| Op::Add(i, q)),
                (0..IDS.len(), -50i64..50).prop_map(|(i, d)| Op::Update(i, d)),
                (0..IDS.len()).prop_map(Op::Remove),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: adds never duplicate a line, and each line holds the sum of its adds.
            #[test]
            fn adds_accumulate_per_id(adds in prop::collection::vec((0..IDS.len(), 1u32..20), 0..60)) {
                let mut cart = Cart::new();
                let mut expected = [0u32; 4];
                for (idx, qty) in &adds {
                    add(&mut cart, &catalog_product(*idx), *qty);
                    expected[*idx] += qty;
                }

                let ids: HashSet<&ProductId> = cart.items().iter().map(CartItem::id).collect();
                prop_assert_eq!(ids.len(), cart.items().len());

                for (idx, want) in expected.iter().enumerate() {
                    let got = cart.get(&ProductId::new(IDS[idx])).map(|i| i.quantity).unwrap_or(0);
                    prop_assert_eq!(got, *want);
                }
            }

            /// Property: total is subtotal + shipping when non-empty, else zero.
            #[test]
            fn total_matches_subtotal_plus_shipping(ops in prop::collection::vec(op(), 0..40)) {
                let mut cart = Cart::new();
                for op in &ops {
                    match op {
                        Op::Add(i, q) => { add(&mut cart, &catalog_product(*i), *q); }
                        Op::Update(i, d) => { update(&mut cart, IDS[*i], *d); }
                        Op::Remove(i) => { remove(&mut cart, IDS[*i]); }
                    }
                }

                if cart.is_empty() {
                    prop_assert_eq!(cart.total(), Money::ZERO);
                } else {
                    prop_assert_eq!(cart.total(), cart.subtotal() + SHIPPING_FEE);
                }
            }

            /// Property: quantities never drop below one, whatever the delta.
            #[test]
            fn update_never_goes_below_one(start in 1u32..100, delta in i64::MIN..i64::MAX) {
                let mut cart = Cart::new();
                add(&mut cart, &catalog_product(0), start);
                update(&mut cart, IDS[0], delta);
                prop_assert!(cart.items()[0].quantity >= 1);
            }

            /// Property: removing twice is the same as removing once.
            #[test]
            fn remove_twice_equals_once(ops in prop::collection::vec(op(), 0..30), target in 0..IDS.len()) {
                let mut cart = Cart::new();
                for op in &ops {
                    if let Op::Add(i, q) = op {
                        add(&mut cart, &catalog_product(*i), *q);
                    }
                }

                let mut once = cart.clone();
                remove(&mut once, IDS[target]);
                let mut twice = once.clone();
                remove(&mut twice, IDS[target]);

                prop_assert_eq!(once.items(), twice.items());
            }
        }
    }
}
