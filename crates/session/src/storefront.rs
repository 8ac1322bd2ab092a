//! Session orchestration.
//!
//! Every user action follows the same pipeline:
//!
//! ```text
//! action
//!   ↓
//! 1. Decide (aggregate `handle`, pure)
//!   ↓
//! 2. Persist the resulting state (key/value store)
//!   ↓
//! 3. Apply to in-memory state
//!   ↓
//! 4. Record analytics (data layer)
//! ```
//!
//! A failed persist aborts the action before anything is applied or recorded, so the
//! data layer never describes a change that did not happen.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use storefront_analytics::{AnalyticsEvent, DataLayer, EventMapper};
use storefront_cart::{AddItem, Cart, CartCommand, CartEvent, RemoveItem, UpdateQuantity};
use storefront_catalog::{Catalog, CategoryFilter, Product};
use storefront_checkout::{
    BeginCheckout, CheckoutCommand, CheckoutEvent, CheckoutFlow, DeliveryInfo, EnterPayment,
    Order, OrderIdGenerator, PaymentAuthorizer, PaymentDetails, PlaceOrder,
    SimulatedPaymentAuthorizer, SubmitDelivery, TimeOrderedIdGenerator, navigation,
};
use storefront_core::{Aggregate, Destination, Navigation, OrderId, ProductId};
use storefront_events::Event;

use crate::config::StorefrontConfig;
use crate::error::SessionError;
use crate::storage::{KeyValueStore, Loaded, load, save};
use crate::user::User;

const CART_KEY: &str = "cart";
const USER_KEY: &str = "user";
const DELIVERY_KEY: &str = "checkout.delivery";
const LAST_ORDER_KEY: &str = "last_order";
const PURCHASE_TRACKED_KEY: &str = "purchase_tracked";

/// Result of entering the confirmation view.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub navigation: Navigation,
    pub order: Option<Order>,
}

/// One shopper's session.
///
/// - `P`: persistent store (cart, user, in-progress delivery info)
/// - `S`: session-scoped store (last completed order)
/// - `D`: analytics data layer
pub struct Storefront<P, S, D> {
    config: StorefrontConfig,
    catalog: Arc<Catalog>,
    persistent: P,
    session: S,
    data_layer: D,
    mapper: EventMapper,
    order_ids: Arc<dyn OrderIdGenerator>,
    payments: Arc<dyn PaymentAuthorizer>,
    cart: Cart,
    checkout: CheckoutFlow,
    user: Option<User>,
    listing: CategoryFilter,
}

impl<P, S, D> Storefront<P, S, D>
where
    P: KeyValueStore,
    S: KeyValueStore,
    D: DataLayer,
{
    /// Restore the session from `persistent`. Corrupt entries are discarded.
    pub fn load(
        config: StorefrontConfig,
        catalog: Arc<Catalog>,
        persistent: P,
        session: S,
        data_layer: D,
    ) -> Result<Self, SessionError> {
        let cart = restore_cart(&config, &persistent)?;
        let user = restore_user(&config, &persistent)?;
        let mapper = EventMapper::new(config.currency.clone(), config.affiliation.clone());

        info!(
            items = cart.item_count(),
            signed_in = user.is_some(),
            "storefront session loaded"
        );

        Ok(Self {
            config,
            catalog,
            persistent,
            session,
            data_layer,
            mapper,
            order_ids: Arc::new(TimeOrderedIdGenerator::new()),
            payments: Arc::new(SimulatedPaymentAuthorizer),
            cart,
            checkout: CheckoutFlow::new(),
            user,
            listing: CategoryFilter::All,
        })
    }

    pub fn with_order_ids(mut self, order_ids: Arc<dyn OrderIdGenerator>) -> Self {
        self.order_ids = order_ids;
        self
    }

    pub fn with_payment_authorizer(mut self, payments: Arc<dyn PaymentAuthorizer>) -> Self {
        self.payments = payments;
        self
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn checkout(&self) -> &CheckoutFlow {
        &self.checkout
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn data_layer(&self) -> &D {
        &self.data_layer
    }

    // --- browsing ---

    pub fn page_view(&self, destination: &Destination, title: &str) -> Result<(), SessionError> {
        self.emit(self.mapper.page_view(destination, title))
    }

    /// Show the shop listing for `filter`; later selections are attributed to it.
    pub fn show_listing(&mut self, filter: CategoryFilter) -> Result<Vec<Product>, SessionError> {
        let products = self.catalog.filter(filter);
        self.emit(self.mapper.view_item_list(filter, &products))?;
        let products = products.into_iter().cloned().collect();
        self.listing = filter;
        Ok(products)
    }

    /// A product picked from the current listing at position `index`.
    pub fn select_product(&self, id: &ProductId, index: usize) -> Result<Navigation, SessionError> {
        let Some(product) = self.catalog.get(id) else {
            debug!(product_id = %id, "selected product not in catalog");
            return Ok(Navigation::Redirect(Destination::Shop));
        };

        self.emit(self.mapper.select_item(self.listing, product, index))?;
        Ok(Navigation::Navigate(Destination::Product(id.clone())))
    }

    /// Enter the product detail view. Unknown ids go back to the shop.
    pub fn view_product(&self, id: &ProductId) -> Result<Navigation, SessionError> {
        let Some(product) = self.catalog.get(id) else {
            debug!(product_id = %id, "product detail for unknown id");
            return Ok(Navigation::Redirect(Destination::Shop));
        };

        self.emit(self.mapper.view_item(product))?;
        Ok(Navigation::Stay)
    }

    // --- cart ---

    /// Add `quantity` units of a catalog product. Unknown ids are ignored.
    pub fn add_to_cart(&mut self, id: &ProductId, quantity: u32) -> Result<(), SessionError> {
        let Some(product) = self.catalog.get(id).cloned() else {
            debug!(product_id = %id, "add to cart ignored: unknown product");
            return Ok(());
        };

        let events = self.commit_cart(CartCommand::AddItem(AddItem { product, quantity }))?;
        for event in &events {
            if let CartEvent::ItemAdded(added) = event {
                self.emit(self.mapper.add_to_cart(&added.product, added.quantity))?;
            }
        }

        info!(product_id = %id, quantity, items = self.cart.item_count(), "added to cart");
        Ok(())
    }

    /// Relative quantity change, clamped at 1. Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: &ProductId, delta: i64) -> Result<(), SessionError> {
        let events = self.commit_cart(CartCommand::UpdateQuantity(UpdateQuantity {
            product_id: id.clone(),
            delta,
        }))?;
        debug!(product_id = %id, delta, changed = !events.is_empty(), "quantity update");
        Ok(())
    }

    pub fn remove_from_cart(&mut self, id: &ProductId) -> Result<(), SessionError> {
        let events = self.commit_cart(CartCommand::RemoveItem(RemoveItem {
            product_id: id.clone(),
        }))?;
        debug!(product_id = %id, removed = !events.is_empty(), "remove from cart");
        Ok(())
    }

    pub fn clear_cart(&mut self) -> Result<(), SessionError> {
        self.commit_cart(CartCommand::Clear)?;
        Ok(())
    }

    pub fn view_cart(&self) -> Result<(), SessionError> {
        self.emit(self.mapper.view_cart(self.cart.items()))
    }

    // --- checkout ---

    /// Fresh entry into the delivery step. Discards any stale delivery info.
    pub fn enter_delivery(&mut self) -> Result<Navigation, SessionError> {
        let events = self
            .checkout
            .handle(&CheckoutCommand::Begin(BeginCheckout {
                cart: self.cart.clone(),
            }))?;
        self.commit_checkout(events)
    }

    pub fn submit_delivery(&mut self, delivery: DeliveryInfo) -> Result<Navigation, SessionError> {
        let events = self
            .checkout
            .handle(&CheckoutCommand::SubmitDelivery(SubmitDelivery {
                cart: self.cart.clone(),
                delivery,
            }))?;
        self.commit_checkout(events)
    }

    /// Enter the payment step; after a reload the persisted delivery info is used.
    pub fn enter_payment(&mut self) -> Result<Navigation, SessionError> {
        let key = self.config.key(DELIVERY_KEY);
        let saved = match load::<DeliveryInfo, _>(&self.persistent, &key)? {
            Loaded::Value(delivery) => Some(delivery),
            Loaded::Missing => None,
            Loaded::Corrupt(err) => {
                warn!(error = %err, "discarding unreadable delivery info");
                self.persistent.remove(&key)?;
                None
            }
        };

        let events = self
            .checkout
            .handle(&CheckoutCommand::EnterPayment(EnterPayment {
                cart: self.cart.clone(),
                saved,
            }))?;
        self.commit_checkout(events)
    }

    /// Authorize payment, place the order and clear the cart.
    pub fn submit_payment(&mut self, payment: PaymentDetails) -> Result<Navigation, SessionError> {
        let command = CheckoutCommand::PlaceOrder(PlaceOrder {
            cart: self.cart.clone(),
            payment: payment.clone(),
            order_id: self.order_ids.next_id(),
            placed_at: Utc::now(),
        });
        let events = self.checkout.handle(&command)?;

        for event in &events {
            if let CheckoutEvent::OrderPlaced(placed) = event {
                let authorization = self.payments.authorize(&payment, placed.order.total)?;
                info!(
                    order_id = %placed.order.id,
                    reference = %authorization.reference,
                    "payment authorized"
                );
            }
        }

        self.commit_checkout(events)
    }

    /// Enter the confirmation view.
    ///
    /// Reads the last order from the session store; without one the shopper is sent
    /// home. `purchase` is recorded once per order, however often the view is entered.
    pub fn enter_confirmation(&mut self) -> Result<Confirmation, SessionError> {
        let home = Confirmation {
            navigation: Navigation::Redirect(Destination::Home),
            order: None,
        };

        let order = match load::<Order, _>(&self.session, &self.config.key(LAST_ORDER_KEY))? {
            Loaded::Value(order) => order,
            Loaded::Missing => {
                debug!("confirmation without an order");
                return Ok(home);
            }
            Loaded::Corrupt(err) => {
                warn!(error = %err, "unreadable last order");
                return Ok(home);
            }
        };

        let tracked_key = self.config.key(PURCHASE_TRACKED_KEY);
        let already_tracked = match load::<OrderId, _>(&self.session, &tracked_key)? {
            Loaded::Value(id) => id == order.id,
            Loaded::Missing | Loaded::Corrupt(_) => false,
        };

        if !already_tracked {
            save(&self.session, &tracked_key, &order.id)?;
            self.emit(self.mapper.purchase(&order))?;
            self.emit(self.mapper.view_order_confirmation(&order))?;
            info!(order_id = %order.id, value = %order.total, "purchase recorded");
        }

        Ok(Confirmation {
            navigation: Navigation::Stay,
            order: Some(order),
        })
    }

    // --- identity ---

    pub fn login(&mut self, user: User) -> Result<(), SessionError> {
        user.validate()?;
        save(&self.persistent, &self.config.key(USER_KEY), &user)?;

        let event = self.mapper.login(&user.id);
        info!(user_id = %user.id, "signed in");
        self.user = Some(user);
        self.emit(event)
    }

    /// Sign out. No-op when nobody is signed in.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        let Some(user) = self.user.clone() else {
            return Ok(());
        };

        self.persistent.remove(&self.config.key(USER_KEY))?;
        self.user = None;
        info!(user_id = %user.id, "signed out");
        self.emit(self.mapper.logout(&user.id))
    }

    // --- misc analytics ---

    pub fn form_interaction(&self, form_id: &str, field: &str) -> Result<(), SessionError> {
        self.emit(self.mapper.form_interaction(form_id, field))
    }

    pub fn newsletter_signup(&self, location: &str) -> Result<(), SessionError> {
        self.emit(self.mapper.newsletter_signup(location))
    }

    // --- pipeline ---

    fn emit(&self, event: AnalyticsEvent) -> Result<(), SessionError> {
        let name = event.name();
        let user_id = self.user.as_ref().map(|u| u.id.clone());
        let envelope = self.data_layer.push(event, user_id)?;
        debug!(event = name, sequence = envelope.sequence_number(), "analytics recorded");
        Ok(())
    }

    /// Decide, persist, then apply a cart command.
    fn commit_cart(&mut self, command: CartCommand) -> Result<Vec<CartEvent>, SessionError> {
        let events = self.cart.handle(&command)?;
        if events.is_empty() {
            return Ok(events);
        }

        let mut next = self.cart.clone();
        for event in &events {
            next.apply(event);
        }

        save(&self.persistent, &self.config.key(CART_KEY), next.items())?;
        self.cart = next;
        for event in &events {
            debug!(event = event.event_type(), version = self.cart.version(), "cart event");
        }
        Ok(events)
    }

    fn commit_checkout(&mut self, events: Vec<CheckoutEvent>) -> Result<Navigation, SessionError> {
        for event in &events {
            self.persist_checkout(event)?;
        }
        for event in &events {
            self.checkout.apply(event);
            debug!(event = event.event_type(), version = self.checkout.version(), "checkout event");
        }
        for event in &events {
            self.record_checkout(event)?;
        }

        let outcome = navigation(&events);
        debug!(phase = ?self.checkout.phase(), navigation = ?outcome, "checkout step");
        Ok(outcome)
    }

    fn persist_checkout(&mut self, event: &CheckoutEvent) -> Result<(), SessionError> {
        match event {
            CheckoutEvent::Started(_) => {
                self.persistent.remove(&self.config.key(DELIVERY_KEY))?;
            }
            CheckoutEvent::DeliverySubmitted(submitted) => {
                save(
                    &self.persistent,
                    &self.config.key(DELIVERY_KEY),
                    &submitted.delivery,
                )?;
            }
            CheckoutEvent::OrderPlaced(placed) => {
                // The stored order must be the last write.
                let previous = self.cart.clone();
                self.commit_cart(CartCommand::Clear)?;
                let stored = self
                    .persistent
                    .remove(&self.config.key(DELIVERY_KEY))
                    .and_then(|()| {
                        save(&self.session, &self.config.key(LAST_ORDER_KEY), &placed.order)
                    });
                if let Err(err) = stored {
                    self.roll_back_order(previous, &placed.order.delivery);
                    return Err(err.into());
                }
            }
            CheckoutEvent::PaymentResumed { .. } | CheckoutEvent::Redirected(_) => {}
        }
        Ok(())
    }

    /// Put back the cart and delivery info an unfinished order placement removed.
    fn roll_back_order(&mut self, cart: Cart, delivery: &DeliveryInfo) {
        if let Err(err) = save(&self.persistent, &self.config.key(CART_KEY), cart.items()) {
            warn!(error = %err, "failed to restore cart after order placement failure");
        }
        if let Err(err) = save(&self.persistent, &self.config.key(DELIVERY_KEY), delivery) {
            warn!(error = %err, "failed to restore delivery info after order placement failure");
        }
        self.cart = cart;
    }

    fn record_checkout(&self, event: &CheckoutEvent) -> Result<(), SessionError> {
        match event {
            CheckoutEvent::Started(started) => {
                self.emit(self.mapper.begin_checkout(&started.items, started.total))
            }
            CheckoutEvent::DeliverySubmitted(submitted) => self.emit(self.mapper.add_shipping_info(
                &submitted.items,
                submitted.total,
                &self.config.shipping_tier,
            )),
            CheckoutEvent::OrderPlaced(placed) => {
                info!(
                    order_id = %placed.order.id,
                    total = %placed.order.total,
                    items = placed.order.item_count(),
                    "order placed"
                );
                self.emit(self.mapper.add_payment_info(&placed.order, &self.config.payment_type))
            }
            CheckoutEvent::Redirected(redirect) => {
                info!(destination = %redirect.to, reason = ?redirect.reason, "checkout redirect");
                Ok(())
            }
            CheckoutEvent::PaymentResumed { .. } => {
                debug!("payment step resumed from saved delivery info");
                Ok(())
            }
        }
    }
}

fn restore_cart<P: KeyValueStore>(config: &StorefrontConfig, store: &P) -> Result<Cart, SessionError> {
    let key = config.key(CART_KEY);
    let items = match load(store, &key)? {
        Loaded::Value(items) => items,
        Loaded::Missing => return Ok(Cart::new()),
        Loaded::Corrupt(err) => {
            warn!(error = %err, "discarding unreadable cart snapshot");
            store.remove(&key)?;
            return Ok(Cart::new());
        }
    };

    match Cart::restore(items) {
        Ok(cart) => Ok(cart),
        Err(err) => {
            warn!(error = %err, "discarding inconsistent cart snapshot");
            store.remove(&key)?;
            Ok(Cart::new())
        }
    }
}

fn restore_user<P: KeyValueStore>(
    config: &StorefrontConfig,
    store: &P,
) -> Result<Option<User>, SessionError> {
    let key = config.key(USER_KEY);
    match load::<User, _>(store, &key)? {
        Loaded::Value(user) => Ok(Some(user)),
        Loaded::Missing => Ok(None),
        Loaded::Corrupt(err) => {
            warn!(error = %err, "discarding unreadable user");
            store.remove(&key)?;
            Ok(None)
        }
    }
}
