//! The checkout state machine.
//!
//! ```text
//! Delivery ──submit delivery──▶ Payment ──place order──▶ Confirmed
//!    ▲                             │
//!    └──────── begin (fresh) ──────┘
//! ```
//!
//! Entry guards never fail: a violated precondition produces a [`Redirected`]
//! event naming where the shopper should go instead. Only blank form fields are
//! reported as errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_cart::{Cart, CartItem};
use storefront_core::{Aggregate, Destination, DomainError, Money, Navigation, OrderId};
use storefront_events::Event;

use crate::delivery::DeliveryInfo;
use crate::order::Order;
use crate::payment::PaymentDetails;

/// Where the flow currently stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CheckoutState {
    #[default]
    Delivery,
    Payment {
        delivery: DeliveryInfo,
    },
    Confirmed {
        order: Order,
    },
}

/// Field-free view of [`CheckoutState`], for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    Delivery,
    Payment,
    Confirmed,
}

impl CheckoutState {
    pub fn phase(&self) -> CheckoutPhase {
        match self {
            CheckoutState::Delivery => CheckoutPhase::Delivery,
            CheckoutState::Payment { .. } => CheckoutPhase::Payment,
            CheckoutState::Confirmed { .. } => CheckoutPhase::Confirmed,
        }
    }
}

/// Which entry precondition did not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardViolation {
    EmptyCart,
    MissingDeliveryInfo,
}

/// Command: enter the delivery step afresh.
#[derive(Debug, Clone, PartialEq)]
pub struct BeginCheckout {
    pub cart: Cart,
}

/// Command: submit the delivery form.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitDelivery {
    pub cart: Cart,
    pub delivery: DeliveryInfo,
}

/// Command: enter the payment step, possibly after a reload.
///
/// `saved` is the delivery info persisted by an earlier submission, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct EnterPayment {
    pub cart: Cart,
    pub saved: Option<DeliveryInfo>,
}

/// Command: submit the payment form and place the order.
///
/// The id and timestamp are supplied by the caller so that deciding stays pure.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOrder {
    pub cart: Cart,
    pub payment: PaymentDetails,
    pub order_id: OrderId,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutCommand {
    Begin(BeginCheckout),
    SubmitDelivery(SubmitDelivery),
    EnterPayment(EnterPayment),
    PlaceOrder(PlaceOrder),
}

/// Event: CheckoutStarted. Carries the cart contents for `begin_checkout`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutStarted {
    pub items: Vec<CartItem>,
    pub total: Money,
}

/// Event: DeliverySubmitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverySubmitted {
    pub delivery: DeliveryInfo,
    pub items: Vec<CartItem>,
    pub total: Money,
}

/// Event: OrderPlaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order: Order,
}

/// Event: Redirected (an entry guard did not hold).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirected {
    pub to: Destination,
    pub reason: GuardViolation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CheckoutEvent {
    Started(CheckoutStarted),
    DeliverySubmitted(DeliverySubmitted),
    /// Payment step re-entered from persisted delivery info.
    PaymentResumed { delivery: DeliveryInfo },
    OrderPlaced(OrderPlaced),
    Redirected(Redirected),
}

impl CheckoutEvent {
    /// Navigation outcome the shopper sees for this event.
    pub fn navigation(&self) -> Navigation {
        match self {
            CheckoutEvent::Started(_) | CheckoutEvent::PaymentResumed { .. } => Navigation::Stay,
            CheckoutEvent::DeliverySubmitted(_) => {
                Navigation::Navigate(Destination::CheckoutPayment)
            }
            CheckoutEvent::OrderPlaced(_) => Navigation::Navigate(Destination::CheckoutConfirmation),
            CheckoutEvent::Redirected(r) => Navigation::Redirect(r.to.clone()),
        }
    }
}

/// Navigation outcome of a decision: the last event wins, no events means stay.
pub fn navigation(events: &[CheckoutEvent]) -> Navigation {
    events
        .last()
        .map(CheckoutEvent::navigation)
        .unwrap_or(Navigation::Stay)
}

impl Event for CheckoutEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CheckoutEvent::Started(_) => "checkout.started",
            CheckoutEvent::DeliverySubmitted(_) => "checkout.delivery_submitted",
            CheckoutEvent::PaymentResumed { .. } => "checkout.payment_resumed",
            CheckoutEvent::OrderPlaced(_) => "checkout.order_placed",
            CheckoutEvent::Redirected(_) => "checkout.redirected",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

/// Aggregate: one shopper's checkout.
///
/// # Invariants
/// - Payment is only reachable with delivery info and a non-empty cart.
/// - An order is only placed from the payment step, over a non-empty cart.
/// - A placed order never changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckoutFlow {
    state: CheckoutState,
    version: u64,
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.state.phase()
    }

    pub fn delivery(&self) -> Option<&DeliveryInfo> {
        match &self.state {
            CheckoutState::Payment { delivery } => Some(delivery),
            CheckoutState::Confirmed { order } => Some(&order.delivery),
            CheckoutState::Delivery => None,
        }
    }

    pub fn order(&self) -> Option<&Order> {
        match &self.state {
            CheckoutState::Confirmed { order } => Some(order),
            _ => None,
        }
    }
}

fn redirect(to: Destination, reason: GuardViolation) -> Vec<CheckoutEvent> {
    vec![CheckoutEvent::Redirected(Redirected { to, reason })]
}

impl Aggregate for CheckoutFlow {
    type Command = CheckoutCommand;
    type Event = CheckoutEvent;
    type Error = DomainError;

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CheckoutEvent::Started(_) => {
                self.state = CheckoutState::Delivery;
            }
            CheckoutEvent::DeliverySubmitted(e) => {
                self.state = CheckoutState::Payment {
                    delivery: e.delivery.clone(),
                };
            }
            CheckoutEvent::PaymentResumed { delivery } => {
                self.state = CheckoutState::Payment {
                    delivery: delivery.clone(),
                };
            }
            CheckoutEvent::OrderPlaced(e) => {
                self.state = CheckoutState::Confirmed {
                    order: e.order.clone(),
                };
            }
            // A redirect back into checkout restarts at the delivery step; anywhere
            // else leaves the flow where it was.
            CheckoutEvent::Redirected(r) => {
                if r.to == Destination::CheckoutDelivery
                    && !matches!(self.state, CheckoutState::Confirmed { .. })
                {
                    self.state = CheckoutState::Delivery;
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CheckoutCommand::Begin(cmd) => Ok(self.handle_begin(cmd)),
            CheckoutCommand::SubmitDelivery(cmd) => self.handle_submit_delivery(cmd),
            CheckoutCommand::EnterPayment(cmd) => Ok(self.handle_enter_payment(cmd)),
            CheckoutCommand::PlaceOrder(cmd) => self.handle_place_order(cmd),
        }
    }
}

impl CheckoutFlow {
    fn handle_begin(&self, cmd: &BeginCheckout) -> Vec<CheckoutEvent> {
        if cmd.cart.is_empty() {
            return redirect(Destination::Cart, GuardViolation::EmptyCart);
        }

        vec![CheckoutEvent::Started(CheckoutStarted {
            items: cmd.cart.snapshot(),
            total: cmd.cart.total(),
        })]
    }

    fn handle_submit_delivery(&self, cmd: &SubmitDelivery) -> Result<Vec<CheckoutEvent>, DomainError> {
        if cmd.cart.is_empty() {
            return Ok(redirect(Destination::Cart, GuardViolation::EmptyCart));
        }

        cmd.delivery.validate()?;

        Ok(vec![CheckoutEvent::DeliverySubmitted(DeliverySubmitted {
            delivery: cmd.delivery.clone(),
            items: cmd.cart.snapshot(),
            total: cmd.cart.total(),
        })])
    }

    fn handle_enter_payment(&self, cmd: &EnterPayment) -> Vec<CheckoutEvent> {
        if cmd.cart.is_empty() {
            return redirect(Destination::CheckoutDelivery, GuardViolation::EmptyCart);
        }

        match (&self.state, &cmd.saved) {
            (CheckoutState::Payment { .. }, _) => vec![],
            (_, Some(saved)) => vec![CheckoutEvent::PaymentResumed {
                delivery: saved.clone(),
            }],
            (_, None) => redirect(
                Destination::CheckoutDelivery,
                GuardViolation::MissingDeliveryInfo,
            ),
        }
    }

    fn handle_place_order(&self, cmd: &PlaceOrder) -> Result<Vec<CheckoutEvent>, DomainError> {
        let CheckoutState::Payment { delivery } = &self.state else {
            return Ok(redirect(
                Destination::CheckoutDelivery,
                GuardViolation::MissingDeliveryInfo,
            ));
        };

        if cmd.cart.is_empty() {
            return Ok(redirect(
                Destination::CheckoutDelivery,
                GuardViolation::EmptyCart,
            ));
        }

        cmd.payment.validate()?;

        let order = Order::place(
            cmd.order_id.clone(),
            cmd.cart.snapshot(),
            delivery.clone(),
            cmd.placed_at,
        );

        Ok(vec![CheckoutEvent::OrderPlaced(OrderPlaced { order })])
    }
}
