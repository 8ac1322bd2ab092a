//! Checkout domain module.
//!
//! A two-phase linear flow (Delivery → Payment → Confirmed) over a cart snapshot,
//! producing an immutable [`Order`]. Pure decision logic; the session orchestrator
//! owns persistence, payment authorization and analytics.

pub mod delivery;
pub mod flow;
pub mod order;
pub mod payment;

pub use delivery::DeliveryInfo;
pub use flow::{
    BeginCheckout, CheckoutCommand, CheckoutEvent, CheckoutFlow, CheckoutPhase, CheckoutState,
    CheckoutStarted, DeliverySubmitted, EnterPayment, GuardViolation, OrderPlaced, PlaceOrder,
    Redirected, SubmitDelivery, navigation,
};
pub use order::{
    Order, OrderIdGenerator, SequentialOrderIdGenerator, TAX_RATE_BPS, TimeOrderedIdGenerator,
};
pub use payment::{
    PaymentAuthorization, PaymentAuthorizer, PaymentDetails, PaymentError,
    SimulatedPaymentAuthorizer,
};
