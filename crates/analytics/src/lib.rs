//! Analytics contract: GA4-style ecommerce payloads and the data layer they are
//! appended to.
//!
//! Mapping is pure ([`EventMapper`]); recording is done by a [`DataLayer`]. The
//! session orchestrator decides *when* to record (always after the state change it
//! describes has been persisted).

pub mod data_layer;
pub mod event;
pub mod mapper;

pub use data_layer::{AnalyticsEnvelope, DataLayer, DataLayerError, InMemoryDataLayer};
pub use event::{
    AnalyticsEvent, AnalyticsItem, Commerce, ItemList, PageView, PaymentCommerce,
    PurchaseCommerce, ShippingCommerce,
};
pub use mapper::EventMapper;
