use thiserror::Error;

use storefront_analytics::DataLayerError;
use storefront_checkout::PaymentError;
use storefront_core::DomainError;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Analytics(#[from] DataLayerError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}
