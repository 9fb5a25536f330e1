use thiserror::Error;

use super::caller::Role;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Offer {0} is not available")]
    OfferNotFound(i64),
    #[error("Order does not belong to the caller")]
    NotAuthorized,
    #[error("Only available to the {0} role")]
    RoleRequired(Role),
    #[error("Order is not open")]
    InvalidState,
    #[error("Basket is empty")]
    EmptyBasket,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
