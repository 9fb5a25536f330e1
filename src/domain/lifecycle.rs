//! The `open → placed` transition.
//!
//! Every store checks placement preconditions through [`ensure_can_place`] and
//! then performs the state change as a single conditional update, so a lost
//! race surfaces as [`DomainError::InvalidState`] rather than a second success.

use serde_json::{json, Value};

use super::errors::DomainError;
use super::order::{OrderRecord, OrderState};

/// Outbox routing key; the relay derives the topic name from it.
pub const AGGREGATE_TYPE: &str = "Order";

/// Emitted once per successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPlaced {
    pub order_id: i64,
    pub user_id: i64,
    pub contact_id: i64,
}

impl OrderPlaced {
    pub const EVENT_TYPE: &'static str = "OrderPlaced";

    pub fn payload(&self) -> Value {
        json!({
            "order_id": self.order_id,
            "user_id": self.user_id,
            "contact_id": self.contact_id,
            "state": OrderState::Placed.as_str(),
        })
    }
}

/// Checks, in order: ownership, current state, non-empty basket.
pub fn ensure_can_place(
    order: &OrderRecord,
    user_id: i64,
    item_count: usize,
) -> Result<(), DomainError> {
    if order.user_id != user_id {
        return Err(DomainError::NotAuthorized);
    }
    if !order.state.can_transition_to(OrderState::Placed) {
        return Err(DomainError::InvalidState);
    }
    if item_count == 0 {
        return Err(DomainError::EmptyBasket);
    }
    Ok(())
}

/// Maps the row count of the conditional update onto the transition result.
pub fn confirm_transition(rows_affected: usize) -> Result<(), DomainError> {
    match rows_affected {
        1 => Ok(()),
        0 => Err(DomainError::InvalidState),
        n => Err(DomainError::Internal(format!(
            "placement updated {n} rows, expected one"
        ))),
    }
}
