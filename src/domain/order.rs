use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::catalog::CatalogOffer;
use super::errors::DomainError;

/// Lifecycle state of an order.
///
/// ```text
/// Open ──► Placed
/// ```
///
/// `Open` orders are baskets; at most one exists per user. `Placed` is
/// terminal as far as this service is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderState {
    #[default]
    Open,
    Placed,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Open => "open",
            OrderState::Placed => "placed",
        }
    }

    pub fn can_modify_items(&self) -> bool {
        matches!(self, OrderState::Open)
    }

    pub fn can_transition_to(&self, next: OrderState) -> bool {
        matches!((self, next), (OrderState::Open, OrderState::Placed))
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(OrderState::Open),
            "placed" => Ok(OrderState::Placed),
            other => Err(DomainError::Internal(format!("unknown order state '{other}'"))),
        }
    }
}

/// A quantity that is known to be at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quantity(i32);

impl Quantity {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        match i32::try_from(value) {
            Ok(v) if v >= 1 => Ok(Self(v)),
            _ => Err(DomainError::Validation(format!(
                "quantity must be a positive integer, got {value}"
            ))),
        }
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: i64,
    pub user_id: i64,
    pub state: OrderState,
    pub contact_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub id: i64,
    pub order_id: i64,
    pub offer_id: i64,
    pub quantity: i32,
}

/// A line item joined against the catalog offer it references.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLineItem {
    pub id: i64,
    pub quantity: i32,
    pub offer: CatalogOffer,
}

impl ResolvedLineItem {
    pub fn line_total(&self) -> BigDecimal {
        &self.offer.unit_price * BigDecimal::from(self.quantity)
    }
}

/// An order together with its resolved line items, as read at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSnapshot {
    pub order: OrderRecord,
    pub items: Vec<ResolvedLineItem>,
}

impl OrderSnapshot {
    pub fn total_sum(&self) -> BigDecimal {
        total_sum(&self.items)
    }

    /// The part of the total sold by shops that `user_id` manages.
    pub fn supplier_total(&self, user_id: i64) -> BigDecimal {
        self.items
            .iter()
            .filter(|item| item.offer.shop_owner == Some(user_id))
            .fold(BigDecimal::from(0), |acc, item| acc + item.line_total())
    }

    /// True if any line item references an offer from one of the given shops.
    pub fn involves_shop(&self, shop_ids: &[i64]) -> bool {
        self.items
            .iter()
            .any(|item| shop_ids.contains(&item.offer.shop_id))
    }
}

/// Sum of `quantity × unit_price` over the given items. Never stored.
pub fn total_sum(items: &[ResolvedLineItem]) -> BigDecimal {
    items
        .iter()
        .fold(BigDecimal::from(0), |acc, item| acc + item.line_total())
}

/// Whose placed orders are being listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// Orders the user placed themselves.
    Buyer(i64),
    /// Orders holding at least one item from a shop owned by this user.
    Supplier(i64),
}
