use super::catalog::{CatalogOffer, OfferFilter, Shop};
use super::errors::DomainError;
use super::lifecycle::OrderPlaced;
use super::order::{LineItem, OrderRecord, OrderSnapshot, Quantity, Viewer};

/// Read-only view of the offers the catalog import job has published.
pub trait CatalogReader: Send + Sync + 'static {
    /// Resolves an offer that can currently be bought.
    ///
    /// Fails with [`DomainError::OfferNotFound`] if the id is unknown or the
    /// offer's shop is inactive.
    fn lookup(&self, offer_id: i64) -> Result<CatalogOffer, DomainError>;

    /// Active-shop offers matching `filter`, each listed once, ordered by id.
    fn list_offers(&self, filter: &OfferFilter) -> Result<Vec<CatalogOffer>, DomainError>;

    fn list_active_shops(&self) -> Result<Vec<Shop>, DomainError>;
}

/// Line items of open orders. Every operation is scoped to one order and
/// touches nothing once the order has left the open state.
pub trait LineItemStore: Send + Sync + 'static {
    /// Fails with [`DomainError::Conflict`] if the order already holds a line
    /// for this offer.
    fn insert_item(
        &self,
        order_id: i64,
        offer_id: i64,
        quantity: Quantity,
    ) -> Result<LineItem, DomainError>;

    /// Returns the number of rows changed; zero when the item is not part of
    /// the order.
    fn set_quantity(
        &self,
        order_id: i64,
        item_id: i64,
        quantity: Quantity,
    ) -> Result<usize, DomainError>;

    /// Deletes the listed items that belong to the order in one statement
    /// and returns how many went.
    fn remove_items(&self, order_id: i64, item_ids: &[i64]) -> Result<usize, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// The user's single open order, created on first use. Concurrent first
    /// calls converge on the same row.
    fn get_or_create_open_basket(&self, user_id: i64) -> Result<OrderRecord, DomainError>;

    fn find_open_basket(&self, user_id: i64) -> Result<Option<OrderRecord>, DomainError>;

    fn snapshot(&self, order_id: i64) -> Result<Option<OrderSnapshot>, DomainError>;

    /// Non-open orders visible to `viewer`, newest first.
    fn list_placed(&self, viewer: Viewer) -> Result<Vec<OrderSnapshot>, DomainError>;

    /// Moves an open order to placed and records the [`OrderPlaced`] event in
    /// the same unit of work.
    fn place(
        &self,
        order_id: i64,
        user_id: i64,
        contact_id: i64,
    ) -> Result<OrderPlaced, DomainError>;
}

/// Everything the basket service needs from persistence.
pub trait Store: CatalogReader + LineItemStore + OrderRepository {}

impl<T: CatalogReader + LineItemStore + OrderRepository> Store for T {}
