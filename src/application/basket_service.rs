use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

use crate::domain::batch::{
    decode_batch, parse_id_list, parse_new_item, parse_quantity_change, BatchReport,
};
use crate::domain::caller::{Caller, Role};
use crate::domain::catalog::{CatalogOffer, OfferFilter, Shop};
use crate::domain::errors::DomainError;
use crate::domain::lifecycle::OrderPlaced;
use crate::domain::order::{LineItem, OrderSnapshot, Viewer};
use crate::domain::ports::Store;

/// The operations exposed to the request layer. All input validation happens
/// here before any store mutation.
#[derive(Clone)]
pub struct BasketService {
    store: Arc<dyn Store>,
}

impl BasketService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The caller's basket, if one has been started. Reading never creates it.
    pub fn get_basket(&self, caller: &Caller) -> Result<Option<OrderSnapshot>, DomainError> {
        let Some(basket) = self.store.find_open_basket(caller.user_id)? else {
            return Ok(None);
        };
        self.store.snapshot(basket.id)
    }

    pub fn add_items(&self, caller: &Caller, raw: &Value) -> Result<BatchReport, DomainError> {
        let entries = match decode_batch(raw) {
            Ok(entries) => entries,
            Err(reason) => {
                warn!("user {}: discarding add batch: {}", caller.user_id, reason);
                return Ok(BatchReport::malformed(reason));
            }
        };

        let basket = self.store.get_or_create_open_basket(caller.user_id)?;
        let mut report = BatchReport::default();
        for (index, entry) in entries.iter().enumerate() {
            match self.add_one(basket.id, entry) {
                Ok(item) => report.applied(index, item.id),
                Err(err @ DomainError::Internal(_)) => return Err(err),
                Err(err) => {
                    debug!("basket {}: entry {} rejected: {}", basket.id, index, err);
                    report.rejected(index, &err);
                }
            }
        }

        info!(
            "basket {}: created {} of {} items",
            basket.id,
            report.applied_count(),
            entries.len()
        );
        Ok(report)
    }

    fn add_one(&self, order_id: i64, entry: &Value) -> Result<LineItem, DomainError> {
        let item = parse_new_item(entry)?;
        let offer = self.store.lookup(item.offer_id)?;
        if !offer.is_purchasable() {
            return Err(DomainError::OfferNotFound(offer.id));
        }
        self.store.insert_item(order_id, offer.id, item.quantity)
    }

    pub fn update_quantities(
        &self,
        caller: &Caller,
        raw: &Value,
    ) -> Result<BatchReport, DomainError> {
        let entries = match decode_batch(raw) {
            Ok(entries) => entries,
            Err(reason) => {
                warn!("user {}: discarding update batch: {}", caller.user_id, reason);
                return Ok(BatchReport::malformed(reason));
            }
        };

        let basket = self.store.get_or_create_open_basket(caller.user_id)?;
        let mut report = BatchReport::default();
        for (index, entry) in entries.iter().enumerate() {
            let change = match parse_quantity_change(entry) {
                Ok(change) => change,
                Err(err) => {
                    report.rejected(index, &err);
                    continue;
                }
            };
            match self
                .store
                .set_quantity(basket.id, change.item_id, change.quantity)?
            {
                0 => report.rejected(
                    index,
                    &DomainError::Validation(format!(
                        "item {} is not in the basket",
                        change.item_id
                    )),
                ),
                _ => report.applied(index, change.item_id),
            }
        }

        info!(
            "basket {}: updated {} of {} items",
            basket.id,
            report.applied_count(),
            entries.len()
        );
        Ok(report)
    }

    /// Removes the numeric ids of `raw` (a comma separated list) that belong
    /// to the caller's basket. Everything else in the list is ignored.
    pub fn remove_items(&self, caller: &Caller, raw: &str) -> Result<usize, DomainError> {
        let ids = parse_id_list(raw);
        if ids.is_empty() {
            return Err(DomainError::Validation(
                "items must list at least one numeric id".into(),
            ));
        }
        let basket = self.store.get_or_create_open_basket(caller.user_id)?;
        let removed = self.store.remove_items(basket.id, &ids)?;
        info!("basket {}: removed {} items", basket.id, removed);
        Ok(removed)
    }

    pub fn place_order(
        &self,
        caller: &Caller,
        order_id: i64,
        contact_id: i64,
    ) -> Result<OrderPlaced, DomainError> {
        let event = self.store.place(order_id, caller.user_id, contact_id)?;
        info!(
            "order {} placed by user {} (contact {})",
            event.order_id, event.user_id, event.contact_id
        );
        Ok(event)
    }

    pub fn list_my_orders(&self, caller: &Caller) -> Result<Vec<OrderSnapshot>, DomainError> {
        self.store.list_placed(Viewer::Buyer(caller.user_id))
    }

    pub fn list_supplier_orders(
        &self,
        caller: &Caller,
    ) -> Result<Vec<OrderSnapshot>, DomainError> {
        if caller.role != Role::Shop {
            return Err(DomainError::RoleRequired(Role::Shop));
        }
        self.store.list_placed(Viewer::Supplier(caller.user_id))
    }

    pub fn list_offers(&self, filter: &OfferFilter) -> Result<Vec<CatalogOffer>, DomainError> {
        self.store.list_offers(filter)
    }

    pub fn list_shops(&self) -> Result<Vec<Shop>, DomainError> {
        self.store.list_active_shops()
    }
}
