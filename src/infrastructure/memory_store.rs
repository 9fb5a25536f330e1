//! In-process store with the same semantics as [`DieselStore`], guarded by a
//! single mutex. Used by the test suite and for running without PostgreSQL.
//!
//! [`DieselStore`]: super::diesel_store::DieselStore

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::Utc;

use crate::domain::catalog::{CatalogOffer, OfferFilter, OfferParameter, Shop};
use crate::domain::errors::DomainError;
use crate::domain::lifecycle::{self, OrderPlaced};
use crate::domain::order::{
    LineItem, OrderRecord, OrderSnapshot, OrderState, Quantity, ResolvedLineItem, Viewer,
};
use crate::domain::ports::{CatalogReader, LineItemStore, OrderRepository};

#[derive(Debug)]
struct ShopEntry {
    name: String,
    owner: Option<i64>,
    active: bool,
}

#[derive(Debug)]
struct OfferEntry {
    shop_id: i64,
    product_id: i64,
    product_name: String,
    category_id: i64,
    price: BigDecimal,
    available: i32,
    parameters: Vec<OfferParameter>,
}

#[derive(Debug, Default)]
struct Sequences {
    shop: i64,
    offer: i64,
    contact: i64,
    order: i64,
    item: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Debug, Default)]
struct State {
    seq: Sequences,
    shops: BTreeMap<i64, ShopEntry>,
    offers: BTreeMap<i64, OfferEntry>,
    contacts: BTreeMap<i64, i64>,
    orders: BTreeMap<i64, OrderRecord>,
    items: BTreeMap<i64, LineItem>,
    outbox: Vec<OrderPlaced>,
}

impl State {
    fn resolve(&self, offer_id: i64) -> Option<CatalogOffer> {
        let offer = self.offers.get(&offer_id)?;
        let shop = self.shops.get(&offer.shop_id)?;
        Some(CatalogOffer {
            id: offer_id,
            shop_id: offer.shop_id,
            shop_name: shop.name.clone(),
            shop_active: shop.active,
            shop_owner: shop.owner,
            product_id: offer.product_id,
            product_name: offer.product_name.clone(),
            category_id: offer.category_id,
            model: String::new(),
            unit_price: offer.price.clone(),
            price_rrc: offer.price.clone(),
            available: offer.available,
            parameters: offer.parameters.clone(),
        })
    }

    fn open_order(&self, order_id: i64) -> Option<&OrderRecord> {
        self.orders
            .get(&order_id)
            .filter(|o| o.state.can_modify_items())
    }

    fn snapshot(&self, order: &OrderRecord) -> OrderSnapshot {
        let items = self
            .items
            .values()
            .filter(|item| item.order_id == order.id)
            .filter_map(|item| {
                Some(ResolvedLineItem {
                    id: item.id,
                    quantity: item.quantity,
                    offer: self.resolve(item.offer_id)?,
                })
            })
            .collect();
        OrderSnapshot {
            order: order.clone(),
            items,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Internal("memory store lock poisoned".to_string()))
    }

    pub fn add_shop(
        &self,
        name: &str,
        owner: Option<i64>,
        active: bool,
    ) -> Result<i64, DomainError> {
        let mut state = self.state()?;
        let id = next(&mut state.seq.shop);
        state.shops.insert(
            id,
            ShopEntry {
                name: name.to_string(),
                owner,
                active,
            },
        );
        Ok(id)
    }

    pub fn set_shop_state(&self, shop_id: i64, active: bool) -> Result<(), DomainError> {
        let mut state = self.state()?;
        let shop = state
            .shops
            .get_mut(&shop_id)
            .ok_or_else(|| DomainError::Validation(format!("unknown shop {shop_id}")))?;
        shop.active = active;
        Ok(())
    }

    /// Publishes an offer of a new product in `category_id`.
    pub fn add_offer(
        &self,
        shop_id: i64,
        product_name: &str,
        category_id: i64,
        price: BigDecimal,
        available: i32,
    ) -> Result<i64, DomainError> {
        let mut state = self.state()?;
        if !state.shops.contains_key(&shop_id) {
            return Err(DomainError::Validation(format!("unknown shop {shop_id}")));
        }
        let id = next(&mut state.seq.offer);
        state.offers.insert(
            id,
            OfferEntry {
                shop_id,
                product_id: id,
                product_name: product_name.to_string(),
                category_id,
                price,
                available,
                parameters: Vec::new(),
            },
        );
        Ok(id)
    }

    pub fn add_parameter(&self, offer_id: i64, name: &str, value: &str) -> Result<(), DomainError> {
        let mut state = self.state()?;
        let offer = state
            .offers
            .get_mut(&offer_id)
            .ok_or(DomainError::OfferNotFound(offer_id))?;
        offer.parameters.push(OfferParameter {
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    pub fn add_contact(&self, user_id: i64) -> Result<i64, DomainError> {
        let mut state = self.state()?;
        let id = next(&mut state.seq.contact);
        state.contacts.insert(id, user_id);
        Ok(id)
    }

    /// Events recorded by successful placements, oldest first.
    pub fn placed_events(&self) -> Result<Vec<OrderPlaced>, DomainError> {
        Ok(self.state()?.outbox.clone())
    }

    /// Number of open orders held for `user_id`.
    pub fn open_basket_count(&self, user_id: i64) -> Result<usize, DomainError> {
        Ok(self
            .state()?
            .orders
            .values()
            .filter(|o| o.user_id == user_id && o.state == OrderState::Open)
            .count())
    }
}

impl CatalogReader for MemoryStore {
    fn lookup(&self, offer_id: i64) -> Result<CatalogOffer, DomainError> {
        self.state()?
            .resolve(offer_id)
            .filter(CatalogOffer::is_purchasable)
            .ok_or(DomainError::OfferNotFound(offer_id))
    }

    fn list_offers(&self, filter: &OfferFilter) -> Result<Vec<CatalogOffer>, DomainError> {
        let state = self.state()?;
        Ok(state
            .offers
            .keys()
            .filter_map(|id| state.resolve(*id))
            .filter(|offer| filter.matches(offer))
            .collect())
    }

    fn list_active_shops(&self) -> Result<Vec<Shop>, DomainError> {
        let state = self.state()?;
        let mut shops: Vec<Shop> = state
            .shops
            .iter()
            .filter(|(_, shop)| shop.active)
            .map(|(id, shop)| Shop {
                id: *id,
                name: shop.name.clone(),
                active: shop.active,
            })
            .collect();
        shops.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(shops)
    }
}

impl LineItemStore for MemoryStore {
    fn insert_item(
        &self,
        order_id: i64,
        offer_id: i64,
        quantity: Quantity,
    ) -> Result<LineItem, DomainError> {
        let mut state = self.state()?;
        match state.orders.get(&order_id) {
            None => return Err(DomainError::NotAuthorized),
            Some(order) if !order.state.can_modify_items() => {
                return Err(DomainError::InvalidState)
            }
            Some(_) => {}
        }
        if !state.offers.contains_key(&offer_id) {
            return Err(DomainError::OfferNotFound(offer_id));
        }
        if state
            .items
            .values()
            .any(|item| item.order_id == order_id && item.offer_id == offer_id)
        {
            return Err(DomainError::Conflict(format!(
                "offer {offer_id} is already in order {order_id}"
            )));
        }

        let item = LineItem {
            id: next(&mut state.seq.item),
            order_id,
            offer_id,
            quantity: quantity.get(),
        };
        state.items.insert(item.id, item);
        Ok(item)
    }

    fn set_quantity(
        &self,
        order_id: i64,
        item_id: i64,
        quantity: Quantity,
    ) -> Result<usize, DomainError> {
        let mut state = self.state()?;
        if state.open_order(order_id).is_none() {
            return Ok(0);
        }
        match state.items.get_mut(&item_id) {
            Some(item) if item.order_id == order_id => {
                item.quantity = quantity.get();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    fn remove_items(&self, order_id: i64, item_ids: &[i64]) -> Result<usize, DomainError> {
        let mut state = self.state()?;
        if state.open_order(order_id).is_none() {
            return Ok(0);
        }
        let before = state.items.len();
        state
            .items
            .retain(|id, item| !(item.order_id == order_id && item_ids.contains(id)));
        Ok(before - state.items.len())
    }
}

impl OrderRepository for MemoryStore {
    fn get_or_create_open_basket(&self, user_id: i64) -> Result<OrderRecord, DomainError> {
        let mut state = self.state()?;
        if let Some(order) = state
            .orders
            .values()
            .find(|o| o.user_id == user_id && o.state == OrderState::Open)
        {
            return Ok(order.clone());
        }

        let order = OrderRecord {
            id: next(&mut state.seq.order),
            user_id,
            state: OrderState::Open,
            contact_id: None,
            created_at: Utc::now(),
        };
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    fn find_open_basket(&self, user_id: i64) -> Result<Option<OrderRecord>, DomainError> {
        Ok(self
            .state()?
            .orders
            .values()
            .find(|o| o.user_id == user_id && o.state == OrderState::Open)
            .cloned())
    }

    fn snapshot(&self, order_id: i64) -> Result<Option<OrderSnapshot>, DomainError> {
        let state = self.state()?;
        Ok(state.orders.get(&order_id).map(|order| state.snapshot(order)))
    }

    fn list_placed(&self, viewer: Viewer) -> Result<Vec<OrderSnapshot>, DomainError> {
        let state = self.state()?;
        let owned_shops: Vec<i64> = match viewer {
            Viewer::Supplier(user_id) => state
                .shops
                .iter()
                .filter(|(_, shop)| shop.owner == Some(user_id))
                .map(|(id, _)| *id)
                .collect(),
            Viewer::Buyer(_) => Vec::new(),
        };

        let mut placed: Vec<OrderSnapshot> = state
            .orders
            .values()
            .filter(|o| o.state != OrderState::Open)
            .map(|o| state.snapshot(o))
            .filter(|snapshot| match viewer {
                Viewer::Buyer(user_id) => snapshot.order.user_id == user_id,
                Viewer::Supplier(_) => snapshot.involves_shop(&owned_shops),
            })
            .collect();
        placed.sort_by(|a, b| {
            (b.order.created_at, b.order.id).cmp(&(a.order.created_at, a.order.id))
        });
        Ok(placed)
    }

    fn place(
        &self,
        order_id: i64,
        user_id: i64,
        contact_id: i64,
    ) -> Result<OrderPlaced, DomainError> {
        let mut state = self.state()?;
        let order = state
            .orders
            .get(&order_id)
            .ok_or(DomainError::NotAuthorized)?;
        let item_count = state
            .items
            .values()
            .filter(|item| item.order_id == order_id)
            .count();
        lifecycle::ensure_can_place(order, user_id, item_count)?;

        if state.contacts.get(&contact_id) != Some(&user_id) {
            return Err(DomainError::Validation(format!(
                "contact {contact_id} does not belong to the caller"
            )));
        }

        let updated = match state.orders.get_mut(&order_id) {
            Some(order) if order.state == OrderState::Open => {
                order.state = OrderState::Placed;
                order.contact_id = Some(contact_id);
                1
            }
            _ => 0,
        };
        lifecycle::confirm_transition(updated)?;

        let event = OrderPlaced {
            order_id,
            user_id,
            contact_id,
        };
        state.outbox.push(event);
        Ok(event)
    }
}
