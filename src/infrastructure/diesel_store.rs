use std::collections::HashMap;

use chrono::Utc;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use log::{debug, info};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::{CatalogOffer, OfferFilter, OfferParameter, Shop};
use crate::domain::errors::DomainError;
use crate::domain::lifecycle::{self, OrderPlaced, AGGREGATE_TYPE};
use crate::domain::order::{
    LineItem, OrderRecord, OrderSnapshot, OrderState, Quantity, ResolvedLineItem, Viewer,
};
use crate::domain::ports::{CatalogReader, LineItemStore, OrderRepository};
use crate::schema::{
    contacts, order_items, order_outbox, orders, product_infos, product_parameters, products,
    shops,
};

use super::models::{
    NewOrderItemRow, NewOrderRow, NewOutboxEventRow, OrderItemRow, OrderRow, ProductInfoRow,
    ProductParameterRow, ProductRow, ShopRow,
};

/// Insert attempts before giving up on obtaining a basket.
const BASKET_ATTEMPTS: usize = 3;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation | DatabaseErrorKind::CheckViolation,
                info,
            ) => DomainError::Validation(info.message().to_string()),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl TryFrom<OrderRow> for OrderRecord {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(OrderRecord {
            id: row.id,
            user_id: row.user_id,
            state: row.state.parse()?,
            contact_id: row.contact_id,
            created_at: row.created_at,
        })
    }
}

type OfferRows = (ProductInfoRow, ShopRow, ProductRow);

fn offer_from_rows(
    (info, shop, product): OfferRows,
    parameters: Vec<OfferParameter>,
) -> CatalogOffer {
    CatalogOffer {
        id: info.id,
        shop_id: shop.id,
        shop_name: shop.name,
        shop_active: shop.state,
        shop_owner: shop.user_id,
        product_id: product.id,
        product_name: product.name,
        category_id: product.category_id,
        model: info.model,
        unit_price: info.price,
        price_rrc: info.price_rrc,
        available: info.quantity,
        parameters,
    }
}

/// Attaches parameters with a second query so the multi-valued join never
/// multiplies offer rows.
fn into_offers(
    conn: &mut PgConnection,
    rows: Vec<OfferRows>,
) -> Result<Vec<CatalogOffer>, DomainError> {
    let ids: Vec<i64> = rows.iter().map(|(info, _, _)| info.id).collect();
    let mut parameters: HashMap<i64, Vec<OfferParameter>> = HashMap::new();
    if !ids.is_empty() {
        let parameter_rows = product_parameters::table
            .filter(product_parameters::product_info_id.eq_any(&ids))
            .order(product_parameters::id.asc())
            .select(ProductParameterRow::as_select())
            .load(conn)?;
        for p in parameter_rows {
            parameters
                .entry(p.product_info_id)
                .or_default()
                .push(OfferParameter {
                    name: p.name,
                    value: p.value,
                });
        }
    }

    Ok(rows
        .into_iter()
        .map(|rows| {
            let params = parameters.remove(&rows.0.id).unwrap_or_default();
            offer_from_rows(rows, params)
        })
        .collect())
}

fn find_open(conn: &mut PgConnection, user_id: i64) -> Result<Option<OrderRecord>, DomainError> {
    orders::table
        .filter(orders::user_id.eq(user_id))
        .filter(orders::state.eq(OrderState::Open.as_str()))
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?
        .map(OrderRecord::try_from)
        .transpose()
}

/// Reads the order's state under a shared row lock. Item edits hold it until
/// they commit, and placement takes the row exclusively, so the two never
/// interleave.
fn order_state_for_share(
    conn: &mut PgConnection,
    order_id: i64,
) -> Result<Option<OrderState>, DomainError> {
    let state: Option<String> = orders::table
        .find(order_id)
        .select(orders::state)
        .for_share()
        .first(conn)
        .optional()?;
    state.as_deref().map(str::parse::<OrderState>).transpose()
}

fn lock_open_order(conn: &mut PgConnection, order_id: i64) -> Result<bool, DomainError> {
    Ok(order_state_for_share(conn, order_id)?.is_some_and(|state| state.can_modify_items()))
}

fn load_snapshots(
    conn: &mut PgConnection,
    order_rows: Vec<OrderRow>,
) -> Result<Vec<OrderSnapshot>, DomainError> {
    let ids: Vec<i64> = order_rows.iter().map(|o| o.id).collect();
    let rows: Vec<(OrderItemRow, ProductInfoRow, ShopRow, ProductRow)> = if ids.is_empty() {
        Vec::new()
    } else {
        order_items::table
            .inner_join(
                product_infos::table
                    .inner_join(shops::table)
                    .inner_join(products::table),
            )
            .filter(order_items::order_id.eq_any(&ids))
            .order(order_items::id.asc())
            .select((
                OrderItemRow::as_select(),
                ProductInfoRow::as_select(),
                ShopRow::as_select(),
                ProductRow::as_select(),
            ))
            .load(conn)?
    };

    let (items, offer_rows): (Vec<OrderItemRow>, Vec<OfferRows>) = rows
        .into_iter()
        .map(|(item, info, shop, product)| (item, (info, shop, product)))
        .unzip();
    let offers = into_offers(conn, offer_rows)?;

    let mut by_order: HashMap<i64, Vec<ResolvedLineItem>> = HashMap::new();
    for (item, offer) in items.into_iter().zip(offers) {
        by_order
            .entry(item.order_id)
            .or_default()
            .push(ResolvedLineItem {
                id: item.id,
                quantity: item.quantity,
                offer,
            });
    }

    order_rows
        .into_iter()
        .map(|row| {
            let items = by_order.remove(&row.id).unwrap_or_default();
            Ok(OrderSnapshot {
                order: OrderRecord::try_from(row)?,
                items,
            })
        })
        .collect()
}

// ── Store ─────────────────────────────────────────────────────────────────────

pub struct DieselStore {
    pool: DbPool,
}

impl DieselStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogReader for DieselStore {
    fn lookup(&self, offer_id: i64) -> Result<CatalogOffer, DomainError> {
        let mut conn = self.pool.get()?;

        let row = product_infos::table
            .inner_join(shops::table)
            .inner_join(products::table)
            .filter(product_infos::id.eq(offer_id))
            .filter(shops::state.eq(true))
            .select((
                ProductInfoRow::as_select(),
                ShopRow::as_select(),
                ProductRow::as_select(),
            ))
            .first::<OfferRows>(&mut conn)
            .optional()?
            .ok_or(DomainError::OfferNotFound(offer_id))?;

        into_offers(&mut conn, vec![row])?
            .pop()
            .ok_or(DomainError::OfferNotFound(offer_id))
    }

    fn list_offers(&self, filter: &OfferFilter) -> Result<Vec<CatalogOffer>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = product_infos::table
            .inner_join(shops::table)
            .inner_join(products::table)
            .filter(shops::state.eq(true))
            .select((
                ProductInfoRow::as_select(),
                ShopRow::as_select(),
                ProductRow::as_select(),
            ))
            .order(product_infos::id.asc())
            .into_boxed();
        if let Some(shop_id) = filter.shop_id {
            query = query.filter(product_infos::shop_id.eq(shop_id));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(products::category_id.eq(category_id));
        }

        let mut rows: Vec<OfferRows> = query.load(&mut conn)?;
        rows.dedup_by_key(|(info, _, _)| info.id);
        into_offers(&mut conn, rows)
    }

    fn list_active_shops(&self) -> Result<Vec<Shop>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = shops::table
            .filter(shops::state.eq(true))
            .order(shops::name.asc())
            .select(ShopRow::as_select())
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|s| Shop {
                id: s.id,
                name: s.name,
                active: s.state,
            })
            .collect())
    }
}

impl LineItemStore for DieselStore {
    fn insert_item(
        &self,
        order_id: i64,
        offer_id: i64,
        quantity: Quantity,
    ) -> Result<LineItem, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            match order_state_for_share(conn, order_id)? {
                Some(state) if state.can_modify_items() => {}
                Some(_) => return Err(DomainError::InvalidState),
                None => return Err(DomainError::NotAuthorized),
            }

            let row = diesel::insert_into(order_items::table)
                .values(&NewOrderItemRow {
                    order_id,
                    product_info_id: offer_id,
                    quantity: quantity.get(),
                })
                .returning(OrderItemRow::as_returning())
                .get_result(conn)
                .map_err(|e| match DomainError::from(e) {
                    DomainError::Conflict(_) => DomainError::Conflict(format!(
                        "offer {offer_id} is already in order {order_id}"
                    )),
                    other => other,
                })?;

            Ok(LineItem {
                id: row.id,
                order_id: row.order_id,
                offer_id: row.product_info_id,
                quantity: row.quantity,
            })
        })
    }

    fn set_quantity(
        &self,
        order_id: i64,
        item_id: i64,
        quantity: Quantity,
    ) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            if !lock_open_order(conn, order_id)? {
                return Ok(0);
            }
            Ok(diesel::update(
                order_items::table
                    .filter(order_items::id.eq(item_id))
                    .filter(order_items::order_id.eq(order_id)),
            )
            .set(order_items::quantity.eq(quantity.get()))
            .execute(conn)?)
        })
    }

    fn remove_items(&self, order_id: i64, item_ids: &[i64]) -> Result<usize, DomainError> {
        if item_ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            if !lock_open_order(conn, order_id)? {
                return Ok(0);
            }
            Ok(diesel::delete(
                order_items::table
                    .filter(order_items::id.eq_any(item_ids))
                    .filter(order_items::order_id.eq(order_id)),
            )
            .execute(conn)?)
        })
    }
}

impl OrderRepository for DieselStore {
    fn get_or_create_open_basket(&self, user_id: i64) -> Result<OrderRecord, DomainError> {
        let mut conn = self.pool.get()?;

        for attempt in 1..=BASKET_ATTEMPTS {
            if let Some(order) = find_open(&mut conn, user_id)? {
                return Ok(order);
            }

            // The partial unique index on (user_id) WHERE state = 'open'
            // turns a concurrent duplicate into a no-op instead of a second row.
            let created = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    user_id,
                    state: OrderState::Open.as_str(),
                })
                .on_conflict_do_nothing()
                .returning(OrderRow::as_returning())
                .get_result(&mut conn)
                .optional()?;

            if let Some(row) = created {
                info!("Opened basket {} for user {}", row.id, user_id);
                return OrderRecord::try_from(row);
            }
            debug!(
                "Basket insert for user {} lost a race (attempt {})",
                user_id, attempt
            );
        }

        Err(DomainError::Conflict(format!(
            "could not obtain a basket for user {user_id}"
        )))
    }

    fn find_open_basket(&self, user_id: i64) -> Result<Option<OrderRecord>, DomainError> {
        let mut conn = self.pool.get()?;
        find_open(&mut conn, user_id)
    }

    fn snapshot(&self, order_id: i64) -> Result<Option<OrderSnapshot>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order = orders::table
                .find(order_id)
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?;

            let Some(order) = order else {
                return Ok(None);
            };

            Ok(load_snapshots(conn, vec![order])?.pop())
        })
    }

    fn list_placed(&self, viewer: Viewer) -> Result<Vec<OrderSnapshot>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut query = orders::table
                .filter(orders::state.ne(OrderState::Open.as_str()))
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::id.desc()))
                .into_boxed();

            query = match viewer {
                Viewer::Buyer(user_id) => query.filter(orders::user_id.eq(user_id)),
                Viewer::Supplier(user_id) => query.filter(
                    orders::id.eq_any(
                        order_items::table
                            .inner_join(product_infos::table.inner_join(shops::table))
                            .filter(shops::user_id.eq(user_id))
                            .select(order_items::order_id),
                    ),
                ),
            };

            let rows = query.load(conn)?;
            load_snapshots(conn, rows)
        })
    }

    fn place(
        &self,
        order_id: i64,
        user_id: i64,
        contact_id: i64,
    ) -> Result<OrderPlaced, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Preconditions, checked centrally. The row lock waits out
            //    in-flight item edits and blocks new ones until commit.
            let order = orders::table
                .find(order_id)
                .select(OrderRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotAuthorized)?;
            let order = OrderRecord::try_from(order)?;

            let item_count: i64 = order_items::table
                .filter(order_items::order_id.eq(order_id))
                .count()
                .get_result(conn)?;
            let item_count = usize::try_from(item_count).unwrap_or(0);
            lifecycle::ensure_can_place(&order, user_id, item_count)?;

            let contact_owned: bool = diesel::select(exists(
                contacts::table
                    .filter(contacts::id.eq(contact_id))
                    .filter(contacts::user_id.eq(user_id)),
            ))
            .get_result(conn)?;
            if !contact_owned {
                return Err(DomainError::Validation(format!(
                    "contact {contact_id} does not belong to the caller"
                )));
            }

            // 2. Compare-and-swap on state; the loser of a race matches no row.
            let updated = diesel::update(
                orders::table
                    .filter(orders::id.eq(order_id))
                    .filter(orders::user_id.eq(user_id))
                    .filter(orders::state.eq(OrderState::Open.as_str()))
                    .filter(exists(
                        order_items::table.filter(order_items::order_id.eq(order_id)),
                    )),
            )
            .set((
                orders::state.eq(OrderState::Placed.as_str()),
                orders::contact_id.eq(contact_id),
                orders::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;
            lifecycle::confirm_transition(updated)?;

            // 3. Outbox event in the same transaction.
            //    The CDC relay derives the Kafka topic from `aggregate_type`.
            let event = OrderPlaced {
                order_id,
                user_id,
                contact_id,
            };
            diesel::insert_into(order_outbox::table)
                .values(&NewOutboxEventRow {
                    id: Uuid::new_v4(),
                    aggregate_type: AGGREGATE_TYPE.to_string(),
                    aggregate_id: order_id.to_string(),
                    event_type: OrderPlaced::EVENT_TYPE.to_string(),
                    payload: event.payload(),
                })
                .execute(conn)?;

            Ok(event)
        })
    }
}
