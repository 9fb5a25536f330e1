//! Response bodies shared by several handlers.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::catalog::{CatalogOffer, Shop};
use crate::domain::order::{OrderSnapshot, ResolvedLineItem};

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: bool,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: true }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParameterResponse {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OfferResponse {
    pub id: i64,
    pub shop_id: i64,
    pub shop: String,
    pub product_id: i64,
    pub product: String,
    pub category_id: i64,
    pub model: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub price_rrc: String,
    /// Units in stock.
    pub quantity: i32,
    pub parameters: Vec<ParameterResponse>,
}

impl From<CatalogOffer> for OfferResponse {
    fn from(o: CatalogOffer) -> Self {
        Self {
            id: o.id,
            shop_id: o.shop_id,
            shop: o.shop_name,
            product_id: o.product_id,
            product: o.product_name,
            category_id: o.category_id,
            model: o.model,
            price: o.unit_price.to_string(),
            price_rrc: o.price_rrc.to_string(),
            quantity: o.available,
            parameters: o
                .parameters
                .into_iter()
                .map(|p| ParameterResponse {
                    name: p.name,
                    value: p.value,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i64,
    pub quantity: i32,
    pub line_total: String,
    pub product_info: OfferResponse,
}

impl From<ResolvedLineItem> for OrderItemResponse {
    fn from(item: ResolvedLineItem) -> Self {
        Self {
            id: item.id,
            quantity: item.quantity,
            line_total: item.line_total().to_string(),
            product_info: item.offer.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub state: String,
    pub contact_id: Option<i64>,
    pub created_at: String,
    pub ordered_items: Vec<OrderItemResponse>,
    /// Sum of quantity × price over all items, computed on every read.
    pub total_sum: String,
}

impl From<OrderSnapshot> for OrderResponse {
    fn from(snapshot: OrderSnapshot) -> Self {
        let total_sum = snapshot.total_sum().to_string();
        Self {
            id: snapshot.order.id,
            state: snapshot.order.state.to_string(),
            contact_id: snapshot.order.contact_id,
            created_at: snapshot.order.created_at.to_rfc3339(),
            ordered_items: snapshot.items.into_iter().map(Into::into).collect(),
            total_sum,
        }
    }
}

pub fn order_responses(snapshots: Vec<OrderSnapshot>) -> Vec<OrderResponse> {
    snapshots.into_iter().map(Into::into).collect()
}

/// Orders as a supplier sees them: every line is listed, but `total_sum` is
/// the supplier's own share.
pub fn supplier_order_responses(
    snapshots: Vec<OrderSnapshot>,
    supplier_id: i64,
) -> Vec<OrderResponse> {
    snapshots
        .into_iter()
        .map(|snapshot| {
            let total_sum = snapshot.supplier_total(supplier_id).to_string();
            OrderResponse {
                total_sum,
                ..OrderResponse::from(snapshot)
            }
        })
        .collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopResponse {
    pub id: i64,
    pub name: String,
    pub state: bool,
}

impl From<Shop> for ShopResponse {
    fn from(s: Shop) -> Self {
        Self {
            id: s.id,
            name: s.name,
            state: s.active,
        }
    }
}
