use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::application::basket_service::BasketService;
use crate::domain::batch::{id_list_text, BatchReport, BatchSummary, ItemOutcome};
use crate::domain::caller::Caller;
use crate::errors::AppError;

use super::views::{order_responses, OrderResponse};
use super::MISSING_ARGUMENTS;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchRequest {
    /// JSON array of entries, or a string holding a JSON-encoded array.
    /// Adding takes `{"product_info": <offer id>, "quantity": n}` entries,
    /// updating takes `{"id": <item id>, "quantity": n}` entries.
    #[schema(value_type = Option<Object>)]
    pub items: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveItemsRequest {
    /// Line item ids, either comma separated ("1,2,3") or as an array
    /// (`["1", "2", 3]`).
    #[schema(value_type = Option<Object>)]
    pub items: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddItemsResponse {
    pub status: bool,
    pub objects_created: usize,
    /// One of `complete`, `partial`, `failed`, `empty`.
    #[schema(value_type = String)]
    pub result: BatchSummary,
    /// Per-entry outcome, in request order.
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<ItemOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateItemsResponse {
    pub status: bool,
    pub objects_updated: usize,
    #[schema(value_type = String)]
    pub result: BatchSummary,
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<ItemOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveItemsResponse {
    pub status: bool,
    pub objects_deleted: usize,
}

fn non_blank(value: Option<Value>) -> Option<Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /basket
///
/// Returns the caller's basket with resolved items and the current total,
/// as a list holding zero or one basket.
#[utoipa::path(
    get,
    path = "/basket",
    responses(
        (status = 200, description = "Current basket", body = Vec<OrderResponse>),
        (status = 403, description = "Log in required"),
    ),
    tag = "basket"
)]
pub async fn get_basket(
    service: web::Data<BasketService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let basket = web::block(move || service.get_basket(&caller)).await??;

    Ok(HttpResponse::Ok().json(order_responses(basket.into_iter().collect())))
}

/// POST /basket
///
/// Adds entries to the caller's basket, creating the basket on first use.
/// Entries are applied one by one; rejected entries are reported without
/// undoing the others. An undecodable batch changes nothing and answers 200
/// with a warning.
#[utoipa::path(
    post,
    path = "/basket",
    request_body = BatchRequest,
    responses(
        (status = 201, description = "Batch processed", body = AddItemsResponse),
        (status = 200, description = "Batch could not be decoded; nothing changed", body = AddItemsResponse),
        (status = 400, description = "items missing"),
        (status = 403, description = "Log in required"),
    ),
    tag = "basket"
)]
pub async fn add_items(
    service: web::Data<BasketService>,
    caller: Caller,
    body: web::Json<BatchRequest>,
) -> Result<HttpResponse, AppError> {
    let items = non_blank(body.into_inner().items)
        .ok_or_else(|| AppError::BadRequest(MISSING_ARGUMENTS.to_string()))?;

    let report: BatchReport = web::block(move || service.add_items(&caller, &items)).await??;

    // Nothing is created for an undecodable batch.
    let mut response = if report.malformed.is_some() {
        HttpResponse::Ok()
    } else {
        HttpResponse::Created()
    };
    Ok(response.json(AddItemsResponse {
        status: true,
        objects_created: report.applied_count(),
        result: report.summary(),
        items: report.outcomes,
        warning: report.malformed,
    }))
}

/// PUT /basket
///
/// Overwrites quantities of items already in the caller's basket. Items that
/// are not in the basket are reported as not updated.
#[utoipa::path(
    put,
    path = "/basket",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "Batch processed", body = UpdateItemsResponse),
        (status = 400, description = "items missing"),
        (status = 403, description = "Log in required"),
    ),
    tag = "basket"
)]
pub async fn update_items(
    service: web::Data<BasketService>,
    caller: Caller,
    body: web::Json<BatchRequest>,
) -> Result<HttpResponse, AppError> {
    let items = non_blank(body.into_inner().items)
        .ok_or_else(|| AppError::BadRequest(MISSING_ARGUMENTS.to_string()))?;

    let report = web::block(move || service.update_quantities(&caller, &items)).await??;

    Ok(HttpResponse::Ok().json(UpdateItemsResponse {
        status: true,
        objects_updated: report.applied_count(),
        result: report.summary(),
        items: report.outcomes,
        warning: report.malformed,
    }))
}

/// DELETE /basket
#[utoipa::path(
    delete,
    path = "/basket",
    request_body = RemoveItemsRequest,
    responses(
        (status = 200, description = "Items removed", body = RemoveItemsResponse),
        (status = 400, description = "No numeric ids given"),
        (status = 403, description = "Log in required"),
    ),
    tag = "basket"
)]
pub async fn remove_items(
    service: web::Data<BasketService>,
    caller: Caller,
    body: web::Json<RemoveItemsRequest>,
) -> Result<HttpResponse, AppError> {
    let items = non_blank(body.into_inner().items)
        .ok_or_else(|| AppError::BadRequest(MISSING_ARGUMENTS.to_string()))?;
    let items = id_list_text(&items).ok_or_else(|| {
        AppError::BadRequest("items must be a comma separated list or an array of ids".into())
    })?;

    let removed = web::block(move || service.remove_items(&caller, &items)).await??;

    Ok(HttpResponse::Ok().json(RemoveItemsResponse {
        status: true,
        objects_deleted: removed,
    }))
}
