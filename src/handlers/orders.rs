use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::application::basket_service::BasketService;
use crate::domain::batch::parse_id;
use crate::domain::caller::Caller;
use crate::errors::AppError;

use super::views::{order_responses, supplier_order_responses, OrderResponse, StatusResponse};
use super::MISSING_ARGUMENTS;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    /// Id of the basket to place, as a number or digit string.
    #[schema(value_type = Option<Object>)]
    pub id: Option<Value>,
    /// Id of one of the caller's delivery contacts.
    #[schema(value_type = Option<Object>)]
    pub contact: Option<Value>,
}

/// GET /orders
///
/// Orders the caller has placed, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Placed orders", body = Vec<OrderResponse>),
        (status = 403, description = "Log in required"),
    ),
    tag = "orders"
)]
pub async fn list_my_orders(
    service: web::Data<BasketService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || service.list_my_orders(&caller)).await??;

    Ok(HttpResponse::Ok().json(order_responses(orders)))
}

/// POST /orders
///
/// Places the caller's basket. Exactly one of several concurrent requests
/// for the same basket succeeds; the rest receive 409.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = StatusResponse),
        (status = 400, description = "Missing or invalid arguments, or empty basket"),
        (status = 403, description = "Log in required, or order belongs to someone else"),
        (status = 409, description = "Order is no longer open"),
    ),
    tag = "orders"
)]
pub async fn place_order(
    service: web::Data<BasketService>,
    caller: Caller,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(id), Some(contact)) = (body.id, body.contact) else {
        return Err(AppError::BadRequest(MISSING_ARGUMENTS.to_string()));
    };
    let (Some(order_id), Some(contact_id)) = (parse_id(&id), parse_id(&contact)) else {
        return Err(AppError::BadRequest(
            "id and contact must be integer ids".to_string(),
        ));
    };

    web::block(move || service.place_order(&caller, order_id, contact_id)).await??;

    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

/// GET /partner/orders
///
/// Placed orders holding at least one item sold by the caller's shop. The
/// total covers only that shop's lines.
#[utoipa::path(
    get,
    path = "/partner/orders",
    responses(
        (status = 200, description = "Orders involving the caller's shop", body = Vec<OrderResponse>),
        (status = 403, description = "Log in required, or caller is not a shop"),
    ),
    tag = "orders"
)]
pub async fn list_supplier_orders(
    service: web::Data<BasketService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || service.list_supplier_orders(&caller)).await??;

    Ok(HttpResponse::Ok().json(supplier_order_responses(orders, caller.user_id)))
}
