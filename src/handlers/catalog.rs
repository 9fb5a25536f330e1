use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::application::basket_service::BasketService;
use crate::domain::catalog::OfferFilter;
use crate::errors::AppError;

use super::views::{OfferResponse, ShopResponse};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OfferQuery {
    /// Only offers from this shop.
    pub shop_id: Option<i64>,
    /// Only offers whose product is in this category.
    pub category_id: Option<i64>,
}

/// GET /products
///
/// Offers from active shops, each listed once.
#[utoipa::path(
    get,
    path = "/products",
    params(OfferQuery),
    responses(
        (status = 200, description = "Matching offers", body = Vec<OfferResponse>),
    ),
    tag = "catalog"
)]
pub async fn list_offers(
    service: web::Data<BasketService>,
    query: web::Query<OfferQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let filter = OfferFilter {
        shop_id: query.shop_id,
        category_id: query.category_id,
    };

    let offers = web::block(move || service.list_offers(&filter)).await??;

    Ok(HttpResponse::Ok().json(
        offers
            .into_iter()
            .map(OfferResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /shops
#[utoipa::path(
    get,
    path = "/shops",
    responses(
        (status = 200, description = "Active shops", body = Vec<ShopResponse>),
    ),
    tag = "catalog"
)]
pub async fn list_shops(service: web::Data<BasketService>) -> Result<HttpResponse, AppError> {
    let shops = web::block(move || service.list_shops()).await??;

    Ok(HttpResponse::Ok().json(
        shops
            .into_iter()
            .map(ShopResponse::from)
            .collect::<Vec<_>>(),
    ))
}
