pub mod basket;
pub mod catalog;
pub mod orders;
pub mod views;

use utoipa::OpenApi;

pub(crate) const MISSING_ARGUMENTS: &str = "All necessary arguments are not specified";

#[derive(OpenApi)]
#[openapi(
    paths(
        basket::get_basket,
        basket::add_items,
        basket::update_items,
        basket::remove_items,
        orders::list_my_orders,
        orders::place_order,
        orders::list_supplier_orders,
        catalog::list_offers,
        catalog::list_shops,
    ),
    tags(
        (name = "basket", description = "The caller's open order"),
        (name = "orders", description = "Placed orders"),
        (name = "catalog", description = "Offers from active shops"),
    )
)]
pub struct ApiDoc;
