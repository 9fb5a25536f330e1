use bigdecimal::BigDecimal;

#[derive(Debug, Clone, PartialEq)]
pub struct OfferParameter {
    pub name: String,
    pub value: String,
}

/// A purchasable (shop, product) pairing as seen by the basket engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogOffer {
    pub id: i64,
    pub shop_id: i64,
    pub shop_name: String,
    pub shop_active: bool,
    /// Account that manages the shop, if any.
    pub shop_owner: Option<i64>,
    pub product_id: i64,
    pub product_name: String,
    pub category_id: i64,
    pub model: String,
    pub unit_price: BigDecimal,
    pub price_rrc: BigDecimal,
    pub available: i32,
    pub parameters: Vec<OfferParameter>,
}

impl CatalogOffer {
    /// Offers from deactivated shops stay visible inside existing orders but
    /// cannot be added to a basket.
    pub fn is_purchasable(&self) -> bool {
        self.shop_active
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferFilter {
    pub shop_id: Option<i64>,
    pub category_id: Option<i64>,
}

impl OfferFilter {
    pub fn matches(&self, offer: &CatalogOffer) -> bool {
        offer.shop_active
            && self.shop_id.is_none_or(|id| id == offer.shop_id)
            && self.category_id.is_none_or(|id| id == offer.category_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shop {
    pub id: i64,
    pub name: String,
    pub active: bool,
}
