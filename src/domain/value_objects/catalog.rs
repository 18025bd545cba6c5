use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::plans::ProductId;

/// One product as reported by the platform store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogProduct {
    pub product_id: ProductId,
    /// Locale identifier the price is expressed in, e.g. `en_US@currency=USD`.
    pub price_locale: String,
    pub price: Decimal,
    /// Store-formatted price. May be absent when the store could not localize it.
    pub formatted_price: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogResult {
    pub retrieved: Vec<CatalogProduct>,
    pub invalid_ids: BTreeSet<ProductId>,
}
