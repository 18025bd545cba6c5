use serde::{Deserialize, Serialize};

use crate::domain::value_objects::plans::ProductId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceEntry {
    pub product_id: ProductId,
    pub display_price: String,
    pub upgrade_price: String,
}
