use async_trait::async_trait;

use crate::domain::{
    errors::StoreError,
    value_objects::{catalog::CatalogResult, plans::ProductId},
};

/// Platform purchase mechanism. The core never talks to payment rails directly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreGateway: Send + Sync {
    async fn purchase(&self, product_id: &ProductId) -> Result<(), StoreError>;

    async fn fetch_catalog(&self, product_ids: &[ProductId]) -> Result<CatalogResult, StoreError>;

    /// Base64 receipt for this device, if the platform has one.
    fn receipt(&self) -> Option<String>;
}
