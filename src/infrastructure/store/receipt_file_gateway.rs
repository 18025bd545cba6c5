use std::{fs, path::PathBuf};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::{debug, warn};

use crate::domain::{
    errors::StoreError,
    repositories::store_gateway::StoreGateway,
    value_objects::{catalog::CatalogResult, plans::ProductId},
};

/// Store gateway for hosts without a platform purchase sheet. It exposes a
/// receipt read from disk and reports the catalog and purchases as
/// unavailable, so prices stay on their compiled-in defaults.
pub struct ReceiptFileGateway {
    receipt_path: Option<PathBuf>,
}

impl ReceiptFileGateway {
    pub fn new(receipt_path: Option<PathBuf>) -> Self {
        Self { receipt_path }
    }
}

#[async_trait]
impl StoreGateway for ReceiptFileGateway {
    async fn purchase(&self, product_id: &ProductId) -> Result<(), StoreError> {
        warn!(%product_id, "receipt_file_gateway: purchase requested without a platform store");
        Err(StoreError::Unavailable(
            "purchases need a platform store".to_string(),
        ))
    }

    async fn fetch_catalog(&self, product_ids: &[ProductId]) -> Result<CatalogResult, StoreError> {
        debug!(
            product_count = product_ids.len(),
            "receipt_file_gateway: catalog not available"
        );
        Err(StoreError::Unavailable(
            "catalog needs a platform store".to_string(),
        ))
    }

    fn receipt(&self) -> Option<String> {
        let path = self.receipt_path.as_ref()?;
        match fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => Some(STANDARD.encode(bytes)),
            Ok(_) => None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "receipt_file_gateway: receipt unreadable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn receipt_is_base64_of_file_contents() {
        let path = std::env::temp_dir().join(format!("receipt-{}", Uuid::new_v4()));
        fs::write(&path, b"receipt-bytes").unwrap();

        let gateway = ReceiptFileGateway::new(Some(path.clone()));
        assert_eq!(gateway.receipt().as_deref(), Some("cmVjZWlwdC1ieXRlcw=="));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_receipt_is_none() {
        assert_eq!(ReceiptFileGateway::new(None).receipt(), None);

        let gateway = ReceiptFileGateway::new(Some(PathBuf::from("/nonexistent/receipt")));
        assert_eq!(gateway.receipt(), None);
    }

    #[tokio::test]
    async fn catalog_is_unavailable() {
        let gateway = ReceiptFileGateway::new(None);
        let result = gateway.fetch_catalog(&[ProductId::new("x")]).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
