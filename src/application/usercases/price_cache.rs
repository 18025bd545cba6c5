use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::{
    entities::prices::PriceEntry,
    errors::FormatError,
    repositories::{key_value_store::KeyValueStore, store_gateway::StoreGateway},
    value_objects::{
        catalog::CatalogProduct,
        currency::format_currency,
        enums::{plan_types::PlanType, price_contexts::PriceContext},
        plans::{ProductId, all_product_ids},
    },
};

pub const INVALID_PRICE: &str = "Invalid Price";
pub const INVALID_UPGRADE_PRICE: &str = "Invalid Upgrade Price";

/// Compiled-in prices shown until the store has answered at least once.
fn default_price(plan: PlanType, context: PriceContext) -> Option<&'static str> {
    let price = match (plan, context) {
        (PlanType::AdvancedMonthly, _) => "$4.99/month",
        (PlanType::AdvancedYearly, PriceContext::New) => "then $35.99/year",
        (PlanType::AdvancedYearly, PriceContext::Upgrade) => "$29.99/year",
        (PlanType::Monthly, PriceContext::New) => "$8.99/month",
        (PlanType::Monthly, PriceContext::Upgrade) => "$8.99 per month",
        (PlanType::Annual, PriceContext::New) => "then $59.99 per year",
        (PlanType::Annual, PriceContext::Upgrade) => "$59.99/year (~$4.17/month)",
        (PlanType::ProMonthly, PriceContext::New) => "$11.99/month",
        (PlanType::ProMonthly, PriceContext::Upgrade) => "$11.99 per month",
        (PlanType::ProAnnual, PriceContext::New) => "then $99.99 per year",
        (PlanType::ProAnnual, PriceContext::Upgrade) => "$99.99/year (~$8.33/month)",
        (PlanType::Unsupported, _) => return None,
    };
    Some(price)
}

fn default_for(product_id: &ProductId, context: PriceContext) -> String {
    product_id
        .plan_type()
        .and_then(|plan| default_price(plan, context))
        .map(str::to_string)
        .unwrap_or_else(|| match context {
            PriceContext::New => INVALID_PRICE.to_string(),
            PriceContext::Upgrade => INVALID_UPGRADE_PRICE.to_string(),
        })
}

fn storage_key(product_id: &ProductId, context: PriceContext) -> String {
    format!("{}{}", product_id, context.key_suffix())
}

/// `(new, upgrade)` phrasing for an annual plan, with the monthly share.
fn annual_phrasing(price: Decimal, locale: &str) -> Result<(String, String), FormatError> {
    let yearly = format_currency(price, locale)?;
    let per_month = price
        .checked_div(Decimal::from(12))
        .ok_or_else(|| FormatError::OutOfRange(price.to_string()))?;
    let monthly = format_currency(per_month, locale)?;

    Ok((
        format!("{yearly}/year after (~{monthly}/month)"),
        format!("{yearly}/year (~{monthly}/month)"),
    ))
}

/// Localized price strings per product, persisted in the key-value store and
/// refreshed from the platform catalog.
pub struct PriceCache<K, G>
where
    K: KeyValueStore + 'static,
    G: StoreGateway + 'static,
{
    store: Arc<K>,
    store_gateway: Arc<G>,
    refresh_lock: tokio::sync::Mutex<()>,
    entry_lock: Mutex<()>,
}

impl<K, G> PriceCache<K, G>
where
    K: KeyValueStore + 'static,
    G: StoreGateway + 'static,
{
    pub fn new(store: Arc<K>, store_gateway: Arc<G>) -> Self {
        Self {
            store,
            store_gateway,
            refresh_lock: tokio::sync::Mutex::new(()),
            entry_lock: Mutex::new(()),
        }
    }

    pub fn get(&self, product_id: &ProductId, context: PriceContext) -> String {
        let _guard = self.entry_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read(product_id, context)
    }

    pub fn entry(&self, product_id: &ProductId) -> PriceEntry {
        let _guard = self.entry_lock.lock().unwrap_or_else(PoisonError::into_inner);
        PriceEntry {
            product_id: product_id.clone(),
            display_price: self.read(product_id, PriceContext::New),
            upgrade_price: self.read(product_id, PriceContext::Upgrade),
        }
    }

    pub fn entries(&self) -> Vec<PriceEntry> {
        all_product_ids()
            .iter()
            .map(|product_id| self.entry(product_id))
            .collect()
    }

    /// One catalog round trip for every known product. Never fails; a failed
    /// catalog call leaves the cache untouched.
    pub async fn refresh(&self) {
        let _refresh = self.refresh_lock.lock().await;

        let product_ids = all_product_ids();
        let catalog = match self.store_gateway.fetch_catalog(&product_ids).await {
            Ok(catalog) => catalog,
            Err(err) => {
                error!(error = %err, "price_cache: failed to fetch catalog");
                return;
            }
        };

        for invalid in &catalog.invalid_ids {
            warn!(product_id = %invalid, "price_cache: store reported invalid product id");
        }

        let mut updated = 0usize;
        for product in &catalog.retrieved {
            if self.apply(product) {
                updated += 1;
            }
        }

        info!(
            retrieved = catalog.retrieved.len(),
            invalid = catalog.invalid_ids.len(),
            updated,
            "price_cache: refreshed"
        );
    }

    /// Run `refresh` in the background; results show up in later reads.
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move { cache.refresh().await })
    }

    fn apply(&self, product: &CatalogProduct) -> bool {
        let product_id = &product.product_id;
        let Some(plan) = product_id.plan_type() else {
            warn!(%product_id, "price_cache: unknown product in catalog");
            return false;
        };
        let Some(formatted) = product.formatted_price.as_deref() else {
            warn!(%product_id, "price_cache: store returned no formatted price");
            return false;
        };

        let (new_price, upgrade_price) = match plan {
            PlanType::AdvancedMonthly => (format!("{formatted}/month"), format!("{formatted}/month")),
            PlanType::AdvancedYearly => (
                format!("then {formatted} per year"),
                format!("{formatted}/year"),
            ),
            PlanType::Monthly | PlanType::ProMonthly => (
                format!("{formatted} per month after"),
                format!("{formatted} per month"),
            ),
            PlanType::Annual | PlanType::ProAnnual => {
                match annual_phrasing(product.price, &product.price_locale) {
                    Ok(phrasing) => phrasing,
                    Err(err) => {
                        warn!(
                            %product_id,
                            locale = %product.price_locale,
                            error = %err,
                            "price_cache: could not format annual price, using defaults"
                        );
                        (
                            default_for(product_id, PriceContext::New),
                            default_for(product_id, PriceContext::Upgrade),
                        )
                    }
                }
            }
            PlanType::Unsupported => return false,
        };

        self.write_pair(product_id, new_price, upgrade_price)
    }

    fn write_pair(&self, product_id: &ProductId, new_price: String, upgrade_price: String) -> bool {
        let _guard = self.entry_lock.lock().unwrap_or_else(PoisonError::into_inner);

        for (context, value) in [
            (PriceContext::New, new_price),
            (PriceContext::Upgrade, upgrade_price),
        ] {
            let key = storage_key(product_id, context);
            if let Err(err) = self.store.set(&key, Value::String(value)) {
                error!(%product_id, %context, error = ?err, "price_cache: failed to persist price");
                return false;
            }
        }

        debug!(%product_id, "price_cache: prices updated");
        true
    }

    fn read(&self, product_id: &ProductId, context: PriceContext) -> String {
        self.store
            .get_string(&storage_key(product_id, context))
            .unwrap_or_else(|| default_for(product_id, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            errors::StoreError,
            repositories::store_gateway::MockStoreGateway,
            value_objects::catalog::CatalogResult,
        },
        infrastructure::storage::memory_store::MemoryStore,
    };

    fn product(plan: PlanType, price: Decimal, formatted: Option<&str>) -> CatalogProduct {
        CatalogProduct {
            product_id: plan.product_id().unwrap(),
            price_locale: "en_US@currency=USD".to_string(),
            price,
            formatted_price: formatted.map(str::to_string),
        }
    }

    fn cache_with_catalog(
        catalog: Result<CatalogResult, StoreError>,
    ) -> (Arc<MemoryStore>, PriceCache<MemoryStore, MockStoreGateway>) {
        let mut gateway = MockStoreGateway::new();
        gateway
            .expect_fetch_catalog()
            .withf(|ids| ids.len() == 6)
            .times(1)
            .returning(move |_| catalog.clone());
        let store = Arc::new(MemoryStore::new());
        let cache = PriceCache::new(Arc::clone(&store), Arc::new(gateway));
        (store, cache)
    }

    fn id(plan: PlanType) -> ProductId {
        plan.product_id().unwrap()
    }

    #[test]
    fn defaults_before_any_refresh() {
        let cache = PriceCache::new(Arc::new(MemoryStore::new()), Arc::new(MockStoreGateway::new()));

        assert_eq!(
            cache.get(&id(PlanType::Annual), PriceContext::New),
            "then $59.99 per year"
        );
        assert_eq!(
            cache.get(&id(PlanType::ProAnnual), PriceContext::Upgrade),
            "$99.99/year (~$8.33/month)"
        );
        assert_eq!(
            cache.get(&ProductId::new("SomethingElse"), PriceContext::New),
            INVALID_PRICE
        );
        assert_eq!(
            cache.get(&ProductId::new("SomethingElse"), PriceContext::Upgrade),
            INVALID_UPGRADE_PRICE
        );
        assert_eq!(cache.entries().len(), 6);
    }

    #[tokio::test]
    async fn annual_price_is_phrased_with_monthly_share() {
        let (_, cache) = cache_with_catalog(Ok(CatalogResult {
            retrieved: vec![product(PlanType::Annual, Decimal::new(5999, 2), Some("$59.99"))],
            invalid_ids: Default::default(),
        }));

        cache.refresh().await;

        let entry = cache.entry(&id(PlanType::Annual));
        assert_eq!(entry.display_price, "$59.99/year after (~$5.00/month)");
        assert_eq!(entry.upgrade_price, "$59.99/year (~$5.00/month)");
    }

    #[tokio::test]
    async fn each_plan_family_has_its_own_phrasing() {
        let (_, cache) = cache_with_catalog(Ok(CatalogResult {
            retrieved: vec![
                product(PlanType::AdvancedMonthly, Decimal::new(499, 2), Some("$4.99")),
                product(PlanType::AdvancedYearly, Decimal::new(3599, 2), Some("$35.99")),
                product(PlanType::ProMonthly, Decimal::new(1199, 2), Some("$11.99")),
            ],
            invalid_ids: Default::default(),
        }));

        cache.refresh().await;

        let advanced_monthly = cache.entry(&id(PlanType::AdvancedMonthly));
        assert_eq!(advanced_monthly.display_price, "$4.99/month");
        assert_eq!(advanced_monthly.upgrade_price, "$4.99/month");

        let advanced_yearly = cache.entry(&id(PlanType::AdvancedYearly));
        assert_eq!(advanced_yearly.display_price, "then $35.99 per year");
        assert_eq!(advanced_yearly.upgrade_price, "$35.99/year");

        let pro_monthly = cache.entry(&id(PlanType::ProMonthly));
        assert_eq!(pro_monthly.display_price, "$11.99 per month after");
        assert_eq!(pro_monthly.upgrade_price, "$11.99 per month");
    }

    #[tokio::test]
    async fn missing_formatted_price_leaves_only_that_product_alone() {
        let (store, cache) = cache_with_catalog(Ok(CatalogResult {
            retrieved: vec![
                product(PlanType::Monthly, Decimal::new(899, 2), None),
                product(PlanType::ProMonthly, Decimal::new(1299, 2), Some("$12.99")),
            ],
            invalid_ids: Default::default(),
        }));
        store
            .set("LockdowniOSVpnMonthlyPrice", Value::String("cached".to_string()))
            .unwrap();

        cache.refresh().await;

        assert_eq!(cache.get(&id(PlanType::Monthly), PriceContext::New), "cached");
        assert_eq!(
            cache.get(&id(PlanType::Monthly), PriceContext::Upgrade),
            "$8.99 per month"
        );
        assert_eq!(
            cache.get(&id(PlanType::ProMonthly), PriceContext::New),
            "$12.99 per month after"
        );
    }

    #[tokio::test]
    async fn unformattable_annual_price_falls_back_to_defaults() {
        let mut annual = product(PlanType::ProAnnual, Decimal::new(9999, 2), Some("XTS 99.99"));
        annual.price_locale = "en_US@currency=XTS".to_string();
        let (store, cache) = cache_with_catalog(Ok(CatalogResult {
            retrieved: vec![annual],
            invalid_ids: Default::default(),
        }));

        cache.refresh().await;

        assert_eq!(
            store.get_string("LockdowniOSVpnAnnualProPrice").as_deref(),
            Some("then $99.99 per year")
        );
        assert_eq!(
            store.get_string("LockdowniOSVpnAnnualProUpgradePrice").as_deref(),
            Some("$99.99/year (~$8.33/month)")
        );
    }

    #[tokio::test]
    async fn annual_price_uses_store_currency() {
        let mut annual = product(PlanType::Annual, Decimal::new(5999, 2), Some("€59.99"));
        annual.price_locale = "en_US@currency=EUR".to_string();
        let (_, cache) = cache_with_catalog(Ok(CatalogResult {
            retrieved: vec![annual],
            invalid_ids: Default::default(),
        }));

        cache.refresh().await;

        assert_eq!(
            cache.get(&id(PlanType::Annual), PriceContext::Upgrade),
            "€59.99/year (~€5.00/month)"
        );
    }

    #[tokio::test]
    async fn failed_catalog_writes_nothing() {
        let (store, cache) =
            cache_with_catalog(Err(StoreError::Unavailable("offline".to_string())));

        cache.refresh().await;

        assert!(store.is_empty());
        assert_eq!(
            cache.get(&id(PlanType::Annual), PriceContext::Upgrade),
            "$59.99/year (~$4.17/month)"
        );
    }

    #[tokio::test]
    async fn spawned_refresh_is_observed_by_later_reads() {
        let (_, cache) = cache_with_catalog(Ok(CatalogResult {
            retrieved: vec![product(PlanType::Monthly, Decimal::new(999, 2), Some("$9.99"))],
            invalid_ids: [ProductId::new("LockdowniOSRetired")].into_iter().collect(),
        }));
        let cache = Arc::new(cache);

        cache.spawn_refresh().await.unwrap();

        assert_eq!(
            cache.get(&id(PlanType::Monthly), PriceContext::New),
            "$9.99 per month after"
        );
    }
}
