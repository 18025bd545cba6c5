pub mod account_client;
pub mod credential_store;
pub mod one_time_actions;
pub mod price_cache;
pub mod purchase;
pub mod subscription_resolver;
