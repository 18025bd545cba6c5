pub mod account_api;
pub mod device_keys;
pub mod key_value_store;
pub mod session_cookies;
pub mod store_gateway;
