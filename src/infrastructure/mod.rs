pub mod http;
pub mod storage;
pub mod store;
pub mod vpn;
