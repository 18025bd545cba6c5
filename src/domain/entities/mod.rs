pub mod accounts;
pub mod credentials;
pub mod prices;
pub mod subscriptions;
