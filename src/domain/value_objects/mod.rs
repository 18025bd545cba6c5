pub mod catalog;
pub mod currency;
pub mod enums;
pub mod plans;
pub mod subscription_status;
