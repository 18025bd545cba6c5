pub mod api_error_codes;
pub mod one_time_flags;
pub mod plan_types;
pub mod price_contexts;
pub mod subscription_sources;
