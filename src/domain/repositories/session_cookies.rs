/// Shared HTTP session owned by the network layer.
#[cfg_attr(test, mockall::automock)]
pub trait SessionCookies: Send + Sync {
    fn clear_cookies(&self);
}
