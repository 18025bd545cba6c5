use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OneTimeFlag {
    WelcomeScreen,
    NotificationAuthorizationRequestPopup,
    OneHundredTrackingAttemptsBlockedNotification,
    NewEnableNotificationsController,
}

impl OneTimeFlag {
    /// Storage key. Stable across releases; do not rename.
    pub fn key(&self) -> &'static str {
        match self {
            OneTimeFlag::WelcomeScreen => "LockdownHasSeenWelcomePopup",
            OneTimeFlag::NotificationAuthorizationRequestPopup => {
                "LockdownHasSeenNotificationAuthorizationRequestPopup"
            }
            OneTimeFlag::OneHundredTrackingAttemptsBlockedNotification => {
                "LockdownHasScheduledOneHundredTrackingAttemptsBlockedNotification"
            }
            OneTimeFlag::NewEnableNotificationsController => {
                "LockdownHasSeenNewEnableNotificationsController"
            }
        }
    }
}
