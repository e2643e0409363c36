//! Notifications published on the event bus after account operations succeed.

use crate::account::LinkKind;

/// A login completed and a session is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedIn {
    pub player_id: String,
    pub newly_created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNameChanged {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmailUpdated {
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountLinked {
    pub kind: LinkKind,
}
