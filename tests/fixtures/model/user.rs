use super::address::Address;
use super::group::Group;
use super::role::Role;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A user being able to log-in.
///
/// Users belong to groups.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The username.
    #[not_empty]
    pub username: String,

    /// The role.
    #[not_null]
    pub role: Role,

    /// The home address.
    pub address: Address,

    /// The groups of the user.
    pub member_groups: Vec<Group>,

    /// The main group.
    #[column(nullable = false)]
    pub main_group: Group,

    /// The avatar image.
    #[column(length = 2048)]
    #[size(max = 500)]
    pub avatar: Vec<u8>,

    /// The number of failed logins.
    #[min(0)]
    #[max(10)]
    pub failed_logins: i32,

    pub created: DateTime<Utc>,
}

impl User {
    /// The name shown to other users.
    pub fn get_display_name(&self) -> String {
        self.username.clone()
    }
}
