/// A group of users.
pub struct Group {
    /// The group name.
    pub name: String,
}
