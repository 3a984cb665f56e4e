/// The role of a user.
pub enum Role {
    Admin,
    Member,
}
