pub mod address;
pub mod group;
pub mod role;
pub mod user;
