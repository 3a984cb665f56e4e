/// A postal address.
#[embeddable]
pub struct Address {
    /// The street.
    pub street: String,
}
