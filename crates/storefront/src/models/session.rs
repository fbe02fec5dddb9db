//! Session-related types.

use serde::{Deserialize, Serialize};

use bookstore_core::{CustomerId, Username};

/// The logged-in customer.
///
/// Stored in the session at login and handed explicitly to every cart and
/// checkout operation. Nothing below the route layer reads the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Customer's database ID.
    pub customer_id: CustomerId,
    /// Customer's login name.
    pub username: Username,
}

impl Identity {
    /// Create a new identity.
    #[must_use]
    pub const fn new(customer_id: CustomerId, username: Username) -> Self {
        Self {
            customer_id,
            username,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the logged-in customer.
    pub const IDENTITY: &str = "identity";
}
