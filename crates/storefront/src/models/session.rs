//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use harbor_shop_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// The signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// The signed-in user's profile, if it could be loaded.
    pub const PROFILE: &str = "profile";

    /// The visitor's cart. Independent of sign-in state.
    pub const CART: &str = "cart";

    /// Queued toast notices.
    pub const NOTICES: &str = "notices";
}
