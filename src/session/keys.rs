//! Session store key schema
//!
//! Every key written by this crate is produced here, so the prefix layout
//! is a typed contract instead of a naming convention callers must respect.

/// Key in the external session store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKey {
    /// Refresh-token slot - `auth:refresh:{user_id}`
    ///
    /// Exactly one live slot per user; overwritten on login and refresh.
    RefreshSlot { user_id: i32 },

    /// Access-token revocation entry - `auth:denylist:{token}`
    ///
    /// Keyed by the literal token string; expiry delegated to the store's
    /// native TTL.
    Denylist { token: String },
}

impl SessionKey {
    /// Render the store key string
    #[must_use]
    pub fn build(&self) -> String {
        match self {
            Self::RefreshSlot { user_id } => format!("auth:refresh:{user_id}"),
            Self::Denylist { token } => format!("auth:denylist:{token}"),
        }
    }

    /// Namespace prefix of this key family
    #[must_use]
    pub const fn namespace(&self) -> &'static str {
        match self {
            Self::RefreshSlot { .. } => "auth:refresh",
            Self::Denylist { .. } => "auth:denylist",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_slot_key() {
        let key = SessionKey::RefreshSlot { user_id: 42 };
        assert_eq!(key.build(), "auth:refresh:42");
        assert_eq!(key.namespace(), "auth:refresh");
    }

    #[test]
    fn test_denylist_key_embeds_literal_token() {
        let key = SessionKey::Denylist {
            token: "eyJhbGciOi.something.sig".to_string(),
        };
        assert_eq!(key.build(), "auth:denylist:eyJhbGciOi.something.sig");
        assert_eq!(key.namespace(), "auth:denylist");
    }
}
