use tracing::debug;

use crate::models::SessionUser;

/// Holds the signed-in user's minimal identity for the page session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    user: Option<SessionUser>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Replaces the current user as given. No merge, no validation.
    pub fn set_user(&mut self, user: SessionUser) {
        debug!(user_id = user.id.as_str(), "session user set");
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            debug!(user_id = user.id.as_str(), "session user cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_user_stores_value_as_given() {
        let mut store = SessionStore::new();
        assert!(store.user().is_none());

        // Garbage in, garbage out: nothing is trimmed or validated.
        let user = SessionUser::new("", "  Alice ", "not-an-email");
        store.set_user(user.clone());
        assert_eq!(store.user(), Some(&user));
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_set_user_replaces_without_merge() {
        let mut store = SessionStore::new();
        store.set_user(SessionUser::new("u1", "Alice", "a@b.com"));
        store.set_user(SessionUser::new("u2", "", ""));
        assert_eq!(store.user(), Some(&SessionUser::new("u2", "", "")));
    }

    #[test]
    fn test_logout_from_any_state() {
        let mut store = SessionStore::new();
        store.logout();
        assert!(store.user().is_none());

        store.set_user(SessionUser::new("u1", "Alice", "a@b.com"));
        store.logout();
        assert!(store.user().is_none());
        assert!(!store.is_authenticated());
    }
}
