use serde::{Deserialize, Serialize};

use super::provider_user::ProviderUser;

/// The minimal identity shown in the UI for the signed-in user.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl SessionUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        SessionUser {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Project a provider record down to the session identity.
    ///
    /// The name is the first non-empty display name among the linked
    /// identities; without one, the email stands in for it.
    pub fn from_provider_user(user: &ProviderUser) -> Self {
        let name = user
            .display_name()
            .map(str::to_string)
            .unwrap_or_else(|| user.email.clone());

        SessionUser {
            id: user.uid.clone(),
            name,
            email: user.email.clone(),
        }
    }
}
