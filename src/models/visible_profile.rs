use serde::{Deserialize, Serialize};

/// The user-editable profile shown to other users.
///
/// Distinct from the provider record: it is owned by the profile-edit flows
/// and persisted by the application database, not by the identity provider.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VisibleProfile {
    pub name: String,
    pub profession: String,
    pub country: String,
    pub email: String,
    #[serde(default)]
    pub opened_to_work: bool,
    /// A picture picked locally and not yet uploaded.
    #[serde(skip)]
    pub profile_picture: Option<ProfilePicture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

/// A local binary file reference for a profile picture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePicture {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl VisibleProfile {
    /// True when a picture was picked but has no hosted URL yet.
    pub fn has_pending_picture(&self) -> bool {
        self.profile_picture.is_some() && self.profile_picture_url.is_none()
    }
}
