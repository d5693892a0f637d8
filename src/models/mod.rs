pub mod provider_user;
pub mod session_user;
pub mod visible_profile;

// Re-export the record types so code outside can do "use crate::models::*;"
pub use provider_user::{ProviderIdentity, ProviderUser, TokenInfo};
pub use session_user::SessionUser;
pub use visible_profile::{ProfilePicture, VisibleProfile};
