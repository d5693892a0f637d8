pub mod navigation_store;
pub mod profile_store;
pub mod session_store;

pub use navigation_store::NavigationStore;
pub use profile_store::{ProfileStore, VisibleProfileClearPolicy};
pub use session_store::SessionStore;
