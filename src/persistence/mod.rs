pub mod base;
pub mod file_persistence;
pub mod memory_persistence;
pub mod no_persistence;

// Re-export the primary items so code outside can do
// "use crate::persistence::{SessionPersistence, create_persistence};"
pub use base::{create_persistence, SessionPersistence};
