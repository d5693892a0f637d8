//! Library exports for find-users, shared between the binary and tests.

pub mod config;
pub mod error;
pub mod models;
pub mod persistence;
pub mod providers;
pub mod startup;
pub mod state;
pub mod stores;
pub mod utils;
