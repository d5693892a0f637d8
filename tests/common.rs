#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use findusers::config::{extract_config, ConfigV1};
use findusers::startup::build_state;
use findusers::state::AppState;

pub fn load_test_config(yaml: &str) -> ConfigV1 {
    extract_config(&Figment::new().merge(Yaml::string(yaml)))
        .expect("Failed to parse test config YAML")
}

pub fn build_app(config: ConfigV1) -> AppState {
    build_state(Arc::new(config)).expect("failed to build session state")
}

/// A fresh, not yet existing session file under the system temp dir.
pub fn temp_session_file() -> PathBuf {
    std::env::temp_dir()
        .join(format!("find-users-it-{}", uuid::Uuid::new_v4()))
        .join("session.json")
}
