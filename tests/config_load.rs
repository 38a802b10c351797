//! `EngineConfig::load` against a working directory without a `.env` file.
//!
//! Kept in its own test binary because it changes the process working
//! directory.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use trading_engine::config::EngineConfig;

fn empty_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("trading-engine-no-env-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn load_without_env_file_uses_defaults() {
    let dir = empty_dir();
    assert!(!dir.join(".env").exists());
    std::env::set_current_dir(&dir).unwrap();

    let config = EngineConfig::load();

    assert_eq!(config, EngineConfig::default());
    std::fs::remove_dir(&dir).unwrap();
}
