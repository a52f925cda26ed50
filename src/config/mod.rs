//! Configuration of the process-wide log gate.
//!
//! This module provides serde-backed settings that can be loaded from a JSON
//! file or the environment and applied to a `LogGate`.

pub mod settings;

pub use settings::{GateSettings, LOG_LEVEL_ENV, SettingsError, get_config_path};
