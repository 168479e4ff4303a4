//! Configuration for the dashboard voice assistant
//!
//! Supports loading from:
//! - TOML/JSON files
//! - Environment variables (`DECO_VOICE_` prefix)
//! - Compiled-in defaults
//!
//! The per-locale command trigger tables and wizard prompts live here as
//! data, not code, so deployments can override phrasing without rebuilding.

pub mod commands;
pub mod prompts;
pub mod settings;

pub use commands::CommandTables;
pub use prompts::{GreetingTemplates, LocaleGreetings, StepPrompts, WizardPrompts};
pub use settings::{load_settings, AssistantSettings};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
