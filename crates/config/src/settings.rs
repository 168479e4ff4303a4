//! Assistant settings
//!
//! Tunables for the session driver and matchers, layered from an optional
//! file plus `DECO_VOICE_` environment variables over the defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use deco_voice_core::Locale;

use crate::ConfigError;

/// Runtime settings for one assistant installation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Interface locale
    pub language: Locale,
    /// Run language detection on outgoing speech
    pub auto_detect_language: bool,
    /// Minimum detection confidence before trusting a detected language
    pub confidence_threshold: f32,
    /// Preferred region for ambiguous base languages ("BR", "GB")
    pub preferred_region: Option<String>,
    /// Silence duration after the last partial result that finalizes a
    /// transcript
    pub silence_timeout_ms: u64,
    /// Buffer between synthesis completion and re-opening the microphone,
    /// letting the audio channel settle
    pub listen_settle_ms: u64,
    /// Delay between the spoken acknowledgement and invoking the
    /// create-project action
    pub ack_delay_ms: u64,
    /// Fuzzy threshold for the multilingual command trigger tables
    pub command_threshold: f64,
    /// Session message log cap (oldest dropped first)
    pub max_session_messages: usize,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            language: Locale::Pt,
            auto_detect_language: true,
            confidence_threshold: 0.5,
            preferred_region: None,
            silence_timeout_ms: 1000,
            listen_settle_ms: 300,
            ack_delay_ms: 500,
            command_threshold: 0.75,
            max_session_messages: 50,
        }
    }
}

impl AssistantSettings {
    /// Validate value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "confidence_threshold".into(),
                message: "must be within [0, 1]".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.command_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "command_threshold".into(),
                message: "must be within [0, 1]".into(),
            });
        }
        if self.max_session_messages == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_session_messages".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Load settings from an optional file plus environment overrides.
///
/// File format is inferred by the `config` crate from the extension
/// (TOML/JSON). Environment variables use the `DECO_VOICE_` prefix, e.g.
/// `DECO_VOICE_SILENCE_TIMEOUT_MS=1500`.
pub fn load_settings(path: Option<&Path>) -> Result<AssistantSettings, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        builder = builder.add_source(config::File::from(path));
    }

    builder = builder.add_source(config::Environment::with_prefix("DECO_VOICE"));

    let settings: AssistantSettings = match builder.build() {
        Ok(cfg) => {
            let mut settings = AssistantSettings::default();
            // Partial files/env only override the fields they name.
            if let Ok(loaded) = cfg.clone().try_deserialize::<AssistantSettings>() {
                settings = loaded;
            } else {
                apply_overrides(&mut settings, &cfg);
            }
            settings
        }
        Err(e) => return Err(e.into()),
    };

    settings.validate()?;
    tracing::debug!(language = %settings.language, "assistant settings loaded");
    Ok(settings)
}

fn apply_overrides(settings: &mut AssistantSettings, cfg: &config::Config) {
    if let Ok(v) = cfg.get_string("language") {
        if let Some(locale) = Locale::from_str_loose(&v) {
            settings.language = locale;
        }
    }
    if let Ok(v) = cfg.get_bool("auto_detect_language") {
        settings.auto_detect_language = v;
    }
    if let Ok(v) = cfg.get_float("confidence_threshold") {
        settings.confidence_threshold = v as f32;
    }
    if let Ok(v) = cfg.get_string("preferred_region") {
        settings.preferred_region = Some(v);
    }
    // negative durations/caps are rejected rather than wrapped
    if let Ok(Ok(v)) = cfg.get_int("silence_timeout_ms").map(u64::try_from) {
        settings.silence_timeout_ms = v;
    }
    if let Ok(Ok(v)) = cfg.get_int("listen_settle_ms").map(u64::try_from) {
        settings.listen_settle_ms = v;
    }
    if let Ok(Ok(v)) = cfg.get_int("ack_delay_ms").map(u64::try_from) {
        settings.ack_delay_ms = v;
    }
    if let Ok(v) = cfg.get_float("command_threshold") {
        settings.command_threshold = v;
    }
    if let Ok(Ok(v)) = cfg.get_int("max_session_messages").map(usize::try_from) {
        settings.max_session_messages = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let s = AssistantSettings::default();
        assert_eq!(s.language, Locale::Pt);
        assert_eq!(s.silence_timeout_ms, 1000);
        assert_eq!(s.confidence_threshold, 0.5);
        assert_eq!(s.command_threshold, 0.75);
        assert_eq!(s.max_session_messages, 50);
        s.validate().unwrap();
    }

    #[test]
    fn test_validate_bad_threshold() {
        let s = AssistantSettings {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "language = \"en\"\nsilence_timeout_ms = 1500\nauto_detect_language = false"
        )
        .unwrap();

        let s = load_settings(Some(file.path())).unwrap();
        assert_eq!(s.language, Locale::En);
        assert_eq!(s.silence_timeout_ms, 1500);
        assert!(!s.auto_detect_language);
        // untouched fields keep their defaults
        assert_eq!(s.ack_delay_ms, 500);
    }

    #[test]
    fn test_negative_duration_is_ignored() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "language = \"en\"\nsilence_timeout_ms = -1").unwrap();

        let s = load_settings(Some(file.path())).unwrap();
        // the valid field applies; the negative duration keeps its default
        assert_eq!(s.language, Locale::En);
        assert_eq!(s.silence_timeout_ms, 1000);
    }

    #[test]
    fn test_missing_file() {
        let err = load_settings(Some(Path::new("/nonexistent/deco-voice.toml")));
        assert!(matches!(err, Err(ConfigError::FileNotFound(_))));
    }
}
