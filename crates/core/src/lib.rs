//! Core types and trait seams for the dashboard voice assistant
//!
//! This crate provides the foundational pieces used across the workspace:
//! - Trait seams for the platform collaborators (speech engine, storage,
//!   project directory)
//! - Transcript and conversation message types
//! - Locale definitions and speech-language mapping (PT/EN/FR)
//! - Project and client domain types
//! - Error types

pub mod conversation;
pub mod error;
pub mod language;
pub mod project;
pub mod traits;
pub mod transcript;

pub use conversation::{ConversationMessage, Sender};
pub use error::{Error, Result};
pub use language::{
    base_language, determine_speech_language, map_to_speech_lang, select_best_voice,
    DetectOptions, LanguageDetection, LanguageDetector, LanguageSource, Locale, SpeechLangChoice,
    VoiceInfo,
};
pub use project::{Client, Project, ProjectStatus};
pub use transcript::Transcript;

pub use traits::{
    DirectoryPort, FormField, MemoryStore, SpeechAdapter, TranscriptStream,
};
