//! Trait seams for platform collaborators
//!
//! The assistant core never touches raw audio, real storage, or the REST
//! layer; it consumes these contracts.

pub mod directory;
pub mod speech;
pub mod storage;

pub use directory::{DirectoryPort, FormField};
pub use speech::{SpeechAdapter, TranscriptStream};
pub use storage::MemoryStore;
