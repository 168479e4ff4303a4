//! Speech engine contract
//!
//! One speech channel (recognition + synthesis) exists per session; the
//! session driver is responsible for never holding both directions at once.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::transcript::Transcript;
use crate::Result;

/// Stream of partial/final recognition results
pub type TranscriptStream = Pin<Box<dyn Stream<Item = Transcript> + Send>>;

/// Platform speech capability (STT + TTS)
///
/// # Example
///
/// ```ignore
/// let adapter: Arc<dyn SpeechAdapter> = Arc::new(PlatformSpeech::new());
/// adapter.speak("Bom dia!", "pt-PT").await?;
/// let mut transcripts = adapter.start_listening("pt-PT").await?;
/// ```
#[async_trait]
pub trait SpeechAdapter: Send + Sync + 'static {
    /// Synthesize and play `text` in the given language tag.
    ///
    /// Resolves when playback completes. A `Synthesis` error means the
    /// primary voice path failed; callers fall back per the error design.
    async fn speak(&self, text: &str, lang: &str) -> Result<()>;

    /// Cancel any in-flight synthesis. Safe to call when nothing is playing.
    fn cancel_speech(&self);

    /// Start recognition in the given language tag.
    ///
    /// Returns a stream of transcripts: zero or more partial results, the
    /// stream ending when recognition stops. The silence timeout that turns
    /// the last partial into a final transcript lives in the session driver,
    /// not here.
    async fn start_listening(&self, lang: &str) -> Result<TranscriptStream>;

    /// Stop recognition, ending the transcript stream. Safe to call when
    /// nothing is listening.
    fn stop_listening(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SilentSpeech;

    #[async_trait]
    impl SpeechAdapter for SilentSpeech {
        async fn speak(&self, _text: &str, _lang: &str) -> Result<()> {
            Ok(())
        }

        fn cancel_speech(&self) {}

        async fn start_listening(&self, _lang: &str) -> Result<TranscriptStream> {
            Ok(Box::pin(futures::stream::empty()))
        }

        fn stop_listening(&self) {}
    }

    #[tokio::test]
    async fn test_adapter_object_safety() {
        let adapter: Box<dyn SpeechAdapter> = Box::new(SilentSpeech);
        adapter.speak("hello", "en-US").await.unwrap();
        let _ = adapter.start_listening("en-US").await.unwrap();
        adapter.stop_listening();
        adapter.cancel_speech();
    }
}
