//! Async voice session driver
//!
//! Executes the effects emitted by the [`Orchestrator`] against the speech
//! adapter and dashboard port, and feeds completions back as events. This is
//! the only place in the workspace that spawns tasks or sleeps.
//!
//! Every spawned task carries the generation counter captured when it was
//! created; closing the session (or reopening it) bumps the counter, so a
//! speech callback from a previous life of the session finds itself stale
//! and drops its event instead of injecting it into the new one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use deco_voice_config::{AssistantSettings, CommandTables, GreetingTemplates, WizardPrompts};
use deco_voice_core::{
    determine_speech_language, map_to_speech_lang, DetectOptions, DirectoryPort, LanguageDetector,
    MemoryStore, Sender, SpeechAdapter,
};

use crate::context::analyze_dashboard_context;
use crate::matcher::CommandMatcher;
use crate::memory::{ConversationMemory, MemoryLimits};
use crate::orchestrator::{Effect, Lifecycle, Mode, Orchestrator, OrchestratorEvent};
use crate::suggestions::SuggestionEngine;
use crate::wizard::WizardMachine;

/// One voice session over one speech channel.
///
/// Cheap to clone; all clones drive the same session.
#[derive(Clone)]
pub struct VoiceSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    settings: AssistantSettings,
    prompts: WizardPrompts,
    orchestrator: Mutex<Orchestrator>,
    memory: Arc<ConversationMemory>,
    speech: Arc<dyn SpeechAdapter>,
    directory: Arc<dyn DirectoryPort>,
    engine: SuggestionEngine,
    detector: LanguageDetector,
    /// Cancellation token for spawned speech callbacks
    generation: AtomicU64,
}

impl VoiceSession {
    /// Build a session with default command tables, prompts and greetings.
    pub fn new(
        settings: AssistantSettings,
        speech: Arc<dyn SpeechAdapter>,
        directory: Arc<dyn DirectoryPort>,
        store: Arc<dyn MemoryStore>,
    ) -> Self {
        Self::with_tables(
            settings,
            CommandTables::default(),
            WizardPrompts::default(),
            GreetingTemplates::default(),
            speech,
            directory,
            store,
        )
    }

    /// Build a session with deployment-supplied phrase tables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_tables(
        settings: AssistantSettings,
        commands: CommandTables,
        prompts: WizardPrompts,
        greetings: GreetingTemplates,
        speech: Arc<dyn SpeechAdapter>,
        directory: Arc<dyn DirectoryPort>,
        store: Arc<dyn MemoryStore>,
    ) -> Self {
        let matcher = CommandMatcher::new(&commands, settings.command_threshold);
        let ack = prompts.for_locale(settings.language).command_ack.clone();
        let limits = MemoryLimits {
            max_messages: settings.max_session_messages,
            ..MemoryLimits::default()
        };
        let memory = Arc::new(ConversationMemory::new(store, limits));

        Self {
            inner: Arc::new(SessionInner {
                settings,
                prompts,
                orchestrator: Mutex::new(Orchestrator::new(matcher, ack)),
                memory,
                speech,
                directory,
                engine: SuggestionEngine::new(greetings),
                detector: LanguageDetector::new(),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Open the session: greet from the current dashboard context, then
    /// auto-listen for global commands.
    pub fn open_assistant(&self) {
        let inner = &self.inner;
        let projects = inner.directory.projects();
        let context = analyze_dashboard_context(&projects, chrono::Utc::now());
        let greeting = inner
            .engine
            .generate_smart_greeting(&context, inner.settings.language);

        let generation = inner.bump_generation();
        info!(language = %inner.settings.language, "voice session opened");
        let effects = inner.orchestrator.lock().open(greeting);
        inner.run_effects(effects, generation);
    }

    /// Close the session. In-flight speech callbacks become stale and are
    /// dropped.
    pub fn close_assistant(&self) {
        let inner = &self.inner;
        let generation = inner.bump_generation();
        info!("voice session closed");
        let effects = inner.orchestrator.lock().close();
        inner.run_effects(effects, generation);
    }

    /// Hand the channel to a fresh form wizard over the current client list.
    pub fn start_wizard(&self) {
        let inner = &self.inner;
        let prompts = inner.prompts.for_locale(inner.settings.language).clone();
        let wizard = WizardMachine::new(prompts, inner.directory.clients());

        let generation = inner.generation.load(Ordering::SeqCst);
        let effects = inner.orchestrator.lock().register_wizard(wizard);
        inner.run_effects(effects, generation);
    }

    /// Abandon the wizard and return to global command mode.
    pub fn cancel_wizard(&self) {
        let inner = &self.inner;
        let generation = inner.generation.load(Ordering::SeqCst);
        let effects = inner.orchestrator.lock().unregister_wizard();
        inner.run_effects(effects, generation);
    }

    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.inner.memory
    }

    pub fn suggestions(&self) -> &SuggestionEngine {
        &self.inner.engine
    }

    pub fn mode(&self) -> Mode {
        self.inner.orchestrator.lock().mode()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.orchestrator.lock().lifecycle()
    }

    pub fn is_open(&self) -> bool {
        self.inner.orchestrator.lock().is_open()
    }
}

impl SessionInner {
    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Feed an event back into the orchestrator unless it comes from a
    /// previous session generation.
    fn dispatch(self: &Arc<Self>, event: OrchestratorEvent, generation: u64) {
        if !self.is_current(generation) {
            debug!(?event, "stale speech callback, dropping");
            return;
        }
        let effects = self.orchestrator.lock().handle(event);
        self.run_effects(effects, generation);
    }

    /// Execute effects in order. Speech and timers run on spawned tasks;
    /// everything else applies immediately.
    fn run_effects(self: &Arc<Self>, effects: Vec<Effect>, generation: u64) {
        for effect in effects {
            match effect {
                Effect::Speak(text) => {
                    let inner = Arc::clone(self);
                    tokio::spawn(async move {
                        inner.speak_task(text, generation).await;
                    });
                }
                Effect::StartListening => {
                    let inner = Arc::clone(self);
                    tokio::spawn(async move {
                        inner.listen_task(generation).await;
                    });
                }
                Effect::StopListening => self.speech.stop_listening(),
                Effect::CancelSpeech => self.speech.cancel_speech(),
                Effect::ScheduleAck => {
                    let inner = Arc::clone(self);
                    let delay = Duration::from_millis(inner.settings.ack_delay_ms);
                    tokio::spawn(async move {
                        sleep(delay).await;
                        inner.dispatch(OrchestratorEvent::AckElapsed, generation);
                    });
                }
                Effect::InvokeCreateProject => self.directory.create_project(),
                Effect::SetField(field, value) => self.directory.update_field(field, &value),
                Effect::RequestClientCreate(name) => self.directory.add_client(&name),
                Effect::SubmitNext => self.directory.submit_next(),
                Effect::RecordUserMessage(text) => {
                    self.memory.add_message(Sender::User, text);
                }
                Effect::RecordAssistantMessage(text) => {
                    self.memory.add_message(Sender::Assistant, text);
                }
            }
        }
    }

    fn interface_tag(&self) -> &'static str {
        map_to_speech_lang(
            self.settings.language.code(),
            self.settings.preferred_region.as_deref(),
        )
    }

    /// Speak one utterance in its resolved language, then report completion.
    async fn speak_task(self: Arc<Self>, text: String, generation: u64) {
        let opts = DetectOptions {
            auto_detect: self.settings.auto_detect_language,
            confidence_threshold: self.settings.confidence_threshold,
            preferred_region: self.settings.preferred_region.clone(),
        };
        let choice = determine_speech_language(
            &text,
            self.settings.language.code(),
            |t, fallback| self.detector.detect(t, fallback),
            &opts,
        );

        let mut result = self.speech.speak(&text, &choice.speech_lang).await;
        if result.is_err() && choice.speech_lang != self.interface_tag() {
            // detected voice unavailable; retry once in the interface language
            warn!(
                lang = %choice.speech_lang,
                "synthesis failed, retrying in interface language"
            );
            result = self.speech.speak(&text, self.interface_tag()).await;
        }

        let event = match result {
            Ok(()) => OrchestratorEvent::SynthesisComplete,
            Err(e) => OrchestratorEvent::SynthesisFailed(e.to_string()),
        };
        self.dispatch(event, generation);
    }

    /// Open the microphone after the settle buffer and fold the transcript
    /// stream into one final text.
    ///
    /// A silence gap after the last partial finalizes the utterance even if
    /// the engine never marks a result final.
    async fn listen_task(self: Arc<Self>, generation: u64) {
        sleep(Duration::from_millis(self.settings.listen_settle_ms)).await;
        if !self.is_current(generation) {
            return;
        }

        let mut stream = match self.speech.start_listening(self.interface_tag()).await {
            Ok(stream) => stream,
            Err(e) => {
                self.dispatch(OrchestratorEvent::RecognitionFailed(e.to_string()), generation);
                return;
            }
        };

        let silence = Duration::from_millis(self.settings.silence_timeout_ms);
        let mut last_text = String::new();

        loop {
            tokio::select! {
                item = stream.next() => match item {
                    Some(transcript) => {
                        if transcript.has_text() {
                            last_text = transcript.text.clone();
                        }
                        if transcript.is_final {
                            break;
                        }
                    }
                    None => break,
                },
                _ = sleep(silence) => {
                    // user stopped talking; treat the last partial as final
                    self.speech.stop_listening();
                    break;
                }
            }
        }

        if !last_text.trim().is_empty() {
            self.dispatch(OrchestratorEvent::FinalTranscript(last_text), generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deco_voice_core::{Client, Error, FormField, Project, Result, Transcript, TranscriptStream};
    use std::collections::VecDeque;
    use std::time::Instant;

    use crate::store::InMemoryStore;
    use async_trait::async_trait;

    /// Speech adapter that replays scripted listening windows and records
    /// everything spoken.
    struct ScriptedSpeech {
        spoken: Mutex<Vec<String>>,
        windows: Mutex<VecDeque<Vec<Transcript>>>,
    }

    impl ScriptedSpeech {
        fn new(windows: Vec<Vec<Transcript>>) -> Self {
            Self {
                spoken: Mutex::new(Vec::new()),
                windows: Mutex::new(windows.into()),
            }
        }

        fn spoken(&self) -> Vec<String> {
            self.spoken.lock().clone()
        }
    }

    #[async_trait]
    impl SpeechAdapter for ScriptedSpeech {
        async fn speak(&self, text: &str, _lang: &str) -> Result<()> {
            self.spoken.lock().push(text.to_string());
            Ok(())
        }

        fn cancel_speech(&self) {}

        async fn start_listening(&self, _lang: &str) -> Result<TranscriptStream> {
            let window = self
                .windows
                .lock()
                .pop_front()
                .ok_or_else(|| Error::Recognition("no scripted window left".into()))?;
            Ok(Box::pin(futures::stream::iter(window)))
        }

        fn stop_listening(&self) {}
    }

    #[derive(Default)]
    struct RecordingDirectory {
        clients: Vec<Client>,
        projects: Vec<Project>,
        fields: Mutex<Vec<(FormField, String)>>,
        created: Mutex<usize>,
        submitted: Mutex<usize>,
    }

    impl DirectoryPort for RecordingDirectory {
        fn clients(&self) -> Vec<Client> {
            self.clients.clone()
        }

        fn projects(&self) -> Vec<Project> {
            self.projects.clone()
        }

        fn update_field(&self, field: FormField, value: &str) {
            self.fields.lock().push((field, value.to_string()));
        }

        fn add_client(&self, _name: &str) {}

        fn submit_next(&self) {
            *self.submitted.lock() += 1;
        }

        fn create_project(&self) {
            *self.created.lock() += 1;
        }
    }

    fn fast_settings() -> AssistantSettings {
        AssistantSettings {
            language: deco_voice_core::Locale::En,
            listen_settle_ms: 10,
            ack_delay_ms: 10,
            silence_timeout_ms: 50,
            ..Default::default()
        }
    }

    async fn wait_until(deadline_ms: u64, mut check: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_millis(deadline_ms);
        while Instant::now() < deadline {
            if check() {
                return true;
            }
            sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_global_command_invokes_create_project() {
        let speech = Arc::new(ScriptedSpeech::new(vec![vec![
            Transcript::partial("create"),
            Transcript::partial("create a new project"),
            // stream ends without a final flag; the driver folds the last partial
        ]]));
        let directory = Arc::new(RecordingDirectory::default());
        let session = VoiceSession::new(
            fast_settings(),
            speech.clone(),
            directory.clone(),
            Arc::new(InMemoryStore::new()),
        );

        session.open_assistant();

        let created = wait_until(2000, || *directory.created.lock() == 1).await;
        assert!(created, "create_project was not invoked");

        // greeting first, then the acknowledgement
        let spoken = speech.spoken();
        assert_eq!(spoken.len(), 2);
        assert!(spoken[0].starts_with("Good"));
        assert!(spoken[1].contains("project"));

        // both sides of the exchange recorded in session memory
        let messages = session.memory().messages();
        assert!(messages
            .iter()
            .any(|m| m.sender == Sender::User && m.text == "create a new project"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unmatched_speech_does_not_trigger() {
        let speech = Arc::new(ScriptedSpeech::new(vec![
            vec![Transcript::fin("lovely weather today")],
            vec![], // re-opened window stays empty
        ]));
        let directory = Arc::new(RecordingDirectory::default());
        let session = VoiceSession::new(
            fast_settings(),
            speech.clone(),
            directory.clone(),
            Arc::new(InMemoryStore::new()),
        );

        session.open_assistant();

        let recorded = wait_until(2000, || {
            session
                .memory()
                .messages()
                .iter()
                .any(|m| m.sender == Sender::User)
        })
        .await;
        assert!(recorded);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(*directory.created.lock(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_close_makes_pending_callbacks_stale() {
        let speech = Arc::new(ScriptedSpeech::new(vec![vec![Transcript::fin(
            "create a new project",
        )]]));
        let directory = Arc::new(RecordingDirectory::default());
        let session = VoiceSession::new(
            fast_settings(),
            speech.clone(),
            directory.clone(),
            Arc::new(InMemoryStore::new()),
        );

        session.open_assistant();
        // close before the greeting's completion callback can land
        session.close_assistant();

        sleep(Duration::from_millis(200)).await;
        assert!(!session.is_open());
        assert_eq!(*directory.created.lock(), 0);
        // only the greeting was ever spoken
        assert!(speech.spoken().len() <= 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_wizard_flow_through_session() {
        let windows = vec![
            vec![Transcript::fin("Terrace Project")],
            vec![Transcript::fin("acme")],
            vec![Transcript::fin("tomorrow")],
            vec![Transcript::fin("5000")],
            vec![Transcript::fin("continue")],
        ];
        let speech = Arc::new(ScriptedSpeech::new(windows));
        let directory = Arc::new(RecordingDirectory {
            clients: vec![Client::new("c1", "Acme Corp")],
            ..Default::default()
        });
        let session = VoiceSession::new(
            fast_settings(),
            speech.clone(),
            directory.clone(),
            Arc::new(InMemoryStore::new()),
        );

        // open without the global listening race: go straight to the wizard
        session.open_assistant();
        session.start_wizard();

        let submitted = wait_until(5000, || *directory.submitted.lock() == 1).await;
        assert!(submitted, "wizard never submitted");

        let fields = directory.fields.lock().clone();
        assert!(fields.contains(&(FormField::Name, "Terrace Project".to_string())));
        assert!(fields.contains(&(FormField::ClientId, "c1".to_string())));
        assert!(fields.contains(&(FormField::ClientName, "Acme Corp".to_string())));
        assert!(fields.contains(&(FormField::Budget, "5000".to_string())));
        assert_eq!(session.mode(), Mode::Global);
    }
}
