//! Dual-mode session orchestrator
//!
//! Owns the single speech channel's state: which mode the session is in
//! (GLOBAL command spotting or WIZARD form filling) and where the speech
//! lifecycle stands (idle, speaking, listening). Like the wizard, this is a
//! pure `(state, event) -> effects` dispatcher; the async driver in
//! [`crate::session`] executes the effects and reports completions back.
//!
//! Mode is checked inside the event handler, not at delivery: an event that
//! raced a mode switch is dropped here rather than misrouted.

use tracing::{debug, warn};

use deco_voice_core::FormField;

use crate::matcher::CommandMatcher;
use crate::wizard::{WizardEffect, WizardEvent, WizardMachine, WizardState};

/// Which interaction loop owns the speech channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Global,
    Wizard,
}

/// Speech channel lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Speaking,
    Listening,
}

/// Events reported by the session driver
#[derive(Debug, Clone)]
pub enum OrchestratorEvent {
    /// The current utterance finished playing
    SynthesisComplete,
    /// Synthesis failed; the session continues as if it had completed
    SynthesisFailed(String),
    /// Final transcript from the recognizer
    FinalTranscript(String),
    /// Recognition failed or the stream ended abnormally
    RecognitionFailed(String),
    /// The post-acknowledgement delay elapsed
    AckElapsed,
}

/// Side effects for the driver to execute, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Speak(String),
    StartListening,
    StopListening,
    CancelSpeech,
    /// Start the acknowledgement timer; fires back `AckElapsed`
    ScheduleAck,
    /// Open the dashboard's create-project flow
    InvokeCreateProject,
    SetField(FormField, String),
    RequestClientCreate(String),
    SubmitNext,
    RecordUserMessage(String),
    RecordAssistantMessage(String),
}

/// The session's dispatch core. Not thread-safe by itself; the driver holds
/// it behind a mutex.
pub struct Orchestrator {
    mode: Mode,
    lifecycle: Lifecycle,
    is_open: bool,
    matcher: CommandMatcher,
    ack: String,
    wizard: Option<WizardMachine>,
}

impl Orchestrator {
    pub fn new(matcher: CommandMatcher, ack: impl Into<String>) -> Self {
        Self {
            mode: Mode::Global,
            lifecycle: Lifecycle::Idle,
            is_open: false,
            matcher,
            ack: ack.into(),
            wizard: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Open the session: speak the greeting, then auto-listen on completion.
    pub fn open(&mut self, greeting: impl Into<String>) -> Vec<Effect> {
        let greeting = greeting.into();
        self.is_open = true;
        self.mode = Mode::Global;
        self.lifecycle = Lifecycle::Speaking;
        vec![
            Effect::RecordAssistantMessage(greeting.clone()),
            Effect::Speak(greeting),
        ]
    }

    /// Close the session and silence the channel. Late events are dropped by
    /// the `is_open` check in `handle`.
    pub fn close(&mut self) -> Vec<Effect> {
        self.is_open = false;
        self.mode = Mode::Global;
        self.lifecycle = Lifecycle::Idle;
        self.wizard = None;
        vec![Effect::StopListening, Effect::CancelSpeech]
    }

    /// Hand the channel to a wizard. Any transcript captured before the
    /// hand-over is discarded so it cannot leak into the form.
    pub fn register_wizard(&mut self, wizard: WizardMachine) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.lifecycle == Lifecycle::Listening {
            effects.push(Effect::StopListening);
        }
        self.mode = Mode::Wizard;
        self.wizard = Some(wizard);
        let wizard_effects = self.feed_wizard(WizardEvent::Start);
        effects.extend(wizard_effects);
        effects
    }

    /// Return the channel to global mode, dropping any wizard in flight.
    pub fn unregister_wizard(&mut self) -> Vec<Effect> {
        self.wizard = None;
        self.mode = Mode::Global;
        let effects = if self.lifecycle == Lifecycle::Listening {
            vec![Effect::StopListening]
        } else {
            vec![]
        };
        self.lifecycle = Lifecycle::Idle;
        effects
    }

    pub fn handle(&mut self, event: OrchestratorEvent) -> Vec<Effect> {
        if !self.is_open {
            debug!(?event, "session closed, dropping event");
            return vec![];
        }

        match event {
            OrchestratorEvent::SynthesisComplete => self.on_synthesis_complete(),
            OrchestratorEvent::SynthesisFailed(reason) => {
                warn!(reason, "synthesis failed, continuing as if completed");
                self.on_synthesis_complete()
            }
            OrchestratorEvent::FinalTranscript(text) => self.on_final_transcript(text),
            OrchestratorEvent::RecognitionFailed(reason) => {
                warn!(reason, "recognition failed, going idle");
                self.lifecycle = Lifecycle::Idle;
                vec![]
            }
            OrchestratorEvent::AckElapsed => {
                if self.mode == Mode::Global {
                    vec![Effect::InvokeCreateProject]
                } else {
                    vec![]
                }
            }
        }
    }

    fn on_synthesis_complete(&mut self) -> Vec<Effect> {
        match self.mode {
            Mode::Global => {
                // auto-listen after every global utterance
                self.lifecycle = Lifecycle::Listening;
                vec![Effect::StartListening]
            }
            Mode::Wizard => self.feed_wizard(WizardEvent::SynthesisComplete),
        }
    }

    fn on_final_transcript(&mut self, text: String) -> Vec<Effect> {
        if text.trim().is_empty() {
            return vec![];
        }
        if self.lifecycle != Lifecycle::Listening {
            debug!(text, "transcript outside listening window, discarding");
            return vec![];
        }

        match self.mode {
            Mode::Global => {
                if self.matcher.matches_create_project(&text) {
                    self.lifecycle = Lifecycle::Speaking;
                    vec![
                        Effect::RecordUserMessage(text),
                        Effect::StopListening,
                        Effect::Speak(self.ack.clone()),
                        Effect::ScheduleAck,
                    ]
                } else {
                    // not a command; keep the window open
                    vec![Effect::RecordUserMessage(text), Effect::StartListening]
                }
            }
            Mode::Wizard => {
                let mut effects = vec![Effect::RecordUserMessage(text.clone())];
                effects.extend(self.feed_wizard(WizardEvent::Transcript(text)));
                effects
            }
        }
    }

    /// Forward an event to the wizard, translate its effects, and revert to
    /// global mode once it finishes.
    fn feed_wizard(&mut self, event: WizardEvent) -> Vec<Effect> {
        let Some(wizard) = self.wizard.as_mut() else {
            debug!("no wizard registered, dropping wizard event");
            return vec![];
        };

        let wizard_effects = wizard.handle(event);
        let finished = wizard.state() == WizardState::Finished;

        let mut effects = Vec::with_capacity(wizard_effects.len() + 1);
        for effect in wizard_effects {
            match effect {
                WizardEffect::Speak(text) => {
                    self.lifecycle = Lifecycle::Speaking;
                    effects.push(Effect::RecordAssistantMessage(text.clone()));
                    effects.push(Effect::Speak(text));
                }
                WizardEffect::Listen => {
                    self.lifecycle = Lifecycle::Listening;
                    effects.push(Effect::StartListening);
                }
                WizardEffect::SetField(field, value) => {
                    effects.push(Effect::SetField(field, value));
                }
                WizardEffect::RequestClientCreate(name) => {
                    effects.push(Effect::RequestClientCreate(name));
                }
                WizardEffect::Submit => effects.push(Effect::SubmitNext),
            }
        }

        if finished {
            self.wizard = None;
            self.mode = Mode::Global;
            self.lifecycle = Lifecycle::Idle;
        }
        effects
    }
}
