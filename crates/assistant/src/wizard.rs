//! Form-filling wizard state machine
//!
//! A pure state machine: `handle(event)` mutates the collected form and
//! returns effects for the session driver to execute. No speech or I/O
//! happens here, which keeps every transition unit-testable.
//!
//! The machine alternates ASK states (a prompt is being spoken) with LISTEN
//! states (a final transcript is awaited). The driver reports synthesis
//! completion and final transcripts back as events.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use deco_voice_config::StepPrompts;
use deco_voice_core::{Client, FormField};

/// Wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Idle,
    AskName,
    ListenName,
    AskClient,
    ListenClient,
    ConfirmClientCreate,
    AskDate,
    ListenDate,
    AskBudget,
    ListenBudget,
    AskConfirmation,
    ListenConfirmation,
    Finished,
}

/// Input events, reported by the session driver
#[derive(Debug, Clone)]
pub enum WizardEvent {
    /// Begin the flow from `Idle`
    Start,
    /// The prompt for the current ASK state finished playing
    SynthesisComplete,
    /// A final transcript arrived while in a LISTEN state
    Transcript(String),
}

/// Output effects for the session driver
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEffect {
    Speak(String),
    Listen,
    SetField(FormField, String),
    /// The user confirmed creating a client that was not in the directory
    RequestClientCreate(String),
    /// Advance the dashboard form to its next page
    Submit,
}

/// Affirmations accepted in CONFIRM_CLIENT_CREATE, any locale
const CLIENT_CREATE_CONFIRMATIONS: [&str; 4] = ["create", "criar", "sim", "yes"];

/// Words that advance past the final confirmation, any locale
const CONTINUE_WORDS: [&str; 4] = ["continuar", "continue", "next", "avançar"];

/// The wizard machine for one form-filling run.
pub struct WizardMachine {
    state: WizardState,
    prompts: StepPrompts,
    clients: Vec<Client>,
    collected: HashMap<FormField, String>,
    temp_client_name: Option<String>,
    selected_client_key: Option<String>,
}

impl WizardMachine {
    /// Build a machine over the current client directory snapshot.
    pub fn new(prompts: StepPrompts, clients: Vec<Client>) -> Self {
        Self {
            state: WizardState::Idle,
            prompts,
            clients,
            collected: HashMap::new(),
            temp_client_name: None,
            selected_client_key: None,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// Collected value for a field, if set.
    pub fn field(&self, field: FormField) -> Option<&str> {
        self.collected.get(&field).map(String::as_str)
    }

    /// Directory id of the matched client, if one was matched.
    pub fn selected_client_key(&self) -> Option<&str> {
        self.selected_client_key.as_deref()
    }

    /// Name pending confirmation in CONFIRM_CLIENT_CREATE.
    pub fn temp_client_name(&self) -> Option<&str> {
        self.temp_client_name.as_deref()
    }

    /// Advance the machine. Events that make no sense in the current state
    /// are dropped.
    pub fn handle(&mut self, event: WizardEvent) -> Vec<WizardEffect> {
        use WizardEvent as E;
        use WizardState as S;

        match (self.state, event) {
            (S::Idle, E::Start) => {
                self.state = S::AskName;
                vec![WizardEffect::Speak(self.prompts.ask_name.clone())]
            }

            // every ASK state waits for its prompt to finish, then listens
            (S::AskName, E::SynthesisComplete) => self.listen(S::ListenName),
            (S::AskClient, E::SynthesisComplete) => self.listen(S::ListenClient),
            (S::AskDate, E::SynthesisComplete) => self.listen(S::ListenDate),
            (S::AskBudget, E::SynthesisComplete) => self.listen(S::ListenBudget),
            (S::AskConfirmation, E::SynthesisComplete) => self.listen(S::ListenConfirmation),
            // the confirmation question stays in its own state while listening
            (S::ConfirmClientCreate, E::SynthesisComplete) => vec![WizardEffect::Listen],

            (S::ListenName, E::Transcript(text)) => {
                self.collected.insert(FormField::Name, text.clone());
                self.state = S::AskClient;
                vec![
                    WizardEffect::SetField(FormField::Name, text),
                    WizardEffect::Speak(self.prompts.ask_client.clone()),
                ]
            }

            (S::ListenClient, E::Transcript(text)) => self.on_client_transcript(text),

            (S::ConfirmClientCreate, E::Transcript(text)) => {
                let lowered = text.to_lowercase();
                if CLIENT_CREATE_CONFIRMATIONS.iter().any(|w| lowered.contains(w)) {
                    let name = self.temp_client_name.clone().unwrap_or_default();
                    self.state = S::AskDate;
                    vec![
                        WizardEffect::RequestClientCreate(name),
                        WizardEffect::Speak(self.prompts.ask_date.clone()),
                    ]
                } else {
                    // declined; ask for the client again
                    self.temp_client_name = None;
                    self.collected.remove(&FormField::ClientName);
                    self.state = S::AskClient;
                    vec![WizardEffect::Speak(self.prompts.ask_client.clone())]
                }
            }

            (S::ListenDate, E::Transcript(text)) => {
                let mut effects = Vec::new();
                if let Some(date) = parse_relative_date(&text, Utc::now()) {
                    let value = date.to_rfc3339();
                    self.collected.insert(FormField::EndDate, value.clone());
                    effects.push(WizardEffect::SetField(FormField::EndDate, value));
                } else {
                    debug!(text, "unparseable date, leaving end date unset");
                }
                self.state = S::AskBudget;
                effects.push(WizardEffect::Speak(self.prompts.ask_budget.clone()));
                effects
            }

            (S::ListenBudget, E::Transcript(text)) => {
                let mut effects = Vec::new();
                if let Some(digits) = parse_budget(&text) {
                    self.collected.insert(FormField::Budget, digits.clone());
                    effects.push(WizardEffect::SetField(FormField::Budget, digits));
                } else {
                    debug!(text, "no digits in budget answer, leaving budget unset");
                }
                self.state = S::AskConfirmation;
                effects.push(WizardEffect::Speak(self.prompts.ask_confirmation.clone()));
                effects
            }

            (S::ListenConfirmation, E::Transcript(text)) => {
                let lowered = text.to_lowercase();
                self.state = S::Finished;
                if CONTINUE_WORDS.iter().any(|w| lowered.contains(w)) {
                    vec![WizardEffect::Submit]
                } else {
                    vec![]
                }
            }

            (state, event) => {
                debug!(?state, ?event, "ignoring wizard event");
                vec![]
            }
        }
    }

    fn listen(&mut self, next: WizardState) -> Vec<WizardEffect> {
        self.state = next;
        vec![WizardEffect::Listen]
    }

    fn on_client_transcript(&mut self, text: String) -> Vec<WizardEffect> {
        let lowered = text.to_lowercase();
        let matched = self
            .clients
            .iter()
            .find(|c| c.name.to_lowercase().contains(&lowered))
            .cloned();

        match matched {
            Some(client) => {
                self.selected_client_key = Some(client.id.clone());
                self.collected
                    .insert(FormField::ClientId, client.id.clone());
                self.collected
                    .insert(FormField::ClientName, client.name.clone());
                self.state = WizardState::AskDate;
                vec![
                    WizardEffect::SetField(FormField::ClientId, client.id),
                    WizardEffect::SetField(FormField::ClientName, client.name),
                    WizardEffect::Speak(self.prompts.ask_date.clone()),
                ]
            }
            None => {
                // provisional name, committed only after confirmation
                self.temp_client_name = Some(text.clone());
                self.collected
                    .insert(FormField::ClientName, text.clone());
                self.state = WizardState::ConfirmClientCreate;
                let prompt = self.prompts.confirm_client_create.replace("{name}", &text);
                vec![
                    WizardEffect::SetField(FormField::ClientName, text),
                    WizardEffect::Speak(prompt),
                ]
            }
        }
    }
}

/// Parse a spoken delivery date.
///
/// Handles "tomorrow" and "next week" phrases in all three locales, then
/// falls back to literal `YYYY-MM-DD`, `DD/MM/YYYY` and `DD-MM-YYYY` forms.
/// Month names and other relative phrases are not understood; the caller
/// leaves the field unset in that case.
pub fn parse_relative_date(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lowered = text.to_lowercase();

    if ["amanhã", "tomorrow", "demain"]
        .iter()
        .any(|w| lowered.contains(w))
    {
        return Some(now + Duration::days(1));
    }
    if ["próxima semana", "next week", "semaine prochaine"]
        .iter()
        .any(|w| lowered.contains(w))
    {
        return Some(now + Duration::days(7));
    }

    let trimmed = text.trim();
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&midnight));
        }
    }
    None
}

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Extract a budget amount as the concatenation of all digit runs.
///
/// "5000 euros" gives "5000", but "entre 2000 e 3000" gives "20003000";
/// spoken answers are expected to carry one number.
pub fn parse_budget(text: &str) -> Option<String> {
    let digits: String = DIGITS.find_iter(text).map(|m| m.as_str()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}
