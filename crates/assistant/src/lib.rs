//! Dual-mode voice session engine
//!
//! Features:
//! - Fuzzy multilingual command matching (GLOBAL mode)
//! - Form-filling wizard state machine (WIZARD mode)
//! - Session + persistent conversation memory with bounded growth
//! - Dashboard context analysis and suggestion generation
//! - One async session driver owning the single speech channel

pub mod context;
pub mod matcher;
pub mod memory;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod suggestions;
pub mod wizard;

pub use context::{
    analyze_dashboard_context, get_context_priority, ContextSignal, DashboardContext, Priority,
    ProjectStatusSummary, TimeOfDay, UserActivity,
};
pub use matcher::{fuzzy_contains, levenshtein, similarity, CommandMatcher};
pub use memory::{BudgetRange, ConversationMemory, MemoryLimits, ProjectRecord};
pub use orchestrator::{Effect, Lifecycle, Mode, Orchestrator, OrchestratorEvent};
pub use session::VoiceSession;
pub use store::{InMemoryStore, JsonFileStore};
pub use suggestions::{
    ActionSuggestion, SuggestedAction, SuggestionEngine, SuggestionPriority, ValidationFeedback,
};
pub use wizard::{WizardEffect, WizardEvent, WizardMachine, WizardState};
