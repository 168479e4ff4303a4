//! Conversation memory
//!
//! Two tiers:
//! - Session log: ring buffer of the last 50 exchanged messages, gone on
//!   `clear_session()`.
//! - Persistent learned facts: frequent clients, budget history per project
//!   type, recent projects. Loaded once at construction, flushed to the
//!   store after every mutation, surviving `clear_session()` but not
//!   `clear_all_data()`.
//!
//! Storage failures are caught and degrade to in-memory-only operation for
//! the session; no error surfaces to the caller.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use deco_voice_core::{Client, ConversationMessage, MemoryStore, Sender};

/// Well-known storage key for the persistent memory blob
pub const MEMORY_STORAGE_KEY: &str = "deco_voice_memory";

/// Growth caps for the bounded stores
#[derive(Debug, Clone)]
pub struct MemoryLimits {
    /// Session message log cap
    pub max_messages: usize,
    /// Recent project list cap
    pub max_recent_projects: usize,
    /// Budget samples cap per project type
    pub max_budget_samples: usize,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self {
            max_messages: 50,
            max_recent_projects: 20,
            max_budget_samples: 50,
        }
    }
}

/// A client the user keeps coming back to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequentClient {
    pub name: String,
    pub count: u64,
    pub last_used: DateTime<Utc>,
}

/// A recently recorded project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Learned user preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_detect_language: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_region: Option<String>,
}

/// The persisted blob
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistentMemory {
    #[serde(default)]
    frequent_clients: HashMap<String, FrequentClient>,
    #[serde(default)]
    budget_patterns: HashMap<String, Vec<f64>>,
    #[serde(default)]
    recent_projects: Vec<RecentProject>,
    #[serde(default)]
    user_preferences: UserPreferences,
}

/// Input for [`ConversationMemory::record_project`]
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub name: String,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub budget: Option<f64>,
    pub project_type: Option<String>,
}

/// Budget statistics for one project type
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

/// Session + persistent conversation memory.
///
/// One instance per running session, owned by the top-level session object
/// and passed explicitly to collaborators.
pub struct ConversationMemory {
    limits: MemoryLimits,
    store: Arc<dyn MemoryStore>,
    session: RwLock<VecDeque<ConversationMessage>>,
    persistent: RwLock<PersistentMemory>,
}

impl ConversationMemory {
    /// Create the memory, loading any persisted blob from the store.
    ///
    /// A read failure or corrupt blob degrades to an empty persistent state;
    /// the session keeps working in-memory.
    pub fn new(store: Arc<dyn MemoryStore>, limits: MemoryLimits) -> Self {
        let persistent = match store.get(MEMORY_STORAGE_KEY) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(memory) => memory,
                Err(e) => {
                    tracing::warn!("persistent memory blob is corrupt, starting empty: {e}");
                    PersistentMemory::default()
                }
            },
            Ok(None) => PersistentMemory::default(),
            Err(e) => {
                tracing::warn!("persistent memory load failed, running in-memory only: {e}");
                PersistentMemory::default()
            }
        };

        Self {
            limits,
            store,
            session: RwLock::new(VecDeque::new()),
            persistent: RwLock::new(persistent),
        }
    }

    /// Append a message to the session log, dropping the oldest entries
    /// beyond the cap.
    pub fn add_message(&self, sender: Sender, text: impl Into<String>) -> ConversationMessage {
        let message = ConversationMessage::new(sender, text);
        let mut session = self.session.write();
        session.push_back(message.clone());
        while session.len() > self.limits.max_messages {
            session.pop_front();
        }
        message
    }

    /// The current session log, oldest first.
    pub fn messages(&self) -> Vec<ConversationMessage> {
        self.session.read().iter().cloned().collect()
    }

    /// Record a created project into the persistent facts and flush.
    pub fn record_project(&self, record: ProjectRecord) {
        {
            let mut memory = self.persistent.write();
            let now = Utc::now();

            memory.recent_projects.insert(
                0,
                RecentProject {
                    name: record.name,
                    client_id: record.client_id.clone(),
                    client_name: record.client_name.clone(),
                    budget: record.budget,
                    timestamp: now,
                },
            );
            memory
                .recent_projects
                .truncate(self.limits.max_recent_projects);

            if let Some(client_id) = record.client_id {
                let entry = memory
                    .frequent_clients
                    .entry(client_id)
                    .or_insert_with(|| FrequentClient {
                        name: record.client_name.clone().unwrap_or_default(),
                        count: 0,
                        last_used: now,
                    });
                entry.count += 1;
                entry.last_used = now;
                if let Some(name) = record.client_name {
                    entry.name = name;
                }
            }

            if let Some(budget) = record.budget {
                let key = record
                    .project_type
                    .unwrap_or_else(|| "general".to_string());
                let samples = memory.budget_patterns.entry(key).or_default();
                samples.push(budget);
                while samples.len() > self.limits.max_budget_samples {
                    samples.remove(0);
                }
            }
        }

        self.save();
    }

    /// Clients sorted by usage count descending, at most `limit`.
    pub fn get_frequent_clients(&self, limit: usize) -> Vec<(String, FrequentClient)> {
        let memory = self.persistent.read();
        let mut clients: Vec<(String, FrequentClient)> = memory
            .frequent_clients
            .iter()
            .map(|(id, c)| (id.clone(), c.clone()))
            .collect();
        clients.sort_by(|a, b| b.1.count.cmp(&a.1.count));
        clients.truncate(limit);
        clients
    }

    /// The client of the most recently recorded project, if any.
    pub fn get_last_client(&self) -> Option<Client> {
        let memory = self.persistent.read();
        let recent = memory.recent_projects.first()?;
        Some(Client::new(
            recent.client_id.clone()?,
            recent.client_name.clone().unwrap_or_default(),
        ))
    }

    /// Recently recorded projects, newest first.
    pub fn recent_projects(&self) -> Vec<RecentProject> {
        self.persistent.read().recent_projects.clone()
    }

    /// Rounded mean budget for a project type, `None` without samples.
    pub fn get_average_budget(&self, project_type: &str) -> Option<f64> {
        let memory = self.persistent.read();
        let samples = memory.budget_patterns.get(project_type)?;
        if samples.is_empty() {
            return None;
        }
        Some((samples.iter().sum::<f64>() / samples.len() as f64).round())
    }

    /// Min/max/average budget for a project type, `None` without samples.
    pub fn get_budget_range(&self, project_type: &str) -> Option<BudgetRange> {
        let memory = self.persistent.read();
        let samples = memory.budget_patterns.get(project_type)?;
        if samples.is_empty() {
            return None;
        }
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let average = (samples.iter().sum::<f64>() / samples.len() as f64).round();
        Some(BudgetRange { min, max, average })
    }

    /// Learned user preferences.
    pub fn user_preferences(&self) -> UserPreferences {
        self.persistent.read().user_preferences.clone()
    }

    /// Update learned preferences and flush.
    pub fn set_user_preferences(&self, preferences: UserPreferences) {
        self.persistent.write().user_preferences = preferences;
        self.save();
    }

    /// Drop the session log; persistent facts survive.
    pub fn clear_session(&self) {
        self.session.write().clear();
    }

    /// Wipe both tiers, including the stored blob.
    pub fn clear_all_data(&self) {
        self.session.write().clear();
        *self.persistent.write() = PersistentMemory::default();
        self.save();
    }

    /// Flush the persistent tier. Write failures are logged and swallowed;
    /// the in-memory state stays authoritative for the session.
    fn save(&self) {
        let value = {
            let memory = self.persistent.read();
            match serde_json::to_value(&*memory) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("failed to serialize persistent memory: {e}");
                    return;
                }
            }
        };
        if let Err(e) = self.store.set(MEMORY_STORAGE_KEY, &value) {
            tracing::warn!("persistent memory write failed, keeping in-memory state: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use deco_voice_core::{Error, Result};

    fn record(name: &str, client: Option<(&str, &str)>, budget: Option<f64>) -> ProjectRecord {
        ProjectRecord {
            name: name.to_string(),
            client_id: client.map(|(id, _)| id.to_string()),
            client_name: client.map(|(_, n)| n.to_string()),
            budget,
            project_type: None,
        }
    }

    fn memory() -> ConversationMemory {
        ConversationMemory::new(Arc::new(InMemoryStore::new()), MemoryLimits::default())
    }

    #[test]
    fn test_session_log_ring_buffer() {
        let memory = memory();
        for i in 0..60 {
            memory.add_message(Sender::User, format!("message {i}"));
        }
        let messages = memory.messages();
        assert_eq!(messages.len(), 50);
        // oldest dropped first
        assert_eq!(messages[0].text, "message 10");
        assert_eq!(messages.last().unwrap().text, "message 59");
    }

    #[test]
    fn test_recent_projects_cap() {
        let memory = memory();
        for i in 0..25 {
            memory.record_project(record(&format!("p{i}"), None, None));
        }
        let recent = memory.recent_projects();
        assert!(recent.len() <= 20);
        // newest first
        assert_eq!(recent[0].name, "p24");
    }

    #[test]
    fn test_budget_samples_cap() {
        let memory = memory();
        for i in 0..60 {
            memory.record_project(ProjectRecord {
                name: format!("p{i}"),
                client_id: None,
                client_name: None,
                budget: Some(i as f64),
                project_type: Some("interior".into()),
            });
        }
        let range = memory.get_budget_range("interior").unwrap();
        // oldest samples evicted
        assert_eq!(range.min, 10.0);
        assert_eq!(range.max, 59.0);
    }

    #[test]
    fn test_average_budget() {
        let memory = memory();
        assert_eq!(memory.get_average_budget("unknown-type"), None);

        for budget in [100.0, 200.0, 300.0] {
            memory.record_project(ProjectRecord {
                name: "p".into(),
                client_id: None,
                client_name: None,
                budget: Some(budget),
                project_type: Some("event".into()),
            });
        }
        assert_eq!(memory.get_average_budget("event"), Some(200.0));
    }

    #[test]
    fn test_frequent_clients_sorted() {
        let memory = memory();
        for _ in 0..3 {
            memory.record_project(record("p", Some(("c1", "Acme Corp")), None));
        }
        memory.record_project(record("p", Some(("c2", "Globex")), None));

        let clients = memory.get_frequent_clients(10);
        assert_eq!(clients[0].0, "c1");
        assert_eq!(clients[0].1.count, 3);
        assert_eq!(clients[1].0, "c2");
    }

    #[test]
    fn test_last_client() {
        let memory = memory();
        assert!(memory.get_last_client().is_none());

        memory.record_project(record("p1", Some(("c1", "Acme Corp")), None));
        memory.record_project(record("p2", Some(("c2", "Globex")), None));

        let last = memory.get_last_client().unwrap();
        assert_eq!(last.id, "c2");
        assert_eq!(last.name, "Globex");
    }

    #[test]
    fn test_clear_session_keeps_persistent() {
        let memory = memory();
        memory.add_message(Sender::User, "hello");
        memory.record_project(record("p", Some(("c1", "Acme Corp")), None));

        memory.clear_session();
        assert!(memory.messages().is_empty());
        assert!(memory.get_last_client().is_some());
    }

    #[test]
    fn test_clear_all_data() {
        let store = Arc::new(InMemoryStore::new());
        let memory = ConversationMemory::new(store.clone(), MemoryLimits::default());
        memory.record_project(record("p", Some(("c1", "Acme Corp")), None));

        memory.clear_all_data();
        assert!(memory.get_last_client().is_none());

        // the wipe is persisted too
        let reloaded = ConversationMemory::new(store, MemoryLimits::default());
        assert!(reloaded.get_last_client().is_none());
    }

    #[test]
    fn test_persistence_round_trip() {
        let store = Arc::new(InMemoryStore::new());
        {
            let memory = ConversationMemory::new(store.clone(), MemoryLimits::default());
            memory.record_project(record("p", Some(("c1", "Acme Corp")), Some(5000.0)));
        }
        let reloaded = ConversationMemory::new(store, MemoryLimits::default());
        assert_eq!(reloaded.get_last_client().unwrap().name, "Acme Corp");
        assert_eq!(reloaded.get_average_budget("general"), Some(5000.0));
    }

    struct FailingStore;

    impl MemoryStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<serde_json::Value>> {
            Err(Error::Storage("disk on fire".into()))
        }
        fn set(&self, _key: &str, _value: &serde_json::Value) -> Result<()> {
            Err(Error::Storage("disk on fire".into()))
        }
    }

    #[test]
    fn test_storage_failure_degrades_silently() {
        let memory = ConversationMemory::new(Arc::new(FailingStore), MemoryLimits::default());
        // mutations still work in-memory, no panic, no error surfaced
        memory.record_project(record("p", Some(("c1", "Acme Corp")), Some(100.0)));
        assert_eq!(memory.get_last_client().unwrap().id, "c1");
        assert_eq!(memory.get_average_budget("general"), Some(100.0));
    }
}
