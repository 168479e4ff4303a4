//! Project and client domain types
//!
//! Minimal views of the dashboard's project records, enough for context
//! analysis and wizard client matching. The REST layer that produces them is
//! outside this workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project lifecycle status as tracked by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectStatus {
    Draft,
    Created,
    InProgress,
    Completed,
}

impl ProjectStatus {
    /// Whether the project counts as actively being worked on
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress | Self::Created)
    }
}

/// A client reference as returned by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
}

impl Client {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A project record as seen by the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    /// Project type ("interior", "event", ...), used to bucket budget history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl Project {
    /// Create a minimal project for tests and fixtures
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: ProjectStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            client: None,
            project_type: None,
            budget: None,
            created_at: Utc::now(),
            end_date: None,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn with_end_date(mut self, at: DateTime<Utc>) -> Self {
        self.end_date = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_active() {
        assert!(ProjectStatus::InProgress.is_active());
        assert!(ProjectStatus::Created.is_active());
        assert!(!ProjectStatus::Draft.is_active());
        assert!(!ProjectStatus::Completed.is_active());
    }

    #[test]
    fn test_project_builder() {
        let p = Project::new("p1", "Terrace", ProjectStatus::Draft)
            .with_client(Client::new("c1", "Acme Corp"))
            .with_budget(5000.0);
        assert_eq!(p.client.as_ref().unwrap().name, "Acme Corp");
        assert_eq!(p.budget, Some(5000.0));
    }
}
