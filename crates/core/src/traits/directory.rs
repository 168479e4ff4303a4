//! Project directory contract
//!
//! The dashboard side of the wizard: the client list for matching, form
//! field updates, client creation, and the actions the assistant can invoke.

use serde::{Deserialize, Serialize};

use crate::project::{Client, Project};

/// Form fields the wizard can fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    ClientId,
    ClientName,
    EndDate,
    Budget,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::ClientId => "clientId",
            FormField::ClientName => "clientName",
            FormField::EndDate => "endDate",
            FormField::Budget => "budget",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dashboard collaborator consumed by the assistant.
///
/// Implemented by the host application; the assistant issues these calls but
/// never implements them.
pub trait DirectoryPort: Send + Sync {
    /// Current client list for wizard matching.
    fn clients(&self) -> Vec<Client>;

    /// Current project list for context analysis.
    fn projects(&self) -> Vec<Project>;

    /// Apply a form field update produced by the wizard.
    fn update_field(&self, field: FormField, value: &str);

    /// Request creation of a new client with the given name.
    fn add_client(&self, name: &str);

    /// Advance the form after the wizard's confirmation step.
    fn submit_next(&self);

    /// Open the create-project flow (global voice command action).
    fn create_project(&self);
}
