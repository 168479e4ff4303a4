//! Voice command trigger tables
//!
//! Per-locale phrase lists tested against final transcripts in GLOBAL mode.
//! These are configuration data: the matcher consumes whatever is here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use deco_voice_core::Locale;

/// Trigger phrase tables for global voice commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandTables {
    /// Create-project intent phrases, per locale
    #[serde(default)]
    pub create_project: HashMap<Locale, Vec<String>>,
}

impl Default for CommandTables {
    fn default() -> Self {
        let mut create_project = HashMap::new();
        create_project.insert(
            Locale::Pt,
            vec![
                "criar projeto".to_string(),
                "novo projeto".to_string(),
                "criar novo projeto".to_string(),
                "criar um projeto".to_string(),
                "começar projeto".to_string(),
            ],
        );
        create_project.insert(
            Locale::En,
            vec![
                "create project".to_string(),
                "new project".to_string(),
                "create a project".to_string(),
                "create new project".to_string(),
                "start a project".to_string(),
            ],
        );
        create_project.insert(
            Locale::Fr,
            vec![
                "créer un projet".to_string(),
                "créer projet".to_string(),
                "nouveau projet".to_string(),
                "commencer un projet".to_string(),
            ],
        );

        Self { create_project }
    }
}

impl CommandTables {
    /// Create-project phrases for one locale
    pub fn create_project_phrases(&self, locale: Locale) -> &[String] {
        self.create_project
            .get(&locale)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All create-project phrases across locales.
    ///
    /// Commands are matched multilingually: a user on the PT interface
    /// saying "create project" still triggers the intent.
    pub fn all_create_project_phrases(&self) -> impl Iterator<Item = &str> {
        self.create_project
            .values()
            .flat_map(|v| v.iter().map(|s| s.as_str()))
    }
}
