//! Smart greetings, proactive suggestions and field validation
//!
//! Everything here renders localized strings from the current
//! [`DashboardContext`] and learned memory. Functions are pure over their
//! inputs; `now` is injected wherever time matters.

use chrono::{DateTime, Utc};
use serde::Serialize;

use deco_voice_config::GreetingTemplates;
use deco_voice_core::{FormField, Locale};

use crate::context::{DashboardContext, TimeOfDay};
use crate::memory::{BudgetRange, ConversationMemory};
use crate::wizard::{parse_budget, parse_relative_date};

/// An actionable suggestion surfaced on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestedAction {
    CreateNewProject,
    CreateForClient,
    ViewDrafts,
    ViewUpcomingDeadlines,
}

/// Suggestion priority, high first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

/// A ranked, localized action suggestion
#[derive(Debug, Clone, Serialize)]
pub struct ActionSuggestion {
    pub action: SuggestedAction,
    pub label: String,
    pub priority: SuggestionPriority,
}

/// Validation verdict for one wizard field value
#[derive(Debug, Clone, Serialize)]
pub struct ValidationFeedback {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationFeedback {
    fn ok() -> Self {
        Self {
            is_valid: true,
            message: None,
            suggestion: None,
        }
    }
}

/// Renders greetings, suggestions and validation feedback
pub struct SuggestionEngine {
    greetings: GreetingTemplates,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(GreetingTemplates::default())
    }
}

impl SuggestionEngine {
    pub fn new(greetings: GreetingTemplates) -> Self {
        Self { greetings }
    }

    /// Time-of-day greeting plus a short context-aware follow-up.
    pub fn generate_smart_greeting(&self, context: &DashboardContext, locale: Locale) -> String {
        let templates = self.greetings.for_locale(locale);

        let base = match context.time_of_day {
            TimeOfDay::Morning => &templates.morning,
            TimeOfDay::Afternoon => &templates.afternoon,
            TimeOfDay::Evening => &templates.evening,
        };

        let activity = &context.user_activity;
        let follow_up = if activity.total_projects == 0 {
            Some(templates.first_project.clone())
        } else if activity.projects_this_week > 0 {
            Some(
                templates
                    .momentum
                    .replace("{count}", &activity.projects_this_week.to_string()),
            )
        } else {
            Some(templates.ready.clone())
        };

        match follow_up {
            Some(extra) if !extra.is_empty() => format!("{base} {extra}"),
            _ => base.clone(),
        }
    }

    /// Suggest reusing the client from the last recorded project.
    pub fn generate_client_suggestion(
        &self,
        memory: &ConversationMemory,
        locale: Locale,
    ) -> Option<String> {
        let client = memory.get_last_client()?;
        if client.name.is_empty() {
            return None;
        }
        Some(match locale {
            Locale::Pt => format!("O último projeto foi para {}. Usar o mesmo cliente?", client.name),
            Locale::En => format!("Your last project was for {}. Use the same client?", client.name),
            Locale::Fr => format!(
                "Votre dernier projet était pour {}. Utiliser le même client ?",
                client.name
            ),
        })
    }

    /// Suggest a budget from the learned range for the project type.
    pub fn generate_budget_suggestion(
        &self,
        memory: &ConversationMemory,
        project_type: &str,
        locale: Locale,
    ) -> Option<String> {
        let BudgetRange { min, max, average } = memory.get_budget_range(project_type)?;
        Some(match locale {
            Locale::Pt => format!(
                "Projetos semelhantes costumam ficar entre {min} e {max}. A média é {average}."
            ),
            Locale::En => format!(
                "Similar projects usually run between {min} and {max}. The average is {average}."
            ),
            Locale::Fr => format!(
                "Les projets similaires vont généralement de {min} à {max}. La moyenne est {average}."
            ),
        })
    }

    /// Ranked dashboard actions for the current context, high priority first.
    pub fn generate_action_suggestions(
        &self,
        context: &DashboardContext,
        locale: Locale,
    ) -> Vec<ActionSuggestion> {
        let mut suggestions = vec![ActionSuggestion {
            action: SuggestedAction::CreateNewProject,
            label: match locale {
                Locale::Pt => "Criar um projeto novo".to_string(),
                Locale::En => "Create a new project".to_string(),
                Locale::Fr => "Créer un nouveau projet".to_string(),
            },
            priority: SuggestionPriority::High,
        }];

        if let Some(client) = &context.frequent_client {
            suggestions.push(ActionSuggestion {
                action: SuggestedAction::CreateForClient,
                label: match locale {
                    Locale::Pt => format!("Criar projeto para {}", client.name),
                    Locale::En => format!("Create a project for {}", client.name),
                    Locale::Fr => format!("Créer un projet pour {}", client.name),
                },
                priority: SuggestionPriority::Medium,
            });
        }

        if context.project_status.drafts > 2 {
            suggestions.push(ActionSuggestion {
                action: SuggestedAction::ViewDrafts,
                label: match locale {
                    Locale::Pt => format!("Rever {} rascunhos", context.project_status.drafts),
                    Locale::En => format!("Review {} drafts", context.project_status.drafts),
                    Locale::Fr => format!("Revoir {} brouillons", context.project_status.drafts),
                },
                priority: SuggestionPriority::Low,
            });
        }

        if context.project_status.upcoming_deadlines > 2 {
            suggestions.push(ActionSuggestion {
                action: SuggestedAction::ViewUpcomingDeadlines,
                label: match locale {
                    Locale::Pt => "Ver prazos desta semana".to_string(),
                    Locale::En => "See this week's deadlines".to_string(),
                    Locale::Fr => "Voir les échéances de la semaine".to_string(),
                },
                priority: SuggestionPriority::Low,
            });
        }

        suggestions.sort_by_key(|s| s.priority);
        suggestions
    }

    /// Validate a spoken field value before it is committed to the form.
    ///
    /// Only budget and end date get real checks; other fields accept any
    /// non-empty text.
    pub fn generate_validation_feedback(
        &self,
        field: FormField,
        value: &str,
        now: DateTime<Utc>,
        locale: Locale,
    ) -> ValidationFeedback {
        match field {
            FormField::Budget => self.validate_budget(value, locale),
            FormField::EndDate => self.validate_end_date(value, now, locale),
            _ => ValidationFeedback::ok(),
        }
    }

    fn validate_budget(&self, value: &str, locale: Locale) -> ValidationFeedback {
        let amount = parse_budget(value).and_then(|digits| digits.parse::<f64>().ok());
        let Some(amount) = amount else {
            return ValidationFeedback {
                is_valid: false,
                message: Some(match locale {
                    Locale::Pt => "Não percebi o valor. Diga um número, por exemplo cinco mil.".into(),
                    Locale::En => "I didn't catch an amount. Say a number, for example five thousand.".into(),
                    Locale::Fr => "Je n'ai pas compris le montant. Dites un nombre, par exemple cinq mille.".into(),
                }),
                suggestion: None,
            };
        };
        if amount <= 0.0 {
            return ValidationFeedback {
                is_valid: false,
                message: Some(match locale {
                    Locale::Pt => "O orçamento tem de ser maior que zero.".into(),
                    Locale::En => "The budget has to be greater than zero.".into(),
                    Locale::Fr => "Le budget doit être supérieur à zéro.".into(),
                }),
                suggestion: None,
            };
        }
        if amount < 100.0 {
            // likely a mis-heard magnitude
            let scaled = amount * 10.0;
            return ValidationFeedback {
                is_valid: true,
                message: None,
                suggestion: Some(match locale {
                    Locale::Pt => format!("{amount} parece baixo. Queria dizer {scaled}?"),
                    Locale::En => format!("{amount} seems low. Did you mean {scaled}?"),
                    Locale::Fr => format!("{amount} semble bas. Vouliez-vous dire {scaled} ?"),
                }),
            };
        }
        ValidationFeedback::ok()
    }

    fn validate_end_date(&self, value: &str, now: DateTime<Utc>, locale: Locale) -> ValidationFeedback {
        match parse_relative_date(value, now) {
            Some(date) if date < now => ValidationFeedback {
                is_valid: false,
                message: Some(match locale {
                    Locale::Pt => "Essa data já passou. Escolha uma data futura.".into(),
                    Locale::En => "That date is in the past. Pick a future date.".into(),
                    Locale::Fr => "Cette date est déjà passée. Choisissez une date future.".into(),
                }),
                suggestion: Some(match locale {
                    Locale::Pt => "Por exemplo, para o próximo mês.".into(),
                    Locale::En => "For example, next month.".into(),
                    Locale::Fr => "Par exemple, le mois prochain.".into(),
                }),
            },
            _ => ValidationFeedback::ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::analyze_dashboard_context;
    use crate::memory::{MemoryLimits, ProjectRecord};
    use crate::store::InMemoryStore;
    use chrono::{Duration, TimeZone};
    use deco_voice_core::{Client, Project, ProjectStatus};
    use std::sync::Arc;

    fn engine() -> SuggestionEngine {
        SuggestionEngine::default()
    }

    fn memory() -> ConversationMemory {
        ConversationMemory::new(Arc::new(InMemoryStore::new()), MemoryLimits::default())
    }

    fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_greeting_first_project() {
        let context = analyze_dashboard_context(&[], morning());
        let greeting = engine().generate_smart_greeting(&context, Locale::En);
        assert_eq!(greeting, "Good morning! Shall we create your first project?");
    }

    #[test]
    fn test_greeting_momentum_count() {
        let now = morning();
        let projects = vec![
            Project::new("p1", "a", ProjectStatus::Draft).with_created_at(now - Duration::days(1)),
            Project::new("p2", "b", ProjectStatus::Draft).with_created_at(now - Duration::days(2)),
        ];
        let context = analyze_dashboard_context(&projects, now);
        let greeting = engine().generate_smart_greeting(&context, Locale::Pt);
        assert!(greeting.starts_with("Bom dia!"));
        assert!(greeting.contains("2 projetos"));
    }

    #[test]
    fn test_greeting_ready_for_returning_user() {
        let now = morning();
        let projects = vec![Project::new("p1", "a", ProjectStatus::Completed)
            .with_created_at(now - Duration::days(30))];
        let context = analyze_dashboard_context(&projects, now);
        let greeting = engine().generate_smart_greeting(&context, Locale::En);
        assert_eq!(greeting, "Good morning! Ready to create a new project?");
    }

    #[test]
    fn test_client_suggestion_from_last_project() {
        let memory = memory();
        assert!(engine()
            .generate_client_suggestion(&memory, Locale::En)
            .is_none());

        memory.record_project(ProjectRecord {
            name: "Terrace".into(),
            client_id: Some("c1".into()),
            client_name: Some("Acme Corp".into()),
            budget: None,
            project_type: None,
        });
        let suggestion = engine()
            .generate_client_suggestion(&memory, Locale::En)
            .unwrap();
        assert!(suggestion.contains("Acme Corp"));
    }

    #[test]
    fn test_budget_suggestion_uses_range() {
        let memory = memory();
        assert!(engine()
            .generate_budget_suggestion(&memory, "interior", Locale::En)
            .is_none());

        for budget in [1000.0, 3000.0] {
            memory.record_project(ProjectRecord {
                name: "p".into(),
                client_id: None,
                client_name: None,
                budget: Some(budget),
                project_type: Some("interior".into()),
            });
        }
        let suggestion = engine()
            .generate_budget_suggestion(&memory, "interior", Locale::En)
            .unwrap();
        assert!(suggestion.contains("1000"));
        assert!(suggestion.contains("3000"));
        assert!(suggestion.contains("2000"));
    }

    #[test]
    fn test_action_suggestions_ranked() {
        let now = morning();
        let mut projects: Vec<Project> = (0..4)
            .map(|i| {
                Project::new(format!("p{i}"), "x", ProjectStatus::Draft)
                    .with_created_at(now)
                    .with_client(Client::new("c1", "Acme Corp"))
            })
            .collect();
        for p in projects.iter_mut().take(3) {
            p.end_date = Some(now + Duration::days(2));
        }

        let context = analyze_dashboard_context(&projects, now);
        let suggestions = engine().generate_action_suggestions(&context, Locale::En);

        assert_eq!(suggestions[0].action, SuggestedAction::CreateNewProject);
        assert_eq!(suggestions[0].priority, SuggestionPriority::High);
        assert_eq!(suggestions[1].action, SuggestedAction::CreateForClient);
        assert!(suggestions[1].label.contains("Acme Corp"));
        assert!(suggestions
            .iter()
            .any(|s| s.action == SuggestedAction::ViewDrafts));
        assert!(suggestions
            .iter()
            .any(|s| s.action == SuggestedAction::ViewUpcomingDeadlines));
    }

    #[test]
    fn test_action_suggestions_skip_small_counts() {
        let context = analyze_dashboard_context(&[], morning());
        let suggestions = engine().generate_action_suggestions(&context, Locale::En);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].action, SuggestedAction::CreateNewProject);
    }

    #[test]
    fn test_budget_validation() {
        let now = morning();
        let e = engine();

        let bad = e.generate_validation_feedback(FormField::Budget, "no idea", now, Locale::En);
        assert!(!bad.is_valid);
        assert!(bad.message.is_some());

        let zero = e.generate_validation_feedback(FormField::Budget, "0", now, Locale::En);
        assert!(!zero.is_valid);

        let low = e.generate_validation_feedback(FormField::Budget, "50", now, Locale::En);
        assert!(low.is_valid);
        assert!(low.suggestion.unwrap().contains("500"));

        let fine = e.generate_validation_feedback(FormField::Budget, "5000 euros", now, Locale::En);
        assert!(fine.is_valid);
        assert!(fine.suggestion.is_none());
    }

    #[test]
    fn test_end_date_validation() {
        let now = morning();
        let e = engine();

        let past = e.generate_validation_feedback(FormField::EndDate, "2020-01-01", now, Locale::En);
        assert!(!past.is_valid);
        assert!(past.suggestion.unwrap().contains("next month"));

        let future = e.generate_validation_feedback(FormField::EndDate, "tomorrow", now, Locale::En);
        assert!(future.is_valid);

        // unparseable text is not rejected here; the wizard keeps the field unset
        let vague = e.generate_validation_feedback(FormField::EndDate, "whenever", now, Locale::En);
        assert!(vague.is_valid);
    }
}
