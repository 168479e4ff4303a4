//! Dashboard context analysis
//!
//! Pure derivations over the current project list: nothing here does I/O,
//! and `now` is injected so every function is directly testable. A
//! [`DashboardContext`] is recomputed on demand and never persisted.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Serialize;

use deco_voice_core::{Client, Project, ProjectStatus};

/// Coarse time-of-day bucket for greeting selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

/// Bucket an hour: [5, 12) morning, [12, 18) afternoon, else evening.
pub fn time_of_day(hour: u32) -> TimeOfDay {
    match hour {
        5..=11 => TimeOfDay::Morning,
        12..=17 => TimeOfDay::Afternoon,
        _ => TimeOfDay::Evening,
    }
}

/// Aggregate status of the project list
#[derive(Debug, Clone, Serialize)]
pub struct ProjectStatusSummary {
    pub total: usize,
    pub drafts: usize,
    pub in_progress: usize,
    /// Projects with an end date within the next 7 days
    pub upcoming_deadlines: usize,
    /// Projects created within the last 7 days
    pub recent_projects: Vec<Project>,
}

/// Signals about how active the user has been
#[derive(Debug, Clone, Serialize)]
pub struct UserActivity {
    pub is_new_user: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
    pub projects_this_week: usize,
    pub projects_this_month: usize,
    pub total_projects: usize,
}

/// Point-in-time snapshot feeding greeting and suggestion generation
#[derive(Debug, Clone, Serialize)]
pub struct DashboardContext {
    pub time_of_day: TimeOfDay,
    pub project_status: ProjectStatusSummary,
    pub user_activity: UserActivity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequent_client: Option<Client>,
}

/// Summarize project statuses and deadlines.
pub fn analyze_project_status(projects: &[Project], now: DateTime<Utc>) -> ProjectStatusSummary {
    let week_ahead = now + Duration::days(7);
    let week_ago = now - Duration::days(7);

    ProjectStatusSummary {
        total: projects.len(),
        drafts: projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Draft)
            .count(),
        in_progress: projects.iter().filter(|p| p.status.is_active()).count(),
        upcoming_deadlines: projects
            .iter()
            .filter(|p| {
                p.end_date
                    .map(|d| d >= now && d <= week_ahead)
                    .unwrap_or(false)
            })
            .count(),
        recent_projects: projects
            .iter()
            .filter(|p| p.created_at >= week_ago)
            .cloned()
            .collect(),
    }
}

/// Derive activity signals from creation timestamps.
pub fn analyze_user_activity(projects: &[Project], now: DateTime<Utc>) -> UserActivity {
    let week_ago = now - Duration::days(7);
    let month_ago = now - Duration::days(30);

    UserActivity {
        is_new_user: projects.is_empty(),
        last_activity: projects.iter().map(|p| p.created_at).max(),
        projects_this_week: projects
            .iter()
            .filter(|p| p.created_at >= week_ago)
            .count(),
        projects_this_month: projects
            .iter()
            .filter(|p| p.created_at >= month_ago)
            .count(),
        total_projects: projects.len(),
    }
}

/// The client appearing most often across the projects, ties broken by
/// first encounter; `None` when no project carries client data.
pub fn get_most_frequent_client(projects: &[Project]) -> Option<Client> {
    let mut counts: Vec<(Client, usize)> = Vec::new();

    for project in projects {
        let Some(client) = &project.client else {
            continue;
        };
        if let Some(entry) = counts.iter_mut().find(|(c, _)| c.id == client.id) {
            entry.1 += 1;
        } else {
            counts.push((client.clone(), 1));
        }
    }

    // keep the earliest client on ties, so only a strictly greater count wins
    let mut best: Option<(Client, usize)> = None;
    for (client, count) in counts {
        match &best {
            Some((_, best_count)) if count <= *best_count => {}
            _ => best = Some((client, count)),
        }
    }
    best.map(|(client, _)| client)
}

/// Compose the full context snapshot. Pure, no I/O.
pub fn analyze_dashboard_context(projects: &[Project], now: DateTime<Utc>) -> DashboardContext {
    DashboardContext {
        time_of_day: time_of_day(now.hour()),
        project_status: analyze_project_status(projects, now),
        user_activity: analyze_user_activity(projects, now),
        frequent_client: get_most_frequent_client(projects),
    }
}

/// Priority rank for context signals and suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A prioritized signal derived from the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextSignal {
    CreateNewProject,
    NewUser,
    FrequentClient,
    Drafts,
    Deadline,
}

/// Rank the context into a priority-ordered signal list.
///
/// `CreateNewProject` always leads at high priority; the rest appear only
/// when their condition holds.
pub fn get_context_priority(context: &DashboardContext) -> Vec<(ContextSignal, Priority)> {
    let mut signals = vec![(ContextSignal::CreateNewProject, Priority::High)];

    if context.user_activity.is_new_user {
        signals.push((ContextSignal::NewUser, Priority::High));
    }
    if context.frequent_client.is_some() {
        signals.push((ContextSignal::FrequentClient, Priority::Medium));
    }
    if context.project_status.drafts > 2 {
        signals.push((ContextSignal::Drafts, Priority::Low));
    }
    if context.project_status.upcoming_deadlines > 2 {
        signals.push((ContextSignal::Deadline, Priority::Low));
    }

    signals.sort_by_key(|(_, priority)| *priority);
    signals
}
