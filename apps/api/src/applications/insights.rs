use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::application::ApplicationRow;

const TOP_N: usize = 3;
const RECENT_ACTIVITY: usize = 5;

/// Statuses that mean the employer reacted to the application.
const RESPONDED: &[&str] = &["under_review", "interview_scheduled", "rejected", "accepted"];
const SUCCEEDED: &[&str] = &["interview_scheduled", "accepted"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub date: DateTime<Utc>,
    pub action: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInsights {
    pub total_applications: usize,
    pub response_rate: u32,
    pub average_compatibility_score: u32,
    pub top_skills: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub success_rate: u32,
    pub recent_activity: Vec<ActivityItem>,
}

/// Aggregates a user's applications. Rates are whole percentages of the total.
pub fn compute_insights(applications: &[ApplicationRow]) -> ApplicationInsights {
    let total = applications.len();
    let count_in = |statuses: &[&str]| {
        applications
            .iter()
            .filter(|a| statuses.contains(&a.status.as_str()))
            .count()
    };

    let scores: Vec<i64> = applications
        .iter()
        .filter_map(|a| a.compatibility_score.map(i64::from))
        .collect();
    let average_compatibility_score = if scores.is_empty() {
        0
    } else {
        (scores.iter().sum::<i64>() as f64 / scores.len() as f64).round() as u32
    };

    let mut recent: Vec<&ApplicationRow> = applications.iter().collect();
    recent.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
    let recent_activity = recent
        .into_iter()
        .take(RECENT_ACTIVITY)
        .map(|a| ActivityItem {
            date: a.applied_at,
            action: format!("Applied to {} at {}", a.job_title, a.company_name),
            status: display_status(&a.status),
        })
        .collect();

    ApplicationInsights {
        total_applications: total,
        response_rate: percentage(count_in(RESPONDED), total),
        average_compatibility_score,
        top_skills: most_frequent(applications.iter().flat_map(|a| &a.matching_skills)),
        improvement_areas: most_frequent(applications.iter().flat_map(|a| &a.missing_skills)),
        success_rate: percentage(count_in(SUCCEEDED), total),
        recent_activity,
    }
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// Top entries by frequency; ties go to the alphabetically first name.
fn most_frequent<'a>(skills: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for skill in skills {
        let skill = skill.trim();
        if !skill.is_empty() {
            *counts.entry(skill).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(TOP_N)
        .map(|(skill, _)| skill.to_string())
        .collect()
}

/// `interview_scheduled` → `Interview Scheduled`
fn display_status(status: &str) -> String {
    status
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
