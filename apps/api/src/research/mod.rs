//! Research scheduler: rotates which career-research categories are queried by
//! weekday and time of day, and turns a user profile into search queries.

pub mod handlers;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

const MAX_CATEGORIES: usize = 3;
pub const DEFAULT_REFRESH_HOURS: i64 = 24;
const REFRESH_HOUR: u32 = 6;

const NEWS_SITES: &str = "forbes.com,hbr.org,techcrunch.com,bloomberg.com";
const CAREER_SITES: &str = "linkedin.com,indeed.com,glassdoor.com";
const LEARNING_SITES: &str = "coursera.org,udemy.com,skillshare.com,medium.com";
const SALARY_SITES: &str = "glassdoor.com,payscale.com,indeed.com";
const INTERVIEW_SITES: &str = "indeed.com,linkedin.com,themuse.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Industry,
    Skills,
    Salary,
    Interview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryPriority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchQuery {
    pub query: String,
    pub category: Category,
    pub sites: &'static str,
    pub priority: QueryPriority,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearchProfile {
    pub skills: Vec<String>,
    pub target_role: String,
    pub industry: String,
}

/// Base categories per weekday, 0 = Sunday.
fn day_categories(days_from_sunday: u32) -> &'static [Category] {
    use Category::*;
    match days_from_sunday {
        0 => &[Industry, Salary],
        1 => &[Skills, Interview],
        2 => &[Industry, Skills],
        3 => &[Interview, Salary],
        4 => &[Industry, Interview],
        5 => &[Skills, Salary],
        _ => &[Industry, Skills, Interview],
    }
}

/// Categories to research at `at`: the weekday's base set, nudged by time of day
/// (mornings favour industry, afternoons skills and interviews, evenings salary),
/// capped at three.
pub fn categories_for(at: DateTime<Utc>) -> Vec<Category> {
    let mut categories = day_categories(at.weekday().num_days_from_sunday()).to_vec();

    match at.hour() {
        6..=11 => {
            if !categories.contains(&Category::Industry) {
                categories.insert(0, Category::Industry);
            }
        }
        12..=17 => {
            if !categories.contains(&Category::Skills) {
                categories.insert(0, Category::Skills);
            }
            if !categories.contains(&Category::Interview) {
                categories.push(Category::Interview);
            }
        }
        18..=23 => {
            if !categories.contains(&Category::Salary) {
                categories.push(Category::Salary);
            }
        }
        _ => {}
    }

    categories.truncate(MAX_CATEGORIES);
    categories
}

/// Search queries for the requested categories. A category yields nothing when the
/// profile lacks what its query needs (e.g. salary without a target role).
pub fn build_queries(profile: &ResearchProfile, categories: &[Category], year: i32) -> Vec<ResearchQuery> {
    let role = profile.target_role.trim();
    let industry = profile.industry.trim();
    let mut queries = Vec::new();
    let mut push = |query: String, category, sites, priority| {
        queries.push(ResearchQuery {
            query,
            category,
            sites,
            priority,
        })
    };

    if categories.contains(&Category::Industry) {
        match (industry.is_empty(), role.is_empty()) {
            (false, false) => push(
                format!("{industry} industry {role} career growth trends {year}"),
                Category::Industry,
                NEWS_SITES,
                QueryPriority::High,
            ),
            (false, true) => push(
                format!("{industry} industry trends {year} career opportunities"),
                Category::Industry,
                NEWS_SITES,
                QueryPriority::High,
            ),
            (true, false) => push(
                format!("career growth {role} advancement tips"),
                Category::Industry,
                CAREER_SITES,
                QueryPriority::Medium,
            ),
            (true, true) => {}
        }
    }

    if categories.contains(&Category::Skills) && !profile.skills.is_empty() {
        let top = profile
            .skills
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        push(
            format!("{top} skill development guide {year}"),
            Category::Skills,
            LEARNING_SITES,
            QueryPriority::High,
        );
    }

    if categories.contains(&Category::Salary) && !role.is_empty() {
        if industry.is_empty() {
            push(
                format!("{role} salary range {year}"),
                Category::Salary,
                SALARY_SITES,
                QueryPriority::Medium,
            );
        } else {
            push(
                format!("{role} {industry} salary range {year}"),
                Category::Salary,
                SALARY_SITES,
                QueryPriority::High,
            );
        }
    }

    if categories.contains(&Category::Interview) && !role.is_empty() {
        let query = if industry.is_empty() {
            format!("{role} interview questions tips")
        } else {
            format!("{role} {industry} interview questions tips")
        };
        push(query, Category::Interview, INTERVIEW_SITES, QueryPriority::High);
    }

    queries
}

pub fn should_refresh(last_update: Option<DateTime<Utc>>, now: DateTime<Utc>, threshold_hours: i64) -> bool {
    match last_update {
        None => true,
        Some(last) => now - last >= Duration::hours(threshold_hours),
    }
}

/// 06:00 UTC on the day after `now`.
pub fn next_refresh_time(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now.date_naive() + Duration::days(1);
    tomorrow
        .and_time(NaiveTime::from_hms_opt(REFRESH_HOUR, 0, 0).unwrap_or_default())
        .and_utc()
}
