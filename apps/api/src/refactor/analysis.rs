//! Turns free-form LLM analysis prose into a structured `JobAnalysis`.
//!
//! The model is asked for labelled sections, but nothing guarantees it complies.
//! Every extractor therefore degrades to an empty list (or 0%) instead of failing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static MATCH_PERCENTAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)match percentage:?\s*(\d+)%").expect("static regex compiles")
});

static BULLET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s\-•*]+").expect("static regex compiles"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAnalysis {
    pub missing_skills: Vec<String>,
    pub matching_skills: Vec<String>,
    pub suggestions: Vec<String>,
    /// 0 – 100. Zero when the model gave no parseable percentage.
    pub match_percentage: u32,
    pub key_improvements: Vec<String>,
}

pub fn parse_analysis(text: &str) -> JobAnalysis {
    JobAnalysis {
        missing_skills: extract_section(text, "Missing skills:"),
        matching_skills: extract_section(text, "Matching skills:"),
        suggestions: extract_section(text, "Specific suggestions:"),
        match_percentage: extract_match_percentage(text),
        key_improvements: extract_section(text, "Key areas:"),
    }
}

/// Returns the bullet lines that follow `header` up to the next blank line (or end of text).
/// Header matching is case-insensitive.
fn extract_section(text: &str, header: &str) -> Vec<String> {
    let pattern = format!("(?i){}", regex::escape(header));
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };
    let Some(found) = re.find(text) else {
        return Vec::new();
    };

    let rest = text[found.end()..]
        .trim_start_matches(['\n', '\r'])
        .replace("\r\n", "\n");
    let block = rest.split("\n\n").next().unwrap_or_default();

    block
        .lines()
        .map(|line| BULLET_PREFIX.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn extract_match_percentage(text: &str) -> u32 {
    MATCH_PERCENTAGE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .map(|p| p.min(100))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "Here is my analysis.

Missing skills:
- Kubernetes
- Terraform

Matching skills:
- Rust
• PostgreSQL
  - Docker

Match percentage: 72%

Specific suggestions:
- Quantify the impact of the payments migration
- Mention on-call experience

Key areas:
- Cloud infrastructure";

    #[test]
    fn test_parses_all_sections() {
        let analysis = parse_analysis(WELL_FORMED);
        assert_eq!(analysis.missing_skills, vec!["Kubernetes", "Terraform"]);
        assert_eq!(analysis.matching_skills, vec!["Rust", "PostgreSQL", "Docker"]);
        assert_eq!(analysis.match_percentage, 72);
        assert_eq!(analysis.suggestions.len(), 2);
        assert_eq!(analysis.key_improvements, vec!["Cloud infrastructure"]);
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let analysis = parse_analysis("MATCHING SKILLS:\n- Go\n\nmatch percentage 55%");
        assert_eq!(analysis.matching_skills, vec!["Go"]);
        assert_eq!(analysis.match_percentage, 55);
    }

    #[test]
    fn test_inline_section_content_is_kept() {
        let analysis = parse_analysis("Missing skills: AWS, GCP\n\nOther text");
        assert_eq!(analysis.missing_skills, vec!["AWS, GCP"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let analysis = parse_analysis("Matching skills:\r\n- Rust\r\n- SQL\r\n\r\nMatch percentage: 10%");
        assert_eq!(analysis.matching_skills, vec!["Rust", "SQL"]);
    }

    #[test]
    fn test_missing_sections_yield_empty_and_zero() {
        let analysis = parse_analysis("The candidate seems like a decent fit overall.");
        assert_eq!(analysis, JobAnalysis::default());
    }

    #[test]
    fn test_percentage_is_clamped() {
        assert_eq!(extract_match_percentage("Match percentage: 140%"), 100);
    }

    #[test]
    fn test_section_at_end_of_text() {
        let analysis = parse_analysis("Key areas:\n- Leadership\n- Testing");
        assert_eq!(analysis.key_improvements, vec!["Leadership", "Testing"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(JobAnalysis::default()).unwrap();
        assert!(value.get("matchPercentage").is_some());
        assert!(value.get("missingSkills").is_some());
    }
}
