//! Resume refactor service: LLM rewrite, cover letter and resume-vs-job analysis.
//! All LLM calls go through `CompletionProvider`.

pub mod analysis;
pub mod prompts;
pub mod templates;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{cache_key, Cache};
use crate::llm_client::{CompletionProvider, CompletionRequest, LlmError};
use crate::refactor::analysis::{parse_analysis, JobAnalysis};
use crate::refactor::prompts::{
    fill_template, ANALYSIS_PROMPT_TEMPLATE, COVER_LETTER_PROMPT_TEMPLATE, REFACTOR_PROMPT_TEMPLATE,
};
use crate::refactor::templates::{cover_letter_template, resume_template};

const MAX_IMPROVEMENTS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactoredResume {
    pub refactored_resume: String,
    pub improvements: Vec<String>,
    pub template: String,
}

pub async fn refactor_resume(
    llm: &dyn CompletionProvider,
    resume: &str,
    job_description: &str,
    template_key: &str,
) -> Result<RefactoredResume, LlmError> {
    let template = resume_template(template_key);
    let prompt = fill_template(
        REFACTOR_PROMPT_TEMPLATE,
        &[
            ("template_prompt", template.prompt),
            ("resume", resume),
            ("job_description", job_description),
        ],
    );

    let refactored = llm.complete(CompletionRequest::primary(&prompt)).await?;

    Ok(RefactoredResume {
        improvements: summarize_improvements(resume, &refactored),
        refactored_resume: refactored,
        template: template.name.to_string(),
    })
}

pub async fn generate_cover_letter(
    llm: &dyn CompletionProvider,
    resume: &str,
    job_description: &str,
    company: &str,
    title: &str,
    template_key: &str,
) -> Result<String, LlmError> {
    let template = cover_letter_template(template_key);
    let prompt = fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("template_prompt", template.prompt),
            ("company", company),
            ("title", title),
            ("job_description", job_description),
            ("resume", resume),
        ],
    );

    llm.complete(CompletionRequest::primary(&prompt)).await
}

/// Analyzes a resume against a job description. Results are cached per
/// (resume, job description) pair, so repeated webhooks for the same job
/// cost a single LLM call. Concurrent callers with a cold cache each pay for
/// a call, so a workflow runs this once and shares the result.
pub async fn analyze_resume_for_job(
    llm: &dyn CompletionProvider,
    cache: &Cache,
    resume: &str,
    job_description: &str,
) -> Result<JobAnalysis, LlmError> {
    let key = cache_key("analysis", &[resume, job_description]);
    cache
        .get_or_try_insert(&key, || async {
            let prompt = fill_template(
                ANALYSIS_PROMPT_TEMPLATE,
                &[("resume", resume), ("job_description", job_description)],
            );
            let prose = llm.complete(CompletionRequest::primary(&prompt)).await?;
            let analysis = parse_analysis(&prose);
            info!(
                "Resume analysis: {}% match, {} matching / {} missing skills",
                analysis.match_percentage,
                analysis.matching_skills.len(),
                analysis.missing_skills.len()
            );
            Ok::<_, LlmError>(analysis)
        })
        .await
}

/// Lines the rewrite introduced that were not in the original, in order.
pub fn summarize_improvements(original: &str, refactored: &str) -> Vec<String> {
    let before: HashSet<&str> = original
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut seen = HashSet::new();
    refactored
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !before.contains(l) && seen.insert(*l))
        .take(MAX_IMPROVEMENTS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{CompletionProvider, CompletionRequest, LlmError, ModelTier};

    /// Answers prompts by the first matching substring rule; records every prompt.
    pub struct ScriptedLlm {
        pub rules: Vec<(&'static str, &'static str)>,
        pub fail_on: Option<&'static str>,
        pub prompts: Mutex<Vec<(ModelTier, String)>>,
    }

    impl ScriptedLlm {
        pub fn new(rules: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                rules,
                fail_on: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing_on(mut self, needle: &'static str) -> Self {
            self.fail_on = Some(needle);
            self
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedLlm {
        async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
            self.prompts
                .lock()
                .unwrap()
                .push((request.tier, request.prompt.to_string()));
            if let Some(needle) = self.fail_on {
                if request.prompt.contains(needle) {
                    return Err(LlmError::Api {
                        status: 503,
                        message: "provider unavailable".into(),
                    });
                }
            }
            self.rules
                .iter()
                .find(|(needle, _)| request.prompt.contains(needle))
                .map(|(_, answer)| answer.to_string())
                .ok_or(LlmError::EmptyContent)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::test_support::ScriptedLlm;
    use super::*;

    #[test]
    fn test_summarize_improvements_only_new_lines() {
        let original = "Engineer at Acme\nBuilt APIs";
        let refactored = "Engineer at Acme\nDesigned REST APIs serving 2M requests/day\n\nLed migration to Rust";
        assert_eq!(
            summarize_improvements(original, refactored),
            vec![
                "Designed REST APIs serving 2M requests/day",
                "Led migration to Rust"
            ]
        );
    }

    #[test]
    fn test_summarize_improvements_dedups_and_caps() {
        let refactored = (0..30)
            .map(|i| format!("Line {}", i % 15))
            .collect::<Vec<_>>()
            .join("\n");
        let improvements = summarize_improvements("", &refactored);
        assert_eq!(improvements.len(), MAX_IMPROVEMENTS);
        assert_eq!(improvements[0], "Line 0");
    }

    #[tokio::test]
    async fn test_refactor_resume_uses_template_prompt() {
        let llm = ScriptedLlm::new(vec![("executive-level", "Executive resume")]);
        let result = refactor_resume(&llm, "my resume", "the job", "executive")
            .await
            .unwrap();
        assert_eq!(result.refactored_resume, "Executive resume");
        assert_eq!(result.template, "Executive Level");
        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].1.contains("my resume"));
        assert!(prompts[0].1.contains("the job"));
    }

    #[tokio::test]
    async fn test_cover_letter_prompt_names_company_and_title() {
        let llm = ScriptedLlm::new(vec![("Company: Initech", "Dear Initech")]);
        let letter = generate_cover_letter(&llm, "resume", "jd", "Initech", "SRE", "standard")
            .await
            .unwrap();
        assert_eq!(letter, "Dear Initech");
        assert!(llm.prompts.lock().unwrap()[0].1.contains("Position: SRE"));
    }

    #[tokio::test]
    async fn test_analysis_is_cached() {
        let llm = ScriptedLlm::new(vec![(
            "Analyze this resume",
            "Matching skills:\n- Rust\n\nMatch percentage: 80%",
        )]);
        let cache = Cache::in_memory(Duration::from_secs(60));

        let first = analyze_resume_for_job(&llm, &cache, "resume", "jd").await.unwrap();
        let second = analyze_resume_for_job(&llm, &cache, "resume", "jd").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.match_percentage, 80);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_resume_placeholders_are_not_expanded() {
        let llm = ScriptedLlm::new(vec![("Original Resume:", "ok")]);
        refactor_resume(&llm, "Wrote {job_description} tooling", "Kubernetes SRE", "modern")
            .await
            .unwrap();
        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].1.contains("Wrote {job_description} tooling"));
        assert_eq!(prompts[0].1.matches("Kubernetes SRE").count(), 1);
    }

    #[tokio::test]
    async fn test_analysis_error_propagates() {
        let llm = ScriptedLlm::new(vec![]).failing_on("Analyze");
        let cache = Cache::in_memory(Duration::from_secs(60));
        let result = analyze_resume_for_job(&llm, &cache, "resume", "jd").await;
        assert!(matches!(result, Err(LlmError::Api { status: 503, .. })));
    }
}
