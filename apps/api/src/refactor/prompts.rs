// All LLM prompt templates for the refactor service.
// Placeholders are `{name}` and are filled with `fill_template` before sending.

/// Substitutes `{name}` placeholders in a single pass. Substituted values are
/// never rescanned, so braces inside user text stay literal. Unknown
/// placeholders are left as is.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let matched = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match matched {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Resume rewrite. Replace: {template_prompt}, {resume}, {job_description}
pub const REFACTOR_PROMPT_TEMPLATE: &str = "{template_prompt}

Original Resume:
{resume}

Job Description:
{job_description}";

/// Cover letter. Replace: {template_prompt}, {company}, {title}, {job_description}, {resume}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = "{template_prompt}

Write a professional cover letter for the following job:

Company: {company}
Position: {title}

Job Description:
{job_description}

Candidate's Resume:
{resume}

Requirements:
1. Professional and engaging tone
2. Highlight relevant skills and experience
3. Show enthusiasm for the role and company
4. Include specific examples from the resume
5. Standard business letter format";

/// Resume vs. job analysis. The section headers below are what `analysis::parse_analysis`
/// looks for, so keep them in sync. Replace: {resume}, {job_description}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = "Analyze this resume against the job description and provide detailed feedback.

Resume:
{resume}

Job Description:
{job_description}

Provide analysis in the following format, with a blank line between sections:
Missing skills:
- one skill per line (required or preferred in the job description but absent from the resume)

Matching skills:
- one skill per line (found in both the resume and the job description)

Match percentage: NN%

Specific suggestions:
- one suggestion per line

Key areas:
- one area that needs attention per line";


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_substitutes_known_placeholders() {
        let filled = fill_template(
            REFACTOR_PROMPT_TEMPLATE,
            &[("template_prompt", "Be concise."), ("resume", "CV"), ("job_description", "JD")],
        );
        assert_eq!(filled, "Be concise.\n\nOriginal Resume:\nCV\n\nJob Description:\nJD");
    }

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let filled = fill_template(
            "Resume: {resume}\nJob: {job_description}",
            &[("resume", "I wrote {job_description} parsers"), ("job_description", "SRE")],
        );
        assert_eq!(filled, "Resume: I wrote {job_description} parsers\nJob: SRE");
    }

    #[test]
    fn test_fill_template_keeps_unknown_and_unclosed_braces() {
        assert_eq!(fill_template("{x} {y", &[("y", "1")]), "{x} {y");
        assert_eq!(fill_template("a {b} c", &[]), "a {b} c");
    }
}
