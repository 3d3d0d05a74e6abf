use std::collections::BTreeMap;

use serde::Serialize;

/// A rewrite style: display metadata plus the instruction sent to the LLM.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Template {
    #[serde(skip)]
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub prompt: &'static str,
}

pub const RESUME_TEMPLATES: &[Template] = &[
    Template {
        key: "modern",
        name: "Modern Professional",
        description: "Clean, ATS-friendly format with strong action verbs",
        prompt: "Rewrite this resume in a modern, professional format that's ATS-friendly.",
    },
    Template {
        key: "executive",
        name: "Executive Level",
        description: "Senior-level format emphasizing leadership and strategy",
        prompt: "Transform this resume into an executive-level format.",
    },
    Template {
        key: "creative",
        name: "Creative Professional",
        description: "Innovative format for creative and design roles",
        prompt: "Rewrite this resume with a creative, innovative approach.",
    },
    Template {
        key: "technical",
        name: "Technical Specialist",
        description: "Tech-focused format emphasizing technical skills and projects",
        prompt: "Transform this resume into a technical specialist format.",
    },
];

pub const COVER_LETTER_TEMPLATES: &[Template] = &[
    Template {
        key: "standard",
        name: "Standard Professional",
        description: "Traditional cover letter format",
        prompt: "Write a professional cover letter for this job application.",
    },
    Template {
        key: "creative",
        name: "Creative Approach",
        description: "Innovative and engaging cover letter",
        prompt: "Write a creative and engaging cover letter that stands out.",
    },
    Template {
        key: "technical",
        name: "Technical Focus",
        description: "Technical cover letter emphasizing skills and projects",
        prompt: "Write a technical cover letter that emphasizes your technical skills.",
    },
];

/// Looks up a resume template; unknown keys get the first (modern) template.
pub fn resume_template(key: &str) -> &'static Template {
    find(RESUME_TEMPLATES, key)
}

/// Looks up a cover letter template; unknown keys get the first (standard) template.
pub fn cover_letter_template(key: &str) -> &'static Template {
    find(COVER_LETTER_TEMPLATES, key)
}

/// Both template families keyed by template key, as served by `GET /templates`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCatalog {
    pub resume_templates: BTreeMap<&'static str, &'static Template>,
    pub cover_letter_templates: BTreeMap<&'static str, &'static Template>,
}

pub fn template_catalog() -> TemplateCatalog {
    fn keyed(templates: &'static [Template]) -> BTreeMap<&'static str, &'static Template> {
        templates.iter().map(|t| (t.key, t)).collect()
    }
    TemplateCatalog {
        resume_templates: keyed(RESUME_TEMPLATES),
        cover_letter_templates: keyed(COVER_LETTER_TEMPLATES),
    }
}

fn find(templates: &'static [Template], key: &str) -> &'static Template {
    templates
        .iter()
        .find(|t| t.key.eq_ignore_ascii_case(key))
        .unwrap_or(&templates[0])
}
