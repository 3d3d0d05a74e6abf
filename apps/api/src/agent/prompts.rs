// Prompt templates and fixed copy for the agent workflow.

/// System prompt for the coaching feedback call.
pub const CAREER_COACH_SYSTEM: &str =
    "You are a career coach providing feedback on job applications.";

/// Coaching feedback. Replace: {title}, {company}, {job_description}, {skills},
/// {experience}, {match_percentage}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = "Analyze this job application and provide feedback:

Job: {title} at {company}
Job Description: {job_description}
User Skills: {skills}
Experience: {experience}
Match Percentage: {match_percentage}%

Provide:
1. Why they're a good match
2. Areas for improvement
3. Specific suggestions
4. Confidence level (1-10)";

/// Application email body. Replace: {title}, {company}, {cover_letter}
pub const EMAIL_BODY_TEMPLATE: &str = "Dear Hiring Manager,

I am writing to express my interest in the {title} position at {company}.

{cover_letter}

I have attached my resume and cover letter for your review.

I look forward to discussing how my skills and experience can contribute to your team.

Best regards,
[Your Name]";

/// Manual apply instructions. Replace: {title}, {company}, {url}, {score},
/// {matching_skills}, {suggestions}
pub const APPLY_INSTRUCTIONS_TEMPLATE: &str = "To apply for {title} at {company}:

1. Click the job link: {url}
2. Upload your AI-enhanced resume and cover letter
3. Fill out the application form
4. Submit your application
5. Mark as applied in Linkivo for tracking

Your compatibility score: {score}%
Matching skills: {matching_skills}
Areas to highlight: {suggestions}";

pub const FALLBACK_MESSAGE: &str = "AI processing encountered an issue. Here are manual steps:";

pub const FALLBACK_STEPS: [&str; 4] = [
    "Review the job description manually",
    "Update your resume with relevant keywords",
    "Draft a cover letter highlighting your experience",
    "Apply through the company website",
];

pub const EMAIL_SETUP_MESSAGE: &str = "Connect Gmail to enable auto-email applications";
