// All LLM prompt templates for the screening module.
// The grounded QA wrapper used by retrieval queries lives in llm_client::prompts.

use crate::llm_client::GenerationParams;

pub const SKILL_QUERY_PARAMS: GenerationParams = GenerationParams::new(0.7, 300);
pub const QUESTION_PARAMS: GenerationParams = GenerationParams::new(0.6, 400);
pub const IMPROVEMENT_PARAMS: GenerationParams = GenerationParams::new(0.7, 500);
pub const REWRITE_PARAMS: GenerationParams = GenerationParams::new(0.5, 800);
pub const JD_SKILLS_PARAMS: GenerationParams = GenerationParams::new(0.2, 500);

/// Per-skill proficiency question. Replace `{skill}` before sending.
/// The reply is parsed for a leading score followed by a sentence break.
pub const SKILL_QUERY_TEMPLATE: &str = "Rate proficiency in {skill} on a 0-10 scale and explain. \
    Start your answer with the number followed by a period.";

/// Skill extraction from a job description. Replace `{jd_text}` before sending.
pub const JD_SKILLS_PROMPT_TEMPLATE: &str = r#"Extract the technical and professional skills this job description requires.

Return a JSON array of short skill names, most important first, for example:
["Python", "Kubernetes", "Stakeholder Management"]

Do NOT include any text outside the JSON array.
Do NOT use markdown code fences.

Job description:
{jd_text}"#;

/// Replace `{areas}`, `{target_role}` and `{resume_text}` before sending.
pub const IMPROVEMENT_PROMPT_TEMPLATE: &str = "Suggest improvements in these areas: {areas} \
    for making the resume more suitable for a {target_role} role.\n\n\
    Resume content:\n{resume_text}";

/// Replace `{target_role}`, `{skills}` and `{resume_text}` before sending.
pub const REWRITE_PROMPT_TEMPLATE: &str = "Rewrite the resume to improve its alignment for a {target_role} role. \
    Highlight these skills: {skills}.\n\n\
    Resume content:\n{resume_text}";

pub fn skill_query(skill: &str) -> String {
    SKILL_QUERY_TEMPLATE.replace("{skill}", skill)
}

pub fn jd_skills_prompt(jd_text: &str) -> String {
    JD_SKILLS_PROMPT_TEMPLATE.replace("{jd_text}", jd_text)
}

pub fn improvement_prompt(areas: &[String], target_role: &str, resume_text: &str) -> String {
    IMPROVEMENT_PROMPT_TEMPLATE
        .replace("{areas}", &areas.join(", "))
        .replace("{target_role}", target_role)
        .replace("{resume_text}", resume_text)
}

pub fn rewrite_prompt(target_role: &str, skills: &[String], resume_text: &str) -> String {
    REWRITE_PROMPT_TEMPLATE
        .replace("{target_role}", target_role)
        .replace("{skills}", &skills.join(", "))
        .replace("{resume_text}", resume_text)
}
