// Resume screening: text extraction, skill scoring, JD skill extraction,
// the per-session analysis agent and its HTTP handlers.
// All model calls go through the retrieval backend — no direct LLM client calls here.

pub mod agent;
pub mod extractor;
pub mod handlers;
pub mod jd_skills;
pub mod prompts;
pub mod roles;
pub mod sessions;
pub mod skill_scoring;
