//! JD skill extraction — asks the backend which skills a job description requires.

use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::strip_json_fences;
use crate::retrieval::normalize::normalize_reply;
use crate::retrieval::RetrievalBackend;
use crate::screening::prompts::{jd_skills_prompt, JD_SKILLS_PARAMS};
use crate::screening::skill_scoring::dedup_skills;

/// Returns the de-duplicated, ordered skill list a job description asks for.
pub async fn extract_skills_from_jd(
    backend: &dyn RetrievalBackend,
    jd_text: &str,
) -> Result<Vec<String>, AppError> {
    if jd_text.trim().is_empty() {
        return Err(AppError::Validation(
            "The job description contains no readable text".to_string(),
        ));
    }

    let reply = backend
        .generate(&jd_skills_prompt(jd_text), JD_SKILLS_PARAMS)
        .await
        .map_err(|e| AppError::Llm(format!("JD skill extraction failed: {e}")))?;

    let skills = parse_skill_list(&normalize_reply(&reply));
    if skills.is_empty() {
        return Err(AppError::Validation(
            "No skills could be extracted from the job description".to_string(),
        ));
    }

    Ok(skills)
}

/// Accepts a JSON array, a `{"skills": [...]}` object, or plain lines / comma lists.
pub fn parse_skill_list(text: &str) -> Vec<String> {
    let body = strip_json_fences(text);

    let raw: Vec<String> = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => string_items(&items),
        Ok(Value::Object(fields)) => fields
            .get("skills")
            .and_then(Value::as_array)
            .map(|items| string_items(items))
            .unwrap_or_default(),
        _ => body
            .lines()
            .flat_map(|line| line.split(','))
            .map(strip_list_marker)
            .map(str::to_string)
            .collect(),
    };

    dedup_skills(raw)
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Strips bullets ("- ", "* ", "• ") and numbering ("1. ", "2) ").
fn strip_list_marker(item: &str) -> &str {
    let item = item.trim().trim_start_matches(['-', '*', '•']).trim_start();

    let digits = item.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &item[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return stripped.trim();
        }
    }

    item.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::fake::{FakeBackend, FakeResponse};

    #[test]
    fn test_parses_json_array() {
        let skills = parse_skill_list(r#"["Rust", "Kafka", "rust"]"#);
        assert_eq!(skills, vec!["Rust", "Kafka"]);
    }

    #[test]
    fn test_parses_fenced_json() {
        let skills = parse_skill_list("```json\n[\"Terraform\", \"AWS\"]\n```");
        assert_eq!(skills, vec!["Terraform", "AWS"]);
    }

    #[test]
    fn test_parses_skills_object() {
        let skills = parse_skill_list(r#"{"skills": ["SQL", "dbt"]}"#);
        assert_eq!(skills, vec!["SQL", "dbt"]);
    }

    #[test]
    fn test_falls_back_to_bulleted_lines() {
        let skills = parse_skill_list("- Python\n* Airflow, Spark\n3. 3D Modeling\n2) Git");
        assert_eq!(skills, vec!["Python", "Airflow", "Spark", "3D Modeling", "Git"]);
    }

    #[tokio::test]
    async fn test_extract_uses_backend_reply() {
        let fake = FakeBackend::replying(r#"["Go", "gRPC"]"#).build();
        let skills = extract_skills_from_jd(&fake, "Senior Go engineer, gRPC services")
            .await
            .unwrap();
        assert_eq!(skills, vec!["Go", "gRPC"]);
        assert!(fake.prompts()[0].contains("Senior Go engineer"));
    }

    #[tokio::test]
    async fn test_blank_jd_is_rejected_without_backend_call() {
        let fake = FakeBackend::replying("[]").build();
        let err = extract_skills_from_jd(&fake, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_extraction_is_rejected() {
        let fake = FakeBackend::replying("[]").build();
        let err = extract_skills_from_jd(&fake, "Some role").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_backend_failure_is_surfaced() {
        let fake = FakeBackend::replying("[]")
            .on("Job description", FakeResponse::Fail("quota".to_string()))
            .build();
        let err = extract_skills_from_jd(&fake, "Rust role").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(msg) if msg.contains("quota")));
    }
}
