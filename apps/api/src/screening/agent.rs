//! Resume Analysis Agent — one per user session.
//!
//! Owns the session's resume text, retrieval index, latest analysis and the
//! temporary files written along the way. `analyze` is the only operation that
//! replaces the analysis state, and it commits only after every step succeeded.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::retrieval::chunking::{split_text, CHUNK_OVERLAP, CHUNK_SIZE};
use crate::retrieval::normalize::{normalize_replies, normalize_reply};
use crate::retrieval::{RetrievalBackend, RetrievalIndex};
use crate::screening::extractor::{extract_text, Document};
use crate::screening::jd_skills::extract_skills_from_jd;
use crate::screening::prompts::{
    improvement_prompt, rewrite_prompt, IMPROVEMENT_PARAMS, QUESTION_PARAMS, REWRITE_PARAMS,
};
use crate::screening::skill_scoring::{
    dedup_skills, score_skills, ScoringOptions, SkillAnalysisResult, DEFAULT_CUTOFF_SCORE,
    MAX_IN_FLIGHT,
};

/// Passages retrieved for a resume question.
const QUESTION_TOP_K: usize = 3;

/// Per-session knobs, usually taken from [`Config`].
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub cutoff_score: u32,
    pub scratch_dir: PathBuf,
    pub skill_query_timeout: Duration,
}

impl AgentSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cutoff_score: config.cutoff_score,
            scratch_dir: config.scratch_dir.clone(),
            skill_query_timeout: config.skill_query_timeout,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            cutoff_score: DEFAULT_CUTOFF_SCORE,
            scratch_dir: std::env::temp_dir(),
            skill_query_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImprovementSuggestions {
    pub suggestions: String,
}

/// Read-only view of a session for API callers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub cutoff_score: u32,
    pub analyzed: bool,
    pub resume_chars: usize,
    pub has_job_description: bool,
    pub required_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub latest_result: Option<SkillAnalysisResult>,
    pub created_at: DateTime<Utc>,
    pub last_analyzed_at: Option<DateTime<Utc>>,
    pub temp_files: usize,
}

pub struct ResumeAnalysisAgent {
    api_key: String,
    backend: Arc<dyn RetrievalBackend>,
    settings: AgentSettings,
    resume_text: Option<String>,
    retrieval_index: Option<Arc<RetrievalIndex>>,
    jd_text: Option<String>,
    required_skills: Vec<String>,
    latest_result: Option<SkillAnalysisResult>,
    /// Skills rated ≥ 7 in the latest analysis.
    strengths: Vec<String>,
    temp_files: Vec<PathBuf>,
    created_at: DateTime<Utc>,
    last_analyzed_at: Option<DateTime<Utc>>,
}

/// Everything `analyze` computes before it is committed to the session.
struct Analysis {
    resume_text: String,
    index: RetrievalIndex,
    jd_text: Option<String>,
    skills: Vec<String>,
    result: SkillAnalysisResult,
}

impl ResumeAnalysisAgent {
    /// `backend` must already be authenticated with `api_key`.
    pub fn new(api_key: String, backend: Arc<dyn RetrievalBackend>, settings: AgentSettings) -> Self {
        Self {
            api_key,
            backend,
            settings,
            resume_text: None,
            retrieval_index: None,
            jd_text: None,
            required_skills: Vec::new(),
            latest_result: None,
            strengths: Vec::new(),
            temp_files: Vec::new(),
            created_at: Utc::now(),
            last_analyzed_at: None,
        }
    }

    /// Re-authenticates the backend. A no-op when the key is unchanged.
    pub fn set_api_key(&mut self, api_key: &str) {
        if api_key == self.api_key {
            return;
        }
        self.backend = self.backend.with_api_key(api_key);
        self.api_key = api_key.to_string();
    }

    pub fn resume_text(&self) -> Option<&str> {
        self.resume_text.as_deref()
    }

    pub fn jd_text(&self) -> Option<&str> {
        self.jd_text.as_deref()
    }

    pub fn latest_result(&self) -> Option<&SkillAnalysisResult> {
        self.latest_result.as_ref()
    }

    pub fn strengths(&self) -> &[String] {
        &self.strengths
    }

    pub fn temp_files(&self) -> &[PathBuf] {
        &self.temp_files
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            cutoff_score: self.settings.cutoff_score,
            analyzed: self.is_analyzed(),
            resume_chars: self.resume_text().map_or(0, |t| t.chars().count()),
            has_job_description: self.jd_text().is_some(),
            required_skills: self.required_skills.clone(),
            strengths: self.strengths().to_vec(),
            latest_result: self.latest_result().cloned(),
            created_at: self.created_at,
            last_analyzed_at: self.last_analyzed_at,
            temp_files: self.temp_files().len(),
        }
    }

    fn is_analyzed(&self) -> bool {
        self.resume_text.is_some() && self.retrieval_index.is_some()
    }

    /// Screens a resume against either a custom job description (takes
    /// precedence) or a fixed skill list.
    ///
    /// On any error the previous resume text, index and result are kept.
    pub async fn analyze(
        &mut self,
        resume: &Document,
        role_skills: Option<&[String]>,
        custom_jd: Option<&Document>,
    ) -> Result<SkillAnalysisResult, AppError> {
        let analysis = self.run_analysis(resume, role_skills, custom_jd).await?;

        info!(
            "Analysis complete: {}% across {} skills (selected: {})",
            analysis.result.overall_score,
            analysis.result.skill_scores.len(),
            analysis.result.selected
        );

        self.resume_text = Some(analysis.resume_text);
        self.retrieval_index = Some(Arc::new(analysis.index));
        self.jd_text = analysis.jd_text;
        self.required_skills = analysis.skills;
        self.strengths = analysis.result.strengths.clone();
        self.latest_result = Some(analysis.result.clone());
        self.last_analyzed_at = Some(Utc::now());

        Ok(analysis.result)
    }

    async fn run_analysis(
        &mut self,
        resume: &Document,
        role_skills: Option<&[String]>,
        custom_jd: Option<&Document>,
    ) -> Result<Analysis, AppError> {
        let resume_text = extract_off_thread(resume).await;
        if resume_text.trim().is_empty() {
            warn!(
                "No text extracted from '{}'; scores will be degenerate",
                resume.file_name
            );
        }

        self.persist_resume_text(&resume_text)?;

        let (jd_text, skills) = match (custom_jd, role_skills) {
            (Some(jd), _) => {
                let jd_text = extract_off_thread(jd).await;
                let skills = extract_skills_from_jd(self.backend.as_ref(), &jd_text).await?;
                (Some(jd_text), skills)
            }
            (None, Some(skills)) if !skills.is_empty() => (None, skills.to_vec()),
            _ => {
                return Err(AppError::Validation(
                    "Select a role or upload a job description to analyze against".to_string(),
                ))
            }
        };
        let skills = dedup_skills(skills);

        let index = self
            .backend
            .build_index(
                split_text(&resume_text, CHUNK_SIZE, CHUNK_OVERLAP)
                    .into_iter()
                    .filter(|chunk| !chunk.trim().is_empty())
                    .collect(),
            )
            .await?;

        let options = ScoringOptions {
            cutoff_score: self.settings.cutoff_score,
            max_in_flight: MAX_IN_FLIGHT,
            query_timeout: self.settings.skill_query_timeout,
        };
        let result = score_skills(Arc::clone(&self.backend), &resume_text, &skills, options).await?;

        Ok(Analysis {
            resume_text,
            index,
            jd_text,
            skills,
            result,
        })
    }

    /// Answers a question from the three resume passages most relevant to it.
    pub async fn ask_question(&self, question: &str) -> Result<String, AppError> {
        let (Some(_), Some(index)) = (&self.resume_text, &self.retrieval_index) else {
            return Err(AppError::NotAnalyzed);
        };
        if question.trim().is_empty() {
            return Err(AppError::Validation("Question cannot be empty".to_string()));
        }

        let reply = self
            .backend
            .query(index, question, Some(QUESTION_TOP_K), QUESTION_PARAMS)
            .await?;

        Ok(normalize_replies(&reply).trim().to_string())
    }

    pub async fn improve_resume(
        &self,
        areas: &[String],
        target_role: &str,
    ) -> Result<ImprovementSuggestions, AppError> {
        let resume_text = self.resume_text.as_deref().ok_or(AppError::NotAnalyzed)?;
        if areas.is_empty() {
            return Err(AppError::Validation(
                "Choose at least one area to improve".to_string(),
            ));
        }

        let prompt = improvement_prompt(areas, target_role, resume_text);
        let reply = self.backend.generate(&prompt, IMPROVEMENT_PARAMS).await?;

        Ok(ImprovementSuggestions {
            suggestions: normalize_reply(&reply),
        })
    }

    /// Rewrites the resume for `target_role`. With no `highlight_skills`, the
    /// strengths found by the latest analysis are highlighted instead.
    pub async fn get_improved_resume(
        &self,
        target_role: &str,
        highlight_skills: &[String],
    ) -> Result<String, AppError> {
        let resume_text = self.resume_text.as_deref().ok_or(AppError::NotAnalyzed)?;
        let skills = if highlight_skills.is_empty() {
            self.strengths.as_slice()
        } else {
            highlight_skills
        };

        let prompt = rewrite_prompt(target_role, skills, resume_text);
        let reply = self.backend.generate(&prompt, REWRITE_PARAMS).await?;

        Ok(normalize_reply(&reply))
    }

    /// Interview question generation is not offered by the hosted backend.
    pub fn generate_interview_questions(&self) -> Result<Vec<String>, AppError> {
        Err(AppError::NotImplemented("Interview question generation"))
    }

    /// Deletes every temporary file this session created. Safe to call repeatedly.
    /// Returns how many files were removed.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.temp_files.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Could not remove temp file {}: {e}", path.display()),
            }
        }
        removed
    }

    /// Writes the extracted resume text to a session-owned file in the scratch dir.
    fn persist_resume_text(&mut self, text: &str) -> Result<PathBuf, AppError> {
        let path = write_scratch_file(&self.settings.scratch_dir, text)?;
        self.temp_files.push(path.clone());
        Ok(path)
    }
}

impl Drop for ResumeAnalysisAgent {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn write_scratch_file(dir: &Path, text: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create scratch dir {}", dir.display()))?;

    let mut file = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(".txt")
        .tempfile_in(dir)
        .context("Failed to create resume scratch file")?;
    file.write_all(text.as_bytes())
        .context("Failed to write resume scratch file")?;

    let (_, path) = file.keep().context("Failed to keep resume scratch file")?;
    Ok(path)
}

/// PDF parsing is CPU-bound; keep it off the async workers.
async fn extract_off_thread(document: &Document) -> String {
    let document = document.clone();
    let file_name = document.file_name.clone();
    tokio::task::spawn_blocking(move || extract_text(&document))
        .await
        .unwrap_or_else(|e| {
            error!("Text extraction for '{file_name}' did not complete: {e}");
            String::new()
        })
}
