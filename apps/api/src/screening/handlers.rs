//! Axum route handlers for the Screening API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::agent::{
    AgentSettings, ImprovementSuggestions, ResumeAnalysisAgent, SessionSummary,
};
use crate::screening::extractor::Document;
use crate::screening::roles::{list_roles, role_skills, RoleSummary};
use crate::screening::skill_scoring::SkillAnalysisResult;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub cutoff_score: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub cutoff_score: u32,
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub areas: Vec<String>,
    pub target_role: String,
}

#[derive(Debug, Deserialize)]
pub struct ImprovedResumeRequest {
    pub target_role: String,
    #[serde(default)]
    pub highlight_skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ImprovedResumeResponse {
    pub resume: String,
}

/// Multipart body of an analyze request.
#[derive(Debug, Default)]
struct AnalyzeForm {
    resume: Option<Document>,
    job_description: Option<Document>,
    role: Option<String>,
}

impl AnalyzeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AnalyzeForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume" | "job_description" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?;
                    if bytes.is_empty() {
                        continue;
                    }
                    let document = Document::new(file_name, bytes);
                    if name == "resume" {
                        form.resume = Some(document);
                    } else {
                        form.job_description = Some(document);
                    }
                }
                "role" => {
                    let role = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?;
                    form.role = Some(role).filter(|r| !r.trim().is_empty());
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/roles
pub async fn handle_list_roles() -> Json<Vec<RoleSummary>> {
    Json(list_roles())
}

/// POST /api/v1/sessions
///
/// Opens a screening session. The request key wins over the configured default.
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let api_key = request
        .api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| state.config.default_api_key.clone())
        .ok_or_else(|| AppError::Validation("Please enter your API key".to_string()))?;

    let mut settings = AgentSettings::from_config(&state.config);
    if let Some(cutoff) = request.cutoff_score {
        if cutoff > 100 {
            return Err(AppError::Validation(
                "cutoff_score must be between 0 and 100".to_string(),
            ));
        }
        settings.cutoff_score = cutoff;
    }
    let cutoff_score = settings.cutoff_score;

    let backend = state.backend.with_api_key(&api_key);
    let agent = ResumeAnalysisAgent::new(api_key, backend, settings);
    let session_id = state.sessions.insert(agent).await;

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            cutoff_score,
        }),
    ))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let agent = state.sessions.get(session_id).await?;
    let summary = agent.lock().await.summary();
    Ok(Json(summary))
}

/// PUT /api/v1/sessions/:id/api-key
pub async fn handle_set_api_key(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ApiKeyRequest>,
) -> Result<StatusCode, AppError> {
    if request.api_key.trim().is_empty() {
        return Err(AppError::Validation("api_key cannot be empty".to_string()));
    }
    let agent = state.sessions.get(session_id).await?;
    agent.lock().await.set_api_key(&request.api_key);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/analyze
///
/// Multipart fields: `resume` (file, required), `job_description` (file) or
/// `role` (catalog role name). A job description wins over a role.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<SkillAnalysisResult>, AppError> {
    let form = AnalyzeForm::read(multipart).await?;
    let resume = form
        .resume
        .ok_or_else(|| AppError::Validation("Please upload a resume".to_string()))?;

    let role_skills = match (&form.job_description, &form.role) {
        (None, Some(role)) => Some(
            role_skills(role)
                .ok_or_else(|| AppError::Validation(format!("Unknown role '{role}'")))?,
        ),
        _ => None,
    };

    let agent = state.sessions.get(session_id).await?;
    let mut agent = agent.lock().await;
    let result = agent
        .analyze(&resume, role_skills.as_deref(), form.job_description.as_ref())
        .await?;

    Ok(Json(result))
}

/// POST /api/v1/sessions/:id/questions
pub async fn handle_ask_question(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<QuestionResponse>, AppError> {
    let agent = state.sessions.get(session_id).await?;
    let answer = agent.lock().await.ask_question(&request.question).await?;
    Ok(Json(QuestionResponse { answer }))
}

/// POST /api/v1/sessions/:id/improvements
pub async fn handle_improve_resume(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ImproveRequest>,
) -> Result<Json<ImprovementSuggestions>, AppError> {
    let agent = state.sessions.get(session_id).await?;
    let suggestions = agent
        .lock()
        .await
        .improve_resume(&request.areas, &request.target_role)
        .await?;
    Ok(Json(suggestions))
}

/// POST /api/v1/sessions/:id/improved-resume
///
/// Returns the rewritten resume as plain text inside JSON, ready for download.
pub async fn handle_improved_resume(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ImprovedResumeRequest>,
) -> Result<Json<ImprovedResumeResponse>, AppError> {
    let agent = state.sessions.get(session_id).await?;
    let resume = agent
        .lock()
        .await
        .get_improved_resume(&request.target_role, &request.highlight_skills)
        .await?;
    Ok(Json(ImprovedResumeResponse { resume }))
}

/// POST /api/v1/sessions/:id/interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<String>>, AppError> {
    let agent = state.sessions.get(session_id).await?;
    let questions = agent.lock().await.generate_interview_questions()?;
    Ok(Json(questions))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.close(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
