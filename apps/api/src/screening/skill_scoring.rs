//! Skill Scoring Pipeline — rates a resume against a list of required skills.
//!
//! Flow: index the resume as one document → one proficiency query per skill,
//! at most `max_in_flight` at a time → parse a 0–10 score and reasoning from
//! each reply → aggregate into an overall percentage and a selection decision.
//!
//! A failed or timed-out skill query scores 0 with empty reasoning; it never
//! aborts the batch.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::retrieval::normalize::normalize_reply;
use crate::retrieval::{BackendError, RetrievalBackend, RetrievalIndex};
use crate::screening::prompts::{skill_query, SKILL_QUERY_PARAMS};

/// Simultaneous skill queries allowed against the backend.
pub const MAX_IN_FLIGHT: usize = 5;
pub const DEFAULT_CUTOFF_SCORE: u32 = 75;
pub const MAX_SKILL_SCORE: u8 = 10;
/// Skills at or below this score are reported as missing.
const MISSING_THRESHOLD: u8 = 5;
/// Skills at or above this score are reported as strengths.
const STRENGTH_THRESHOLD: u8 = 7;

static SCORE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{1,2}").expect("score pattern is valid"));

#[derive(Debug, Clone, Copy)]
pub struct ScoringOptions {
    pub cutoff_score: u32,
    pub max_in_flight: usize,
    pub query_timeout: Duration,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            cutoff_score: DEFAULT_CUTOFF_SCORE,
            max_in_flight: MAX_IN_FLIGHT,
            query_timeout: Duration::from_secs(60),
        }
    }
}

/// The parsed answer to one skill query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillQueryOutcome {
    pub skill: String,
    pub score: u8,
    pub reasoning: String,
}

impl SkillQueryOutcome {
    fn failed(skill: &str) -> Self {
        Self {
            skill: skill.to_string(),
            score: 0,
            reasoning: String::new(),
        }
    }
}

/// Skill-keyed mapping that keeps the order skills were requested in.
/// Serializes as a JSON object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkillMap<V>(Vec<(String, V)>);

impl<V> SkillMap<V> {
    #[allow(dead_code)]
    pub fn get(&self, skill: &str) -> Option<&V> {
        self.0.iter().find(|(s, _)| s == skill).map(|(_, v)| v)
    }

    #[allow(dead_code)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(s, _)| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> FromIterator<(String, V)> for SkillMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for SkillMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (skill, value) in &self.0 {
            map.serialize_entry(skill, value)?;
        }
        map.end()
    }
}

/// Outcome of screening one resume against a skill list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillAnalysisResult {
    /// 0 – 100
    pub overall_score: u32,
    pub skill_scores: SkillMap<u8>,
    pub skill_reasoning: SkillMap<String>,
    pub selected: bool,
    /// Skills scoring ≤ 5, in request order.
    pub missing_skills: Vec<String>,
    /// Skills scoring ≥ 7, in request order.
    pub strengths: Vec<String>,
}

/// Runs the full pipeline. Only index construction can fail; individual skill
/// queries degrade to a zero score.
///
/// Skills are scored as given: a repeated skill is queried twice and counted
/// twice in the average. Use [`dedup_skills`] first.
pub async fn score_skills(
    backend: Arc<dyn RetrievalBackend>,
    resume_text: &str,
    skills: &[String],
    options: ScoringOptions,
) -> Result<SkillAnalysisResult, BackendError> {
    // Blank text indexes nothing; queries then answer without passages.
    let document: Vec<String> = Some(resume_text)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .into_iter()
        .collect();
    let index = Arc::new(backend.build_index(document).await?);
    let semaphore = Arc::new(Semaphore::new(options.max_in_flight.max(1)));

    info!(
        "Scoring {} skills (max {} in flight)",
        skills.len(),
        options.max_in_flight
    );

    // Dropping the set aborts every query still pending.
    let mut tasks = JoinSet::new();
    for (position, skill) in skills.iter().enumerate() {
        let backend = Arc::clone(&backend);
        let index = Arc::clone(&index);
        let semaphore = Arc::clone(&semaphore);
        let skill = skill.clone();
        let timeout = options.query_timeout;

        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return (position, SkillQueryOutcome::failed(&skill));
            };
            (position, query_skill(backend.as_ref(), &index, &skill, timeout).await)
        });
    }

    let mut outcomes: Vec<SkillQueryOutcome> =
        skills.iter().map(|skill| SkillQueryOutcome::failed(skill)).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((position, outcome)) => outcomes[position] = outcome,
            Err(e) => warn!("Skill query task did not complete, scoring 0: {e}"),
        }
    }

    Ok(aggregate(outcomes, options.cutoff_score))
}

async fn query_skill(
    backend: &dyn RetrievalBackend,
    index: &RetrievalIndex,
    skill: &str,
    timeout: Duration,
) -> SkillQueryOutcome {
    let question = skill_query(skill);
    let reply = tokio::time::timeout(
        timeout,
        backend.query(index, &question, None, SKILL_QUERY_PARAMS),
    )
    .await
    .unwrap_or_else(|_| Err(BackendError::Timeout(timeout)));

    match reply {
        Ok(reply) => parse_skill_reply(skill, &normalize_reply(&reply)),
        Err(e) => {
            warn!("Skill query for '{skill}' failed, scoring 0: {e}");
            SkillQueryOutcome::failed(skill)
        }
    }
}

/// Heuristic reply parser.
///
/// Score: the first run of one or two ASCII digits anywhere in the reply,
/// capped at 10; 0 when there is none. Reasoning: everything after the first
/// period, trimmed; empty when there is no period.
///
/// This trusts the model to open with the score. A reply that mentions another
/// number first ("Given 5 years of experience, 8/10") is scored by that number.
pub fn parse_skill_reply(skill: &str, reply: &str) -> SkillQueryOutcome {
    let score = SCORE_PATTERN
        .find(reply)
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .unwrap_or(0)
        .min(MAX_SKILL_SCORE);

    let reasoning = reply
        .split_once('.')
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default();

    SkillQueryOutcome {
        skill: skill.to_string(),
        score,
        reasoning,
    }
}

/// overall = floor(100 × Σscores / (10 × n)); 0 for an empty skill list.
pub fn aggregate(outcomes: Vec<SkillQueryOutcome>, cutoff_score: u32) -> SkillAnalysisResult {
    let total: u64 = outcomes.iter().map(|o| u64::from(o.score)).sum();
    let max_total = u64::from(MAX_SKILL_SCORE) * outcomes.len() as u64;

    let overall_score = if max_total == 0 {
        0
    } else {
        (100 * total / max_total) as u32
    };

    let missing_skills = outcomes
        .iter()
        .filter(|o| o.score <= MISSING_THRESHOLD)
        .map(|o| o.skill.clone())
        .collect();
    let strengths = outcomes
        .iter()
        .filter(|o| o.score >= STRENGTH_THRESHOLD)
        .map(|o| o.skill.clone())
        .collect();

    let skill_scores = outcomes.iter().map(|o| (o.skill.clone(), o.score)).collect();
    let skill_reasoning = outcomes
        .into_iter()
        .map(|o| (o.skill, o.reasoning))
        .collect();

    SkillAnalysisResult {
        overall_score,
        skill_scores,
        skill_reasoning,
        selected: overall_score >= cutoff_score,
        missing_skills,
        strengths,
    }
}

/// Drops blank entries and repeats (case-insensitive), keeping first occurrences
/// in order.
pub fn dedup_skills<I, S>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}
