use std::collections::HashSet;

use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path};
use crate::models::{MAX_ANSWER_LEN, Question, SubmitResponses};
use crate::util::{now, truncate_chars};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSurvey {
    pub id: String,
    pub title: String,
    pub expires_at: i64,
    pub is_expired: bool,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResult {
    pub accepted: usize,
}

/// GET /api/s/{id} - what a respondent sees. No owner or payment fields.
pub async fn get_public_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicSurvey>> {
    let conn = state.db.get()?;
    let survey = queries::get_survey_by_id(&conn, &id)?.or_not_found(msg::SURVEY_NOT_FOUND)?;
    let questions = queries::list_questions(&conn, &survey.id)?;

    Ok(Json(PublicSurvey {
        is_expired: survey.is_expired(now()),
        id: survey.id,
        title: survey.title,
        expires_at: survey.expires_at,
        questions,
    }))
}

/// POST /api/s/{id}/responses - anonymous submission.
///
/// Answers are trimmed and capped at 500 characters; blank answers and
/// answers to questions not on this survey are dropped.
pub async fn submit_responses(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SubmitResponses>,
) -> Result<(StatusCode, Json<SubmitResult>)> {
    let conn = state.db.get()?;
    let survey = queries::get_survey_by_id(&conn, &id)?.or_not_found(msg::SURVEY_NOT_FOUND)?;

    if survey.is_expired(now()) {
        return Err(AppError::SurveyExpired);
    }

    let question_ids: HashSet<String> = queries::list_questions(&conn, &survey.id)?
        .into_iter()
        .map(|q| q.id)
        .collect();

    let mut seen = HashSet::new();
    let answers: Vec<(String, String)> = request
        .answers
        .into_iter()
        .filter(|a| question_ids.contains(&a.question_id))
        .filter_map(|a| {
            let answer = truncate_chars(a.answer.trim(), MAX_ANSWER_LEN);
            (!answer.is_empty()).then_some((a.question_id, answer))
        })
        // One answer per question per submission
        .filter(|(qid, _)| seen.insert(qid.clone()))
        .collect();

    if answers.is_empty() {
        return Err(AppError::BadRequest(msg::NO_ANSWERS.into()));
    }

    let accepted = queries::create_responses(&conn, &survey.id, &answers)?;
    tracing::debug!("Stored {} answers for survey {}", accepted, survey.id);

    Ok((StatusCode::CREATED, Json(SubmitResult { accepted })))
}
