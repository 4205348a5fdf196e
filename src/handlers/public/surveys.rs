use axum::{extract::State, http::StatusCode};
use serde::Serialize;
use survey_unlock_sdk::SurveyStatus;

use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path};
use crate::middleware::CurrentUser;
use crate::models::{CreateSurvey, Question, Response, Survey, User};
use crate::util::now;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSurvey {
    pub survey: Survey,
    pub questions: Vec<Question>,
}

/// Owner's view of a survey. Response bodies are present only once paid.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDetail {
    pub survey: Survey,
    pub status: SurveyStatus,
    pub questions: Vec<Question>,
    pub response_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<Response>>,
}

/// POST /api/surveys
pub async fn create_survey(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateSurvey>,
) -> Result<(StatusCode, Json<CreatedSurvey>)> {
    let user = user.require()?;
    let input = request.validate().map_err(AppError::BadRequest)?;

    let conn = state.db.get()?;
    let survey = queries::create_survey(&conn, &user.id, &input)?;
    let questions = queries::list_questions(&conn, &survey.id)?;

    tracing::info!(
        "Survey {} created by {} ({} questions, {}h)",
        survey.id,
        user.id,
        questions.len(),
        survey.duration_hours
    );

    Ok((StatusCode::CREATED, Json(CreatedSurvey { survey, questions })))
}

/// GET /api/surveys/{id}
pub async fn get_survey(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SurveyDetail>> {
    let user = user.require()?;
    let conn = state.db.get()?;
    let survey = owned_survey(&conn, &user, &id)?;

    let questions = queries::list_questions(&conn, &survey.id)?;
    let response_count = queries::count_responses(&conn, &survey.id)?;
    let responses = if survey.is_paid {
        Some(queries::list_responses(&conn, &survey.id)?)
    } else {
        None
    };

    Ok(Json(SurveyDetail {
        status: survey.status(now()),
        survey,
        questions,
        response_count,
        responses,
    }))
}

/// GET /api/surveys/{id}/status - committed paid flag, read by the unlock poller.
pub async fn get_survey_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SurveyStatus>> {
    let user = user.require()?;
    let conn = state.db.get()?;
    let survey = owned_survey(&conn, &user, &id)?;

    Ok(Json(survey.status(now())))
}

fn owned_survey(conn: &rusqlite::Connection, user: &User, id: &str) -> Result<Survey> {
    let survey = queries::get_survey_by_id(conn, id)?.or_not_found(msg::SURVEY_NOT_FOUND)?;
    if survey.owner_id != user.id {
        return Err(AppError::Forbidden(msg::NOT_SURVEY_OWNER.into()));
    }
    Ok(survey)
}
