use serde::{Deserialize, Serialize};
use survey_unlock_sdk::{SurveyStatus, UnlockTerms};

pub const MAX_QUESTIONS: usize = 5;
pub const MAX_TITLE_LEN: usize = 60;
pub const MIN_QUESTION_LEN: usize = 5;
pub const MAX_QUESTION_LEN: usize = 120;
pub const MAX_ANSWER_LEN: usize = 500;
pub const DEFAULT_TITLE: &str = "Untitled Survey";

/// Response collection window. Only 24 and 48 hours are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurveyDuration {
    #[default]
    Day,
    TwoDays,
}

impl SurveyDuration {
    /// Anything other than exactly 48 falls back to 24 hours.
    pub fn from_requested(hours: Option<i64>) -> Self {
        match hours {
            Some(48) => SurveyDuration::TwoDays,
            _ => SurveyDuration::Day,
        }
    }

    pub fn hours(self) -> i64 {
        match self {
            SurveyDuration::Day => 24,
            SurveyDuration::TwoDays => 48,
        }
    }

    pub fn seconds(self) -> i64 {
        self.hours() * 3600
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub duration_hours: i64,
    /// End of response collection (unix seconds)
    pub expires_at: i64,
    /// Explicit unlock deadline; derived from `expires_at` when absent
    pub unlock_deadline: Option<i64>,
    pub is_paid: bool,
    pub paid_at: Option<i64>,
    pub created_at: i64,
}

impl Survey {
    pub fn unlock_terms(&self) -> UnlockTerms {
        UnlockTerms {
            is_paid: self.is_paid,
            expires_at: Some(self.expires_at),
            unlock_deadline: self.unlock_deadline,
        }
    }

    pub fn can_unlock(&self, now: i64) -> bool {
        survey_unlock_sdk::can_unlock(&self.unlock_terms(), now)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    pub fn status(&self, now: i64) -> SurveyStatus {
        SurveyStatus::from_terms(&self.id, &self.unlock_terms(), self.paid_at, now)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub survey_id: String,
    pub text: String,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: String,
    pub survey_id: String,
    pub question_id: String,
    pub answer: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurvey {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration_hours: Option<i64>,
    #[serde(default)]
    pub questions: Vec<String>,
    /// Override for the derived unlock deadline (unix seconds)
    #[serde(default)]
    pub unlock_deadline: Option<i64>,
}

/// A validated survey ready to insert.
#[derive(Debug, Clone)]
pub struct NewSurvey {
    pub title: String,
    pub duration: SurveyDuration,
    pub questions: Vec<String>,
    pub unlock_deadline: Option<i64>,
}

impl CreateSurvey {
    /// Normalize and validate the request. Returns a message describing the
    /// first problem found.
    pub fn validate(self) -> Result<NewSurvey, String> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string();
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(format!("Title must be at most {} characters", MAX_TITLE_LEN));
        }

        let questions: Vec<String> = self
            .questions
            .iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();

        if questions.is_empty() {
            return Err("At least one question is required".into());
        }
        if questions.len() > MAX_QUESTIONS {
            return Err(format!("At most {} questions are allowed", MAX_QUESTIONS));
        }
        for (i, q) in questions.iter().enumerate() {
            let len = q.chars().count();
            if !(MIN_QUESTION_LEN..=MAX_QUESTION_LEN).contains(&len) {
                return Err(format!(
                    "Question {} must be between {} and {} characters",
                    i + 1,
                    MIN_QUESTION_LEN,
                    MAX_QUESTION_LEN
                ));
            }
        }

        if matches!(self.unlock_deadline, Some(d) if d <= 0) {
            return Err("unlockDeadline must be a positive unix timestamp".into());
        }

        Ok(NewSurvey {
            title,
            duration: SurveyDuration::from_requested(self.duration_hours),
            questions,
            unlock_deadline: self.unlock_deadline,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponses {
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}
