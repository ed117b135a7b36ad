//! Boundary parse for recommendation requests.
//!
//! The body is inspected once and turned into a tagged `RecommendationRequest`;
//! nothing downstream looks at the raw JSON again.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::AppError;

pub const INVALID_SHAPE_MESSAGE: &str =
    "Invalid request. Please provide either interests or resume data.";
const INVALID_RESUME_MESSAGE: &str = "Invalid resume data";
const INVALID_INTERESTS_MESSAGE: &str = "Invalid input data";

/// What gets forwarded to the recommender. Serialises with a `type` tag:
/// `{"type": "interests", "interests": [...]}` or `{"type": "resume", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecommendationRequest {
    Interests { interests: Vec<String> },
    Resume(ResumeProfile),
}

/// Resume-derived profile, usually built by the client from a parse result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeProfile {
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub experience: Vec<String>,
    pub projects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<String>>,
    /// Absent is omitted on the wire; an explicit `null` is relayed as `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResumeBody {
    skills: Vec<String>,
    interests: Vec<String>,
    experience: Vec<String>,
    projects: Vec<String>,
    #[serde(default, deserialize_with = "present")]
    education: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    location: Option<Option<String>>,
    #[serde(default, rename = "type")]
    #[allow(dead_code)]
    kind: Option<ResumeTag>,
}

#[derive(Debug, Deserialize)]
enum ResumeTag {
    #[serde(rename = "resume")]
    Resume,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InterestsBody {
    interests: Vec<String>,
}

impl RecommendationRequest {
    /// Branches on shape: truthy `skills` and `interests` → resume, truthy
    /// `interests` alone → interests, anything else is rejected.
    pub fn from_body(body: Value) -> Result<Self, AppError> {
        let (has_skills, has_interests) = match &body {
            Value::Object(fields) => (
                fields.get("skills").is_some_and(is_truthy),
                fields.get("interests").is_some_and(is_truthy),
            ),
            _ => return Err(AppError::invalid_request(INVALID_SHAPE_MESSAGE)),
        };

        if has_skills && has_interests {
            let body: ResumeBody = serde_json::from_value(body)
                .map_err(|e| invalid(INVALID_RESUME_MESSAGE, e.to_string()))?;
            let profile = ResumeProfile {
                skills: body.skills,
                interests: body.interests,
                experience: body.experience,
                projects: body.projects,
                education: body.education,
                location: body.location,
            };
            profile
                .check_items()
                .map_err(|detail| invalid(INVALID_RESUME_MESSAGE, detail))?;
            Ok(RecommendationRequest::Resume(profile))
        } else if has_interests {
            let body: InterestsBody = serde_json::from_value(body)
                .map_err(|e| invalid(INVALID_INTERESTS_MESSAGE, e.to_string()))?;
            if body.interests.is_empty() {
                return Err(invalid(
                    INVALID_INTERESTS_MESSAGE,
                    "\"interests\" must contain at least 1 item".to_string(),
                ));
            }
            check_items("interests", &body.interests)
                .map_err(|detail| invalid(INVALID_INTERESTS_MESSAGE, detail))?;
            Ok(RecommendationRequest::Interests {
                interests: body.interests,
            })
        } else {
            Err(AppError::invalid_request(INVALID_SHAPE_MESSAGE))
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RecommendationRequest::Interests { .. } => "interests",
            RecommendationRequest::Resume(_) => "resume",
        }
    }
}

impl ResumeProfile {
    fn check_items(&self) -> Result<(), String> {
        check_items("skills", &self.skills)?;
        check_items("interests", &self.interests)?;
        check_items("experience", &self.experience)?;
        check_items("projects", &self.projects)?;
        if let Some(education) = &self.education {
            check_items("education", education)?;
        }
        if let Some(Some(location)) = &self.location {
            if location.is_empty() {
                return Err("\"location\" is not allowed to be empty".to_string());
            }
        }
        Ok(())
    }
}

/// Wraps a field that was present in the body, so `null` only gets through
/// where the inner type accepts it.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn check_items(field: &str, items: &[String]) -> Result<(), String> {
    match items.iter().position(|item| item.is_empty()) {
        Some(index) => Err(format!("\"{field}[{index}]\" is not allowed to be empty")),
        None => Ok(()),
    }
}

fn invalid(message: &str, detail: String) -> AppError {
    AppError::InvalidRequest {
        message: message.to_string(),
        detail: Some(detail),
    }
}

/// JavaScript-style truthiness; empty arrays still count as present.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
