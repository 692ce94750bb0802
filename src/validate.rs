//! Boundary checks for request params.
//!
//! Every check collects all offending fields before failing so callers can
//! surface one complete list of problems.

use crate::model::{ProblemId, Rating};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub code: &'static str,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: {}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|i| i.field.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemInput {
    pub problem_text: String,
    pub image_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackInput {
    pub template: String,
    pub rating: Rating,
    pub feedback: Option<String>,
}

#[derive(Default)]
struct Issues(Vec<FieldIssue>);

impl Issues {
    fn push(&mut self, field: &str, code: &'static str, message: impl Into<String>) {
        self.0.push(FieldIssue::new(field, code, message));
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationError> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(ValidationError { issues: self.0 })
        }
    }
}

fn required_text(params: &Value, field: &str, issues: &mut Issues) -> Option<String> {
    match params.get(field) {
        None | Some(Value::Null) => {
            issues.push(field, "required", format!("{field} is required"));
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            issues.push(field, "too_short", format!("{field} must not be empty"));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            issues.push(field, "type", format!("{field} must be a string"));
            None
        }
    }
}

fn optional_text(params: &Value, field: &str, issues: &mut Issues) -> Option<String> {
    match params.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            issues.push(field, "type", format!("{field} must be a string"));
            None
        }
    }
}

fn required_rating(params: &Value, field: &str, issues: &mut Issues) -> Option<Rating> {
    let raw = match params.get(field) {
        None | Some(Value::Null) => {
            issues.push(field, "required", format!("{field} is required"));
            return None;
        }
        Some(Value::Number(n)) => n,
        Some(_) => {
            issues.push(field, "type", format!("{field} must be a number"));
            return None;
        }
    };

    // Integers of any width are range errors; only fractions are not_integer.
    let rating = if let Some(i) = raw.as_i64() {
        u8::try_from(i).ok().and_then(Rating::new)
    } else if let Some(u) = raw.as_u64() {
        u8::try_from(u).ok().and_then(Rating::new)
    } else {
        match raw.as_f64() {
            Some(f) if f.fract() == 0.0 => {
                if (f64::from(Rating::MIN)..=f64::from(Rating::MAX)).contains(&f) {
                    Rating::new(f as u8)
                } else {
                    None
                }
            }
            _ => {
                issues.push(field, "not_integer", format!("{field} must be an integer"));
                return None;
            }
        }
    };

    if rating.is_none() {
        issues.push(
            field,
            "out_of_range",
            format!(
                "{field} must be between {} and {}",
                Rating::MIN,
                Rating::MAX
            ),
        );
    }
    rating
}

pub fn problem_input(params: &Value) -> Result<ProblemInput, ValidationError> {
    let mut issues = Issues::default();
    let problem_text = required_text(params, "problemText", &mut issues);
    let image_data = optional_text(params, "imageData", &mut issues);
    issues.finish(|| ProblemInput {
        problem_text: problem_text.unwrap_or_default(),
        image_data,
    })
}

pub fn feedback_input(params: &Value) -> Result<FeedbackInput, ValidationError> {
    let mut issues = Issues::default();
    let template = required_text(params, "template", &mut issues);
    let rating = required_rating(params, "rating", &mut issues);
    let feedback = optional_text(params, "feedback", &mut issues);
    match rating {
        Some(rating) => issues.finish(|| FeedbackInput {
            template: template.unwrap_or_default(),
            rating,
            feedback,
        }),
        None => Err(ValidationError { issues: issues.0 }),
    }
}

enum IdValue {
    Unsigned(u64),
    Negative,
    NotInteger,
}

fn classify_id(value: &Value) -> Option<IdValue> {
    match value {
        Value::Number(n) => Some(match (n.as_u64(), n.as_i64()) {
            (Some(u), _) => IdValue::Unsigned(u),
            (None, Some(_)) => IdValue::Negative,
            _ => IdValue::NotInteger,
        }),
        Value::String(s) => {
            let s = s.trim();
            Some(match (s.parse::<u64>(), s.parse::<i64>()) {
                (Ok(u), _) => IdValue::Unsigned(u),
                (Err(_), Ok(_)) => IdValue::Negative,
                _ => IdValue::NotInteger,
            })
        }
        _ => None,
    }
}

/// Record id, given as a JSON integer or a decimal string.
pub fn problem_id(params: &Value) -> Result<ProblemId, ValidationError> {
    let mut issues = Issues::default();
    match params.get("id") {
        None | Some(Value::Null) => issues.push("id", "required", "id is required"),
        Some(v) => match classify_id(v) {
            Some(IdValue::Unsigned(id)) if id >= 1 => return Ok(id),
            Some(IdValue::Unsigned(_)) | Some(IdValue::Negative) => {
                issues.push("id", "out_of_range", "id must be a positive integer")
            }
            Some(IdValue::NotInteger) | None => {
                issues.push("id", "type", "id must be an integer")
            }
        },
    }
    issues.finish(|| 0)
}
