use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ProblemId = u64;

/// Star rating attached to a template. Only values in `1..=5` can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value).ok_or_else(|| {
            format!(
                "rating must be between {} and {}, got {value}",
                Rating::MIN,
                Rating::MAX
            )
        })
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> Self {
        r.get()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRecord {
    pub id: ProblemId,
    pub problem_text: String,
    pub image_url: Option<String>,
    pub template: String,
    pub topic: String,
    pub grade_level: String,
    pub rating: Option<Rating>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything a record holds except the fields the store assigns.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProblem {
    pub problem_text: String,
    pub image_url: Option<String>,
    pub template: String,
    pub topic: String,
    pub grade_level: String,
    pub rating: Option<Rating>,
    pub feedback: Option<String>,
}

/// Partial update. `None` leaves the stored value untouched.
///
/// `feedback` is nested: `Some(None)` clears the stored comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemPatch {
    pub problem_text: Option<String>,
    pub image_url: Option<String>,
    pub template: Option<String>,
    pub topic: Option<String>,
    pub grade_level: Option<String>,
    pub rating: Option<Rating>,
    pub feedback: Option<Option<String>>,
}

/// Output of an [`crate::analyzer::Analyzer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub template: String,
    pub topic: String,
    pub grade_level: String,
}
