use crate::model::{NewProblem, ProblemId, ProblemPatch, ProblemRecord};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("problem {0} not found")]
    NotFound(ProblemId),
}

struct Inner {
    next_id: ProblemId,
    // Ids only grow, so key order is insertion order.
    records: BTreeMap<ProblemId, ProblemRecord>,
}

/// In-memory problem records for the lifetime of the process.
///
/// All reads and writes take the same lock, so a create or a merge is one
/// critical section and concurrent callers never see a torn record.
pub struct ProblemStore {
    inner: Mutex<Inner>,
}

impl Default for ProblemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                records: BTreeMap::new(),
            }),
        }
    }

    pub fn create(&self, fields: NewProblem) -> ProblemRecord {
        debug_assert!(!fields.problem_text.is_empty());
        debug_assert!(!fields.template.is_empty());

        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        let now = Utc::now();
        let record = ProblemRecord {
            id,
            problem_text: fields.problem_text,
            image_url: fields.image_url,
            template: fields.template,
            topic: fields.topic,
            grade_level: fields.grade_level,
            rating: fields.rating,
            feedback: fields.feedback,
            created_at: now,
            updated_at: now,
        };
        inner.records.insert(id, record.clone());
        tracing::info!(id, "problem created");
        record
    }

    pub fn get(&self, id: ProblemId) -> Option<ProblemRecord> {
        self.inner.lock().records.get(&id).cloned()
    }

    pub fn update(&self, id: ProblemId, patch: ProblemPatch) -> Result<ProblemRecord, StoreError> {
        let mut inner = self.inner.lock();
        let Some(record) = inner.records.get_mut(&id) else {
            return Err(StoreError::NotFound(id));
        };

        let ProblemPatch {
            problem_text,
            image_url,
            template,
            topic,
            grade_level,
            rating,
            feedback,
        } = patch;

        if let Some(v) = problem_text {
            debug_assert!(!v.is_empty());
            record.problem_text = v;
        }
        if let Some(v) = image_url {
            record.image_url = Some(v);
        }
        if let Some(v) = template {
            debug_assert!(!v.is_empty());
            record.template = v;
        }
        if let Some(v) = topic {
            record.topic = v;
        }
        if let Some(v) = grade_level {
            record.grade_level = v;
        }
        if let Some(v) = rating {
            record.rating = Some(v);
        }
        if let Some(v) = feedback {
            record.feedback = v;
        }
        record.updated_at = Utc::now();

        tracing::info!(id, "problem updated");
        Ok(record.clone())
    }

    pub fn list(&self) -> Vec<ProblemRecord> {
        self.inner.lock().records.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }
}
