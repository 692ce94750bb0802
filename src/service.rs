use crate::analyzer::Analyzer;
use crate::image::{self, ImageError};
use crate::model::{NewProblem, ProblemId, ProblemPatch, ProblemRecord};
use crate::store::{ProblemStore, StoreError};
use crate::validate::{self, ValidationError};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("problem {0} not found")]
    NotFound(ProblemId),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("analysis failed: {0:#}")]
    Analysis(anyhow::Error),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ServiceError::NotFound(id),
        }
    }
}

/// The boundary operations: validate, then touch the store.
pub struct ProblemService {
    store: ProblemStore,
    analyzer: Box<dyn Analyzer>,
    max_image_bytes: usize,
}

impl ProblemService {
    pub fn new(store: ProblemStore, analyzer: Box<dyn Analyzer>, max_image_bytes: usize) -> Self {
        Self {
            store,
            analyzer,
            max_image_bytes,
        }
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    pub fn problem_count(&self) -> usize {
        self.store.len()
    }

    pub fn submit_problem(&self, params: &Value) -> Result<ProblemRecord, ServiceError> {
        let input = validate::problem_input(params).inspect_err(|e| {
            tracing::warn!(fields = ?e.fields().collect::<Vec<_>>(), "problem rejected");
        })?;

        let image = input
            .image_data
            .as_deref()
            .map(|raw| image::decode_image(raw, self.max_image_bytes))
            .transpose()
            .inspect_err(|e| tracing::warn!(error = %e, "image rejected"))?;

        let analysis = self
            .analyzer
            .analyze(&input.problem_text, image.as_ref())
            .map_err(ServiceError::Analysis)?;

        Ok(self.store.create(NewProblem {
            problem_text: input.problem_text,
            image_url: image.as_ref().map(|img| img.data_url()),
            template: analysis.template,
            topic: analysis.topic,
            grade_level: analysis.grade_level,
            rating: None,
            feedback: None,
        }))
    }

    pub fn get_problem(&self, params: &Value) -> Result<ProblemRecord, ServiceError> {
        let id = validate::problem_id(params)?;
        self.store.get(id).ok_or(ServiceError::NotFound(id))
    }

    /// Validation runs before the lookup, so rejected feedback never reaches
    /// the store even when the id is unknown. A submission replaces the
    /// whole rating form: no `feedback` means the stored comment is cleared.
    pub fn submit_feedback(&self, params: &Value) -> Result<ProblemRecord, ServiceError> {
        let (id, input) = match (
            validate::problem_id(params),
            validate::feedback_input(params),
        ) {
            (Ok(id), Ok(input)) => (id, input),
            (id, input) => {
                let issues = id
                    .err()
                    .into_iter()
                    .chain(input.err())
                    .flat_map(|e| e.issues)
                    .collect();
                let e = ValidationError { issues };
                tracing::warn!(fields = ?e.fields().collect::<Vec<_>>(), "feedback rejected");
                return Err(e.into());
            }
        };

        let patch = ProblemPatch {
            template: Some(input.template),
            rating: Some(input.rating),
            feedback: Some(input.feedback),
            ..ProblemPatch::default()
        };
        Ok(self.store.update(id, patch)?)
    }

    pub fn list_problems(&self) -> Vec<ProblemRecord> {
        self.store.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::MockAnalyzer;
    use crate::image::{ImageUpload, DEFAULT_MAX_IMAGE_BYTES};
    use crate::model::{Analysis, Rating};
    use serde_json::json;

    fn service() -> ProblemService {
        ProblemService::new(
            ProblemStore::new(),
            Box::new(MockAnalyzer),
            DEFAULT_MAX_IMAGE_BYTES,
        )
    }

    struct FailingAnalyzer;

    impl Analyzer for FailingAnalyzer {
        fn analyze(&self, _: &str, _: Option<&ImageUpload>) -> anyhow::Result<Analysis> {
            anyhow::bail!("backend offline")
        }
    }

    #[test]
    fn submit_then_get() {
        let svc = service();
        let created = svc
            .submit_problem(&json!({ "problemText": "2+2=?" }))
            .expect("submit");
        assert_eq!(created.id, 1);
        assert!(!created.template.is_empty());
        assert_eq!(created.topic, "Algebra");
        assert_eq!(created.grade_level, "Grade 8");
        assert_eq!(created.image_url, None);
        assert_eq!(created.rating, None);

        let fetched = svc.get_problem(&json!({ "id": 1 })).expect("get");
        assert_eq!(fetched, created);
    }

    #[test]
    fn feedback_updates_template_and_rating() {
        let svc = service();
        let created = svc
            .submit_problem(&json!({ "problemText": "2+2=?" }))
            .expect("submit");

        svc.submit_feedback(&json!({ "id": 1, "template": "Step 1: count", "rating": 3 }))
            .expect("feedback");

        let after = svc.get_problem(&json!({ "id": 1 })).expect("get");
        assert_eq!(after.id, created.id);
        assert_eq!(after.topic, created.topic);
        assert_eq!(after.template, "Step 1: count");
        assert_eq!(after.rating, Rating::new(3));
        assert_eq!(after.feedback, None);
    }

    #[test]
    fn feedback_without_comment_clears_previous_comment() {
        let svc = service();
        let created = svc.submit_problem(&json!({ "problemText": "x" })).expect("submit");
        let first = svc
            .submit_feedback(&json!({ "id": 1, "template": "a", "rating": 2, "feedback": "meh" }))
            .expect("first");
        assert_eq!(first.feedback.as_deref(), Some("meh"));

        let second = svc
            .submit_feedback(&json!({ "id": 1, "template": "b", "rating": 4 }))
            .expect("second");
        assert_eq!(second.feedback, None);
        assert_eq!(second.rating, Rating::new(4));
        assert_eq!(second.template, "b");
        assert_eq!(second.topic, created.topic);
        assert_eq!(svc.get_problem(&json!({ "id": 1 })).expect("get"), second);
    }

    #[test]
    fn out_of_range_rating_leaves_record_unchanged() {
        let svc = service();
        let created = svc.submit_problem(&json!({ "problemText": "x" })).expect("submit");

        let err = svc
            .submit_feedback(&json!({ "id": 1, "template": "new", "rating": 7 }))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.get_problem(&json!({ "id": 1 })).expect("get"), created);
    }

    #[test]
    fn unknown_ids() {
        let svc = service();
        assert!(matches!(
            svc.get_problem(&json!({ "id": 999 })),
            Err(ServiceError::NotFound(999))
        ));
        assert!(matches!(
            svc.submit_feedback(&json!({ "id": 999, "template": "t", "rating": 1 })),
            Err(ServiceError::NotFound(999))
        ));
    }

    #[test]
    fn feedback_validation_beats_not_found() {
        let svc = service();
        let err = svc
            .submit_feedback(&json!({ "id": "nope", "template": "", "rating": 0 }))
            .unwrap_err();
        let v = match err {
            ServiceError::Validation(v) => v,
            other => panic!("expected validation error, got {other:?}"),
        };
        assert_eq!(v.fields().collect::<Vec<_>>(), vec!["id", "template", "rating"]);
    }

    #[test]
    fn image_is_stored_as_data_url() {
        let svc = service();
        let rec = svc
            .submit_problem(&json!({ "problemText": "area?", "imageData": "aGVsbG8=" }))
            .expect("submit");
        assert_eq!(rec.image_url.as_deref(), Some("data:image/jpeg;base64,aGVsbG8="));
    }

    #[test]
    fn oversize_image_creates_nothing() {
        let svc = ProblemService::new(ProblemStore::new(), Box::new(MockAnalyzer), 4);
        let err = svc
            .submit_problem(&json!({ "problemText": "x", "imageData": "aGVsbG8=" }))
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Image(ImageError::PayloadTooLarge { size: 5, limit: 4 })
        ));
        assert_eq!(svc.problem_count(), 0);
    }

    #[test]
    fn analyzer_failure_creates_nothing() {
        let svc = ProblemService::new(
            ProblemStore::new(),
            Box::new(FailingAnalyzer),
            DEFAULT_MAX_IMAGE_BYTES,
        );
        let err = svc.submit_problem(&json!({ "problemText": "x" })).unwrap_err();
        assert!(matches!(err, ServiceError::Analysis(_)));
        assert!(err.to_string().contains("backend offline"));
        assert!(svc.list_problems().is_empty());
    }
}
