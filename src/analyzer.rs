use crate::image::ImageUpload;
use crate::model::Analysis;

/// Turns a submitted problem into a solution template.
///
/// Implementations must be deterministic enough for users to rate the result;
/// failures are reported to the caller and nothing is stored.
pub trait Analyzer: Send + Sync {
    fn analyze(
        &self,
        problem_text: &str,
        image: Option<&ImageUpload>,
    ) -> anyhow::Result<Analysis>;
}

/// Fixed three-step template. Stands in until a real analysis backend exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAnalyzer;

impl Analyzer for MockAnalyzer {
    fn analyze(
        &self,
        problem_text: &str,
        image: Option<&ImageUpload>,
    ) -> anyhow::Result<Analysis> {
        if let Some(img) = image {
            tracing::debug!(mime = %img.mime, bytes = img.len(), "mock analyzer ignores image");
        }
        Ok(Analysis {
            template: format!(
                "Step 1: {problem_text}\nStep 2: Solve using appropriate method\nStep 3: Verify answer"
            ),
            topic: "Algebra".to_string(),
            grade_level: "Grade 8".to_string(),
        })
    }
}
