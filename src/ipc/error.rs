use crate::image::ImageError;
use crate::service::ServiceError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Map a service failure onto its stable wire code.
pub fn service_err(id: &str, e: &ServiceError) -> serde_json::Value {
    match e {
        ServiceError::Validation(v) => err(
            id,
            "bad_params",
            v.to_string(),
            Some(json!({ "fields": v.issues })),
        ),
        ServiceError::NotFound(problem_id) => err(
            id,
            "not_found",
            "problem not found",
            Some(json!({ "id": problem_id })),
        ),
        ServiceError::Image(ImageError::PayloadTooLarge { size, limit }) => err(
            id,
            "payload_too_large",
            e.to_string(),
            Some(json!({ "size": size, "limit": limit })),
        ),
        ServiceError::Image(ImageError::Unreadable(_)) => err(id, "bad_image", e.to_string(), None),
        ServiceError::Analysis(_) => err(id, "analysis_failed", e.to_string(), None),
    }
}
