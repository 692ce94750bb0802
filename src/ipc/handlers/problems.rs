use crate::ipc::error::{err, ok, service_err};
use crate::ipc::types::{AppState, Request};
use crate::model::ProblemRecord;
use crate::service::ServiceError;
use serde_json::json;

fn problem_result(req: &Request, res: Result<ProblemRecord, ServiceError>) -> serde_json::Value {
    let problem = match res {
        Ok(p) => p,
        Err(e) => return service_err(&req.id, &e),
    };
    match serde_json::to_value(&problem) {
        Ok(v) => ok(&req.id, json!({ "problem": v })),
        Err(e) => err(&req.id, "encode_failed", e.to_string(), None),
    }
}

fn handle_problems_analyze(state: &mut AppState, req: &Request) -> serde_json::Value {
    problem_result(req, state.problems.submit_problem(&req.params))
}

fn handle_problems_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    problem_result(req, state.problems.get_problem(&req.params))
}

fn handle_problems_feedback(state: &mut AppState, req: &Request) -> serde_json::Value {
    problem_result(req, state.problems.submit_feedback(&req.params))
}

fn handle_problems_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let problems = state.problems.list_problems();
    match serde_json::to_value(&problems) {
        Ok(v) => ok(&req.id, json!({ "problems": v })),
        Err(e) => err(&req.id, "encode_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "problems.analyze" => Some(handle_problems_analyze(state, req)),
        "problems.get" => Some(handle_problems_get(state, req)),
        "problems.feedback" => Some(handle_problems_feedback(state, req)),
        "problems.list" => Some(handle_problems_list(state, req)),
        _ => None,
    }
}
