mod analyzer;
mod config;
mod image;
mod ipc;
mod logging;
mod model;
mod service;
mod store;
mod validate;

use anyhow::Context;
use std::io::{self, BufRead, Write};

fn main() -> anyhow::Result<()> {
    let cfg = config::Config::from_env().context("invalid configuration")?;
    logging::init(cfg.log_filter.as_deref()).context("failed to initialise logging")?;

    // The store lives exactly as long as this state; nothing is persisted.
    let mut state = ipc::AppState {
        problems: service::ProblemService::new(
            store::ProblemStore::new(),
            Box::new(analyzer::MockAnalyzer),
            cfg.max_image_bytes,
        ),
    };
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        max_image_bytes = cfg.max_image_bytes,
        "mathtemplated ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "unparseable request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                writeln!(stdout, "{resp}").context("failed to write response")?;
                stdout.flush().context("failed to flush stdout")?;
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        writeln!(stdout, "{resp}").context("failed to write response")?;
        stdout.flush().context("failed to flush stdout")?;
    }

    tracing::info!(
        problems = state.problems.problem_count(),
        "stdin closed, shutting down"
    );
    Ok(())
}
