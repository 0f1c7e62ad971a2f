//! Structured logging helpers for the mirroring engine.
//!
//! Lifecycle operations (opening, closing, attaching) are always logged at info
//! level with timings. The projection tick runs twice a second, so it only logs
//! at debug level and never formats anything when that level is filtered out.

use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub enum OperationPhase {
    Start,
    Complete { duration_ms: u64 },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct LogContext {
    #[serde(flatten)]
    pub fields: HashMap<String, String>,
}

/// Install `env_logger`, honouring `RUST_LOG` and falling back to
/// `default_filter`. Returns false if a logger was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

pub fn log_operation(name: &str, phase: OperationPhase, context: Option<&LogContext>) {
    let ctx_str = context
        .filter(|c| !c.fields.is_empty())
        .map(|c| format!(" | {:?}", c.fields))
        .unwrap_or_default();
    match phase {
        OperationPhase::Start => {
            log::info!("→ {} START{}", name, ctx_str);
        }
        OperationPhase::Complete { duration_ms } => {
            log::info!("← {} COMPLETE in {}ms{}", name, duration_ms, ctx_str);
        }
        OperationPhase::Failed { error } => {
            log::error!("✗ {} FAILED: {}{}", name, error, ctx_str);
        }
    }
}

/// Time an async operation, logging start and outcome.
pub async fn log_async_operation<F, Fut, T, E>(name: &str, f: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let start = Instant::now();
    log_operation(name, OperationPhase::Start, None);
    let result = f().await;
    match &result {
        Ok(_) => log_operation(
            name,
            OperationPhase::Complete {
                duration_ms: start.elapsed().as_millis() as u64,
            },
            None,
        ),
        Err(err) => log_operation(
            name,
            OperationPhase::Failed {
                error: err.to_string(),
            },
            None,
        ),
    }
    result
}

/// Log a session state change with its trigger.
pub fn log_session_transition(trigger: &str, from: &str, to: &str) {
    log::info!("🔄 SESSION [{}]: {} → {}", trigger, from, to);
}
