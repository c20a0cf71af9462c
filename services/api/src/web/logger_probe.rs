//! services/api/src/web/logger_probe.rs
//!
//! A small endpoint that emits one line per log level so the logging setup
//! can be eyeballed end to end.

use axum::response::Response;
use tracing::{debug, error, info, trace, warn};

use crate::web::response;

/// GET /loggerTest - Emit a log line at every level
#[utoipa::path(
    get,
    path = "/loggerTest",
    responses((status = 200, description = "Log lines emitted"))
)]
pub async fn logger_test_handler() -> Response {
    trace!("TRACE level message");
    debug!("DEBUG level message");
    info!("INFO level message");
    warn!("WARN level message");
    error!("ERROR level message");

    response::success_message("Logger test complete. Check the console and the configured log output.")
}
