//! HTTP API for the assessment presenter
//!
//! - POST /recordings/start - Start capturing from the configured input
//! - POST /recordings/stop/:id - Stop, transcribe and score a recording
//! - POST /recordings/cancel - Abandon the active recording, releasing the input
//! - GET /recordings/status - Whether a capture is active
//! - GET /recordings/last/audio - Raw bytes of the last finalized recording
//! - POST /assessments - Transcribe and score an uploaded clip (415 for unknown types)
//! - POST /score - Score a transcript against a target phrase
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
