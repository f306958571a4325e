/// Domain error taxonomy shared by every crate in the workspace.
///
/// Each kind stays distinct all the way to the HTTP layer so a client can
/// tell "rephrase the task" apart from "retry the provider call".
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Caller-supplied data is malformed (empty description, unknown
    /// granularity, out-of-range profile field).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The language-model provider call failed or timed out.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The model answered, but the answer did not satisfy the breakdown schema.
    /// `raw` is the untouched provider output.
    #[error("Model output failed schema validation: {reason}")]
    SchemaValidation { reason: String, raw: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
