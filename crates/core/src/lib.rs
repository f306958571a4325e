//! Micro-wins domain logic.
//!
//! Everything with an invariant lives here: PII redaction, prompt
//! construction, strict validation of model output, the generation
//! pipeline, the step-progress state machine and the streak/badge
//! evaluator. Persistence is reached only through the [`store`] traits.

pub mod breakdown;
pub mod error;
pub mod generation;
pub mod profile;
pub mod progress;
pub mod prompt;
pub mod redact;
pub mod rewards;
pub mod store;
pub mod tasks;
pub mod types;
