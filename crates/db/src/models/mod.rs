//! Row structs and insert DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the database row and
//! the conversion into the corresponding core record.

pub mod badge;
pub mod profile;
pub mod task;
pub mod task_step;
pub mod user_stats;
