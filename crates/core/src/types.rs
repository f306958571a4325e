/// Task primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// User identifiers are opaque strings resolved from the bearer capability.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
