//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&mut PgConnection` as the first argument, so they run inside the
//! caller's transaction.

pub mod badge_repo;
pub mod profile_repo;
pub mod task_repo;
pub mod task_step_repo;
pub mod user_stats_repo;

pub use badge_repo::BadgeRepo;
pub use profile_repo::ProfileRepo;
pub use task_repo::TaskRepo;
pub use task_step_repo::TaskStepRepo;
pub use user_stats_repo::UserStatsRepo;
