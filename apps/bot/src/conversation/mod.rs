// Intake conversation: job title validation, per-user sessions, and the
// state machine that ties them to the recommendation pipeline.

pub mod controller;
pub mod job_title;
pub mod messages;
pub mod session;
