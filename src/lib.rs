//! Applicant funnel insights
//!
//! Tracks prospective students through the college-application funnel and
//! derives heuristic engagement, risk and intent scores, next-best-action
//! recommendations and roster-wide trends from their activity counters.

pub mod actions;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod filters;
pub mod insights;
pub mod intent;
pub mod models;
pub mod narrative;
pub mod report;
pub mod scoring;
pub mod tasks;
pub mod telemetry;
pub mod trends;

pub use engine::{AiEngine, StudentSummary};
pub use error::RosterError;
pub use intent::Intent;
pub use models::{ApplicationStatus, StudentActivity};
