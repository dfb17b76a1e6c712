//! Productivity Mesh
//!
//! Backend for a small personal productivity app:
//! - Expense advice: totals, top categories, weekly envelopes and a
//!   varied but seed-reproducible set of suggestions
//! - Day planning: prioritises open tasks into time blocks from "now"
//! - An optional delegate agent that is tried first, with the local
//!   engines as fallback
//!
//! Plus the client-side bookkeeping those engines feed on (task and
//! expense filtering, streaks, chart series, a pomodoro timer).
//!
//! REQUEST FLOW:
//! `{type, payload}` → VALIDATE → DELEGATE? → LOCAL FALLBACK → RESPOND

pub mod advisor;
pub mod agent;
pub mod api;
pub mod coerce;
pub mod config;
pub mod error;
pub mod mesh;
pub mod models;
pub mod money;
pub mod planner;
pub mod pomodoro;
pub mod rng;
pub mod tracker;

pub use error::{MeshError, Result};

// Re-export common types
pub use models::*;
pub use mesh::{MeshResponse, MeshService, RequestKind, ResponseSource};
