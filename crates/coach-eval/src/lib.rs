//! Competency evaluations for coaching programs: scoring, the draft/finalize lifecycle,
//! autosaving edit sessions, and the reports built on top of finalized evaluations.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
