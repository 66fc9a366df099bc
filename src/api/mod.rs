//! API Module
//!
//! Structure:
//! - commands.rs: form/history/status commands over a `Pipeline`
//! - engine_status.rs: status snapshot for the front end

pub mod commands;
pub mod engine_status;

pub use commands::*;
pub use engine_status::EngineStatus;
