//! Session domain module.
//!
//! # Module Structure
//!
//! - `state`: Session state types (`SessionState`, `StartRejection`)
//! - `orchestrator`: The session state machine (`SessionOrchestrator`)
//!
//! # Usage
//!
//! ```ignore
//! use mirror_core::session::{SessionOrchestrator, SessionState};
//! ```

mod orchestrator;
mod state;

// Re-export public API
pub use orchestrator::SessionOrchestrator;
pub use state::{SessionState, StartRejection};
