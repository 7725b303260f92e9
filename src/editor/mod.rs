//! Map editor
//!
//! The editing session state machine that sits between the UI and the
//! world, save and scene modules.

pub mod session;

pub use session::{CommitFailure, EditError, MapEditorSession, SessionState};
