//! User Interface module
//!
//! Terminal map editor using ratatui.

pub mod app;
pub mod colors;

pub use app::App;
