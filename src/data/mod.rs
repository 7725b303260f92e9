//! Tile template data
//!
//! This module handles loading tile templates from external RON files,
//! with hardcoded builtin templates as a fallback.

pub mod loader;
pub mod templates;

pub use loader::{
    export_builtin_templates, BuiltinTemplates, ExportError, TemplateDir, TemplateNotFound,
    TemplateRegistry, TemplateSource,
};
pub use templates::{builtin_template, builtin_templates, plain_template, TileTemplate, PLAIN_TEMPLATE_ID};
