//! Interprets HLA antibody bead results in HAML documents.

pub mod antigen;
pub mod cli;
pub mod commands;
pub mod config;
pub mod haml;
pub mod interpretation;
pub mod utils;

pub use antigen::ConversionMap;
pub use haml::Document;
pub use interpretation::{interpret_document, InterpretationSummary, SoftwareInfo};
