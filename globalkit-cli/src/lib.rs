//! globalkit - command-line access to the globals registry.
//!
//! - `globalkit list`: registered globals
//! - `globalkit show <slug>`: a global's declaration as YAML or JSON
//! - `globalkit paths <slug>`: data paths and kinds of every field
//! - `globalkit check [slug]`: structural checks
//! - `globalkit validate <slug> <file>`: validate a document
//!
//! Exit codes: 0 success, 1 error or failed check/validation.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, OutputFormat};
