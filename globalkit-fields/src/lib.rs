//! Global content schemas
//!
//! `globalkit-fields` models a "global": a singleton content structure keyed by
//! a slug and described by an ordered tree of field descriptors (`tabs`,
//! `array`, `text` and friends). It knows nothing about admin UIs or document
//! storage. It owns the declarations and the rules they imply.
//!
//! # Architecture
//!
//! - **Schema model**: `GlobalDef` and `FieldDef`, serialized in the same camelCase
//!   shape the declarations are written in (JSON or YAML)
//! - **Well-formedness**: static checks over a declared tree (`wellformed`)
//! - **Validation**: applies declared constraints to a submitted document (`validation`)
//! - **YAML on disk**: one `.yaml` file per global, loaded once by `GlobalsContext`
//! - **Default seeding**: `with_defaults()` writes built-ins that don't exist, preserves edits

pub mod builtin;
pub mod config;
pub mod context;
pub mod error;
pub mod types;
pub mod validation;
pub mod wellformed;

pub use builtin::{array_issue, defaults};
pub use config::GlobalkitConfig;
pub use context::{GlobalDefaults, GlobalsContext, GlobalsContextBuilder};
pub use error::{GlobalsError, Result};
pub use types::{FieldDef, FieldKind, FieldPath, GlobalDef, TabDef};
pub use validation::{ValidationEngine, ValidationError, ValidationErrors};
pub use wellformed::{check_global, ensure_well_formed, IssueKind, SchemaIssue};
