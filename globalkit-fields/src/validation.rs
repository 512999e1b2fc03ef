//! Document validation against a global's declared constraints.
//!
//! Every failure is collected rather than stopping at the first, each located
//! by a dotted data path with array rows indexed (`outerAray.0.testArray.1.text`).
//!
//! Optional arrays that are empty skip their row bounds entirely: `minRows`
//! only constrains an optional array once it has at least one row. A zero
//! `minRows` or `maxRows` is no bound. An optional text field may be absent,
//! but an empty string present in the document still has to meet `minLength`.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::GlobalkitConfig;
use crate::types::{join_path, ArrayField, FieldDef, GlobalDef, NumberField, TextField};

/// Row keys every stored array row may carry without a declaring field.
const IMPLICIT_KEYS: &[&str] = &["id"];

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "(root)"
        } else {
            &self.path
        };
        write!(f, "{path}: {}", self.message)
    }
}

/// All constraint failures found in one document.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("document failed validation with {} error(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors reported at exactly `path`.
    pub fn at(&self, path: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.path == path).collect()
    }
}

/// Applies a global's field constraints to submitted documents.
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    default_max_text_length: Option<usize>,
    strict: bool,
}

impl ValidationEngine {
    pub fn new(config: &GlobalkitConfig) -> Self {
        Self {
            default_max_text_length: config.default_max_text_length,
            strict: config.strict,
        }
    }

    /// Validate `document` against `global`. Returns every failure found.
    pub fn validate(
        &self,
        global: &GlobalDef,
        document: &Value,
    ) -> std::result::Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        match document {
            Value::Object(obj) => self.validate_object(&global.fields, obj, "", &mut errors),
            other => errors.push(type_error("", "object", other)),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(slug = %global.slug, count = errors.len(), "document rejected");
            Err(ValidationErrors { errors })
        }
    }

    /// Validate one data object: the root, an array row, a group or a named tab.
    fn validate_object(
        &self,
        fields: &[FieldDef],
        obj: &Map<String, Value>,
        prefix: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        self.validate_fields(fields, obj, prefix, errors);

        if self.strict {
            let mut declared = Vec::new();
            declared_keys(fields, &mut declared);
            for key in obj.keys() {
                if !declared.contains(&key.as_str()) && !IMPLICIT_KEYS.contains(&key.as_str()) {
                    errors.push(ValidationError {
                        path: join_path(prefix, key),
                        message: "Unknown field.".into(),
                    });
                }
            }
        }
    }

    /// Check `fields` against `obj`. Unnamed tabs recurse here with the same
    /// object, so unknown keys are only looked for in `validate_object`.
    fn validate_fields(
        &self,
        fields: &[FieldDef],
        obj: &Map<String, Value>,
        prefix: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        for field in fields {
            match field {
                FieldDef::Tabs(t) => {
                    for tab in &t.tabs {
                        match tab.data_name() {
                            Some(name) => self.validate_nested(
                                &tab.fields,
                                present(obj.get(name)),
                                &join_path(prefix, name),
                                errors,
                            ),
                            None => self.validate_fields(&tab.fields, obj, prefix, errors),
                        }
                    }
                }
                FieldDef::Group(g) => self.validate_nested(
                    &g.fields,
                    present(obj.get(&g.name)),
                    &join_path(prefix, &g.name),
                    errors,
                ),
                FieldDef::Array(a) => {
                    let path = join_path(prefix, &a.name);
                    self.validate_array(a, present(obj.get(&a.name)), &path, errors);
                }
                FieldDef::Text(t) | FieldDef::Textarea(t) => {
                    let path = join_path(prefix, &t.name);
                    self.validate_text(t, present(obj.get(&t.name)), &path, errors);
                }
                FieldDef::Number(n) => {
                    let path = join_path(prefix, &n.name);
                    validate_number(n, present(obj.get(&n.name)), &path, errors);
                }
                FieldDef::Checkbox(c) => {
                    let path = join_path(prefix, &c.name);
                    match present(obj.get(&c.name)) {
                        None if c.required => errors.push(required(&path)),
                        None | Some(Value::Bool(_)) => {}
                        Some(other) => errors.push(type_error(&path, "boolean", other)),
                    }
                }
            }
        }
    }

    /// A group or named tab: absent means an empty object.
    fn validate_nested(
        &self,
        fields: &[FieldDef],
        value: Option<&Value>,
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        match value {
            None => self.validate_object(fields, &Map::new(), path, errors),
            Some(Value::Object(obj)) => self.validate_object(fields, obj, path, errors),
            Some(other) => errors.push(type_error(path, "object", other)),
        }
    }

    fn validate_array(
        &self,
        field: &ArrayField,
        value: Option<&Value>,
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        let rows: &[Value] = match value {
            None => &[],
            Some(Value::Array(rows)) => rows,
            Some(other) => {
                errors.push(type_error(path, "array", other));
                return;
            }
        };

        if let Some(message) = row_count_error(field, rows.len()) {
            errors.push(ValidationError {
                path: path.to_string(),
                message,
            });
        }

        for (i, row) in rows.iter().enumerate() {
            let row_path = join_path(path, &i.to_string());
            match row {
                Value::Object(obj) => self.validate_object(&field.fields, obj, &row_path, errors),
                other => errors.push(type_error(&row_path, "object", other)),
            }
        }
    }

    fn validate_text(
        &self,
        field: &TextField,
        value: Option<&Value>,
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        let text = match value {
            None if field.required => {
                errors.push(required(path));
                return;
            }
            None => return,
            Some(Value::String(s)) => s,
            Some(other) => {
                errors.push(type_error(path, "string", other));
                return;
            }
        };

        let length = text.chars().count();
        let max_length = field.max_length.or(self.default_max_text_length);
        let message = match (max_length, field.min_length) {
            (Some(max), _) if length > max => Some(format!(
                "This value must be shorter than the max length of {max} characters."
            )),
            (_, Some(min)) if length < min => Some(format!(
                "This value must be longer than the minimum length of {min} characters."
            )),
            _ if length == 0 && field.required => Some(REQUIRED.to_string()),
            _ => None,
        };
        if let Some(message) = message {
            errors.push(ValidationError {
                path: path.to_string(),
                message,
            });
        }
    }
}

const REQUIRED: &str = "This field is required.";

/// Treat JSON `null` the same as a missing key.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn row_count_error(field: &ArrayField, len: usize) -> Option<String> {
    if !field.required && len == 0 {
        return None;
    }
    match field.row_bounds() {
        (Some(min), _) if len < min => Some(format!(
            "This field requires at least {min} {}.",
            rows_word(min)
        )),
        (_, Some(max)) if len > max => Some(format!(
            "This field requires no more than {max} {}.",
            rows_word(max)
        )),
        _ if len == 0 => Some("This field requires at least 1 row.".to_string()),
        _ => None,
    }
}

fn rows_word(count: usize) -> &'static str {
    if count == 1 {
        "row"
    } else {
        "rows"
    }
}

fn validate_number(
    field: &NumberField,
    value: Option<&Value>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let number = match value {
        None if field.required => {
            errors.push(required(path));
            return;
        }
        None => return,
        Some(Value::Number(n)) => n,
        Some(other) => {
            errors.push(type_error(path, "number", other));
            return;
        }
    };

    let Some(n) = number.as_f64() else {
        return;
    };
    let message = match (field.min, field.max) {
        (Some(min), _) if n < min => Some(format!(
            "{number} is less than the min allowed value of {min}."
        )),
        (_, Some(max)) if n > max => Some(format!(
            "{number} is greater than the max allowed value of {max}."
        )),
        _ => None,
    };
    if let Some(message) = message {
        errors.push(ValidationError {
            path: path.to_string(),
            message,
        });
    }
}

/// Data keys a field list claims in its enclosing object.
fn declared_keys<'a>(fields: &'a [FieldDef], out: &mut Vec<&'a str>) {
    for field in fields {
        match field {
            FieldDef::Tabs(t) => {
                for tab in &t.tabs {
                    match tab.data_name() {
                        Some(name) => out.push(name),
                        None => declared_keys(&tab.fields, out),
                    }
                }
            }
            other => out.extend(other.name()),
        }
    }
}

fn required(path: &str) -> ValidationError {
    ValidationError {
        path: path.to_string(),
        message: REQUIRED.into(),
    }
}

fn type_error(path: &str, expected: &str, found: &Value) -> ValidationError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    ValidationError {
        path: path.to_string(),
        message: format!("Expected {expected}, found {found}."),
    }
}
