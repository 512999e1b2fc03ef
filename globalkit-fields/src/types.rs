//! Core schema types for globals.
//!
//! All types serialize to/from YAML and JSON via serde, in the camelCase shape
//! declarations are written in (`minRows`, `maxLength`, ...). A `GlobalDef`
//! owns an ordered tree of `FieldDef`s. Children are owned `Vec`s, so a tree
//! is always finite and acyclic.

use std::fmt;

use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// The kind tag of a field, the `type` key in a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Tabs,
    Array,
    Group,
    Text,
    Textarea,
    Number,
    Checkbox,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Tabs => "tabs",
            FieldKind::Array => "array",
            FieldKind::Group => "group",
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Checkbox => "checkbox",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tab inside a `tabs` field.
///
/// Unnamed tabs only group fields visually; their fields live in the
/// enclosing data object. Named tabs nest their fields under `name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl TabDef {
    /// The data key this tab nests its fields under. An empty name counts as unnamed.
    pub fn data_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// Presentational grouping of fields into tabs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabsField {
    pub tabs: Vec<TabDef>,
}

/// A repeatable list of rows, each row an object of `fields`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArrayField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl ArrayField {
    /// `(minRows, maxRows)` with a zero bound treated as absent.
    pub fn row_bounds(&self) -> (Option<usize>, Option<usize>) {
        (
            self.min_rows.filter(|&n| n > 0),
            self.max_rows.filter(|&n| n > 0),
        )
    }
}

/// A named object nesting `fields`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// A string value. Shared by `text` and `textarea`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumberField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckboxField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
}

/// A field descriptor: one node of a global's schema tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldDef {
    Tabs(TabsField),
    Array(ArrayField),
    Group(GroupField),
    Text(TextField),
    Textarea(TextField),
    Number(NumberField),
    Checkbox(CheckboxField),
}

impl FieldDef {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldDef::Tabs(_) => FieldKind::Tabs,
            FieldDef::Array(_) => FieldKind::Array,
            FieldDef::Group(_) => FieldKind::Group,
            FieldDef::Text(_) => FieldKind::Text,
            FieldDef::Textarea(_) => FieldKind::Textarea,
            FieldDef::Number(_) => FieldKind::Number,
            FieldDef::Checkbox(_) => FieldKind::Checkbox,
        }
    }

    /// The data key of this field. `None` for `tabs`, which store nothing themselves.
    pub fn name(&self) -> Option<&str> {
        match self {
            FieldDef::Tabs(_) => None,
            FieldDef::Array(f) => Some(f.name.as_str()),
            FieldDef::Group(f) => Some(f.name.as_str()),
            FieldDef::Text(f) | FieldDef::Textarea(f) => Some(f.name.as_str()),
            FieldDef::Number(f) => Some(f.name.as_str()),
            FieldDef::Checkbox(f) => Some(f.name.as_str()),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            FieldDef::Tabs(_) => None,
            FieldDef::Array(f) => f.label.as_deref(),
            FieldDef::Group(f) => f.label.as_deref(),
            FieldDef::Text(f) | FieldDef::Textarea(f) => f.label.as_deref(),
            FieldDef::Number(f) => f.label.as_deref(),
            FieldDef::Checkbox(f) => f.label.as_deref(),
        }
    }

    /// Label for display: the label, else the name, else the kind tag.
    pub fn display_label(&self) -> &str {
        self.label()
            .or_else(|| self.name())
            .unwrap_or_else(|| self.kind().as_str())
    }

    pub fn is_required(&self) -> bool {
        match self {
            FieldDef::Array(f) => f.required,
            FieldDef::Text(f) | FieldDef::Textarea(f) => f.required,
            FieldDef::Number(f) => f.required,
            FieldDef::Checkbox(f) => f.required,
            FieldDef::Tabs(_) | FieldDef::Group(_) => false,
        }
    }

    /// Direct children in declaration order. Tabs are expanded into their fields.
    pub fn children(&self) -> Vec<&FieldDef> {
        match self {
            FieldDef::Tabs(t) => t.tabs.iter().flat_map(|tab| tab.fields.iter()).collect(),
            FieldDef::Array(a) => a.fields.iter().collect(),
            FieldDef::Group(g) => g.fields.iter().collect(),
            _ => Vec::new(),
        }
    }
}

/// A field together with its dotted data path from the document root.
///
/// Array rows are not indexed (`outerAray.testArray.text`), unnamed tabs add
/// no segment.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath<'a> {
    pub path: String,
    pub field: &'a FieldDef,
}

/// A global definition: a singleton content structure and its schema tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalDef {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl GlobalDef {
    /// Label for display, falling back to the slug.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.slug)
    }

    /// Every data-bearing field in depth-first declaration order.
    pub fn data_fields(&self) -> Vec<FieldPath<'_>> {
        let mut out = Vec::new();
        collect_paths(&self.fields, "", &mut out);
        out
    }

    /// The dotted data paths of every data-bearing field.
    pub fn field_paths(&self) -> Vec<String> {
        self.data_fields().into_iter().map(|fp| fp.path).collect()
    }

    /// Find a field by its dotted data path.
    pub fn find(&self, path: &str) -> Option<&FieldDef> {
        self.data_fields()
            .into_iter()
            .find(|fp| fp.path == path)
            .map(|fp| fp.field)
    }
}

pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

fn collect_paths<'a>(fields: &'a [FieldDef], prefix: &str, out: &mut Vec<FieldPath<'a>>) {
    for field in fields {
        match field {
            FieldDef::Tabs(t) => {
                for tab in &t.tabs {
                    match tab.data_name() {
                        Some(name) => collect_paths(&tab.fields, &join_path(prefix, name), out),
                        None => collect_paths(&tab.fields, prefix, out),
                    }
                }
            }
            _ => {
                let path = join_path(prefix, field.name().unwrap_or_default());
                out.push(FieldPath {
                    path: path.clone(),
                    field,
                });
                collect_paths(field_children_slice(field), &path, out);
            }
        }
    }
}

fn field_children_slice(field: &FieldDef) -> &[FieldDef] {
    match field {
        FieldDef::Array(a) => &a.fields,
        FieldDef::Group(g) => &g.fields,
        _ => &[],
    }
}
