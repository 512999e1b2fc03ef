//! Structural checks on a declared global.
//!
//! These look only at the declaration, never at document data. A tree that
//! passes has ordered bounds, a name on every data-bearing field, no
//! colliding data keys and no empty containers. Cycles are unrepresentable
//! because children are owned.

use std::collections::HashSet;
use std::fmt;

use crate::error::{GlobalsError, Result};
use crate::types::{join_path, FieldDef, FieldKind, GlobalDef};

/// What is wrong with a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    EmptySlug,
    InvalidSlug { slug: String },
    MissingName { kind: FieldKind },
    DuplicateName { name: String },
    RowBoundsInverted { min: usize, max: usize },
    LengthBoundsInverted { min: usize, max: usize },
    RangeInverted { min: f64, max: f64 },
    EmptyContainer { kind: FieldKind },
    UnlabeledTab,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::EmptySlug => write!(f, "global has an empty slug"),
            IssueKind::InvalidSlug { slug } => {
                write!(f, "slug '{slug}' is not a valid file name")
            }
            IssueKind::MissingName { kind } => write!(f, "{kind} field has no name"),
            IssueKind::DuplicateName { name } => write!(f, "duplicate field name '{name}'"),
            IssueKind::RowBoundsInverted { min, max } => {
                write!(f, "minRows {min} exceeds maxRows {max}")
            }
            IssueKind::LengthBoundsInverted { min, max } => {
                write!(f, "minLength {min} exceeds maxLength {max}")
            }
            IssueKind::RangeInverted { min, max } => write!(f, "min {min} exceeds max {max}"),
            IssueKind::EmptyContainer { kind } => write!(f, "{kind} field declares no children"),
            IssueKind::UnlabeledTab => write!(f, "tab has neither a name nor a label"),
        }
    }
}

/// A single problem found in a declaration, located by data path.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaIssue {
    pub path: String,
    pub kind: IssueKind,
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

/// Run every structural check over a global. An empty result means well-formed.
pub fn check_global(global: &GlobalDef) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    if global.slug.trim().is_empty() {
        issue(&mut issues, "", IssueKind::EmptySlug);
    } else if !is_file_stem(&global.slug) {
        issue(
            &mut issues,
            "",
            IssueKind::InvalidSlug {
                slug: global.slug.clone(),
            },
        );
    }
    let mut scope = HashSet::new();
    check_fields(&global.fields, "", &mut scope, &mut issues);
    issues
}

/// Fail with `GlobalsError::Malformed` when `check_global` finds anything.
pub fn ensure_well_formed(global: &GlobalDef) -> Result<()> {
    let issues = check_global(global);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(GlobalsError::Malformed {
            slug: global.slug.clone(),
            issues,
        })
    }
}

/// The slug names the registry file, so it must stay a plain file stem.
fn is_file_stem(slug: &str) -> bool {
    !slug.starts_with('.')
        && !slug.contains("..")
        && !slug.contains(['/', '\\', '\0'])
}

/// `scope` holds the data keys already claimed in the current data object.
fn check_fields(
    fields: &[FieldDef],
    prefix: &str,
    scope: &mut HashSet<String>,
    issues: &mut Vec<SchemaIssue>,
) {
    for field in fields {
        if let FieldDef::Tabs(t) = field {
            if t.tabs.is_empty() {
                issue(issues, prefix, IssueKind::EmptyContainer { kind: field.kind() });
            }
            for tab in &t.tabs {
                let named = tab.data_name();
                if named.is_none() && tab.label.as_deref().unwrap_or_default().is_empty() {
                    issue(issues, prefix, IssueKind::UnlabeledTab);
                }
                match named {
                    Some(name) => {
                        claim(scope, name, prefix, issues);
                        let mut nested = HashSet::new();
                        check_fields(&tab.fields, &join_path(prefix, name), &mut nested, issues);
                    }
                    None => check_fields(&tab.fields, prefix, scope, issues),
                }
            }
            continue;
        }

        let name = field.name().unwrap_or_default();
        let path = if name.trim().is_empty() {
            issue(issues, prefix, IssueKind::MissingName { kind: field.kind() });
            prefix.to_string()
        } else {
            claim(scope, name, prefix, issues);
            join_path(prefix, name)
        };

        match field {
            FieldDef::Array(a) => {
                if let (Some(min), Some(max)) = a.row_bounds() {
                    if min > max {
                        issue(issues, &path, IssueKind::RowBoundsInverted { min, max });
                    }
                }
                nested_scope(field, &a.fields, &path, issues);
            }
            FieldDef::Group(g) => nested_scope(field, &g.fields, &path, issues),
            FieldDef::Text(t) | FieldDef::Textarea(t) => {
                if let (Some(min), Some(max)) = (t.min_length, t.max_length) {
                    if min > max {
                        issue(issues, &path, IssueKind::LengthBoundsInverted { min, max });
                    }
                }
            }
            FieldDef::Number(n) => {
                if let (Some(min), Some(max)) = (n.min, n.max) {
                    if min > max {
                        issue(issues, &path, IssueKind::RangeInverted { min, max });
                    }
                }
            }
            FieldDef::Checkbox(_) | FieldDef::Tabs(_) => {}
        }
    }
}

fn nested_scope(field: &FieldDef, children: &[FieldDef], path: &str, issues: &mut Vec<SchemaIssue>) {
    if children.is_empty() {
        issue(issues, path, IssueKind::EmptyContainer { kind: field.kind() });
    }
    let mut scope = HashSet::new();
    check_fields(children, path, &mut scope, issues);
}

fn claim(scope: &mut HashSet<String>, name: &str, prefix: &str, issues: &mut Vec<SchemaIssue>) {
    if !scope.insert(name.to_string()) {
        issue(
            issues,
            &join_path(prefix, name),
            IssueKind::DuplicateName { name: name.into() },
        );
    }
}

fn issue(issues: &mut Vec<SchemaIssue>, path: &str, kind: IssueKind) {
    issues.push(SchemaIssue {
        path: path.to_string(),
        kind,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::array_issue;
    use crate::types::{ArrayField, GroupField, NumberField, TabDef, TabsField, TextField};

    fn text(name: &str) -> FieldDef {
        FieldDef::Text(TextField {
            name: name.into(),
            label: None,
            required: false,
            min_length: None,
            max_length: None,
        })
    }

    fn global(fields: Vec<FieldDef>) -> GlobalDef {
        GlobalDef {
            slug: "Test".into(),
            label: None,
            fields,
        }
    }

    fn kinds(issues: &[SchemaIssue]) -> Vec<&IssueKind> {
        issues.iter().map(|i| &i.kind).collect()
    }

    #[test]
    fn array_issue_passes() {
        assert!(ensure_well_formed(&array_issue()).is_ok());
    }

    #[test]
    fn inverted_row_bounds() {
        let g = global(vec![FieldDef::Array(ArrayField {
            name: "rows".into(),
            label: None,
            required: false,
            min_rows: Some(5),
            max_rows: Some(2),
            fields: vec![text("x")],
        })]);
        let issues = check_global(&g);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "rows");
        assert_eq!(
            issues[0].kind,
            IssueKind::RowBoundsInverted { min: 5, max: 2 }
        );
    }

    #[test]
    fn equal_bounds_are_fine() {
        let g = global(vec![FieldDef::Array(ArrayField {
            name: "pair".into(),
            label: None,
            required: true,
            min_rows: Some(2),
            max_rows: Some(2),
            fields: vec![text("x")],
        })]);
        assert!(check_global(&g).is_empty());
    }

    #[test]
    fn inverted_length_and_range() {
        let g = global(vec![
            FieldDef::Text(TextField {
                name: "code".into(),
                label: None,
                required: false,
                min_length: Some(8),
                max_length: Some(4),
            }),
            FieldDef::Number(NumberField {
                name: "rating".into(),
                label: None,
                required: false,
                min: Some(10.0),
                max: Some(1.0),
            }),
        ]);
        let issues = check_global(&g);
        assert_eq!(
            kinds(&issues),
            vec![
                &IssueKind::LengthBoundsInverted { min: 8, max: 4 },
                &IssueKind::RangeInverted {
                    min: 10.0,
                    max: 1.0
                },
            ]
        );
    }

    #[test]
    fn required_field_without_name() {
        let g = global(vec![FieldDef::Text(TextField {
            name: "".into(),
            label: Some("Headline".into()),
            required: true,
            min_length: None,
            max_length: None,
        })]);
        let issues = check_global(&g);
        assert_eq!(
            kinds(&issues),
            vec![&IssueKind::MissingName {
                kind: FieldKind::Text
            }]
        );
    }

    #[test]
    fn unnamed_tabs_share_parent_scope() {
        let g = global(vec![FieldDef::Tabs(TabsField {
            tabs: vec![
                TabDef {
                    name: None,
                    label: Some("A".into()),
                    fields: vec![text("title")],
                },
                TabDef {
                    name: None,
                    label: Some("B".into()),
                    fields: vec![text("title")],
                },
            ],
        })]);
        let issues = check_global(&g);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "title");
        assert_eq!(
            issues[0].kind,
            IssueKind::DuplicateName {
                name: "title".into()
            }
        );
    }

    #[test]
    fn named_tabs_and_groups_open_new_scopes() {
        let g = global(vec![
            text("title"),
            FieldDef::Group(GroupField {
                name: "meta".into(),
                label: None,
                fields: vec![text("title")],
            }),
            FieldDef::Tabs(TabsField {
                tabs: vec![TabDef {
                    name: Some("seo".into()),
                    label: None,
                    fields: vec![text("title")],
                }],
            }),
        ]);
        assert!(check_global(&g).is_empty());
    }

    #[test]
    fn empty_containers_and_slug() {
        let g = GlobalDef {
            slug: " ".into(),
            label: None,
            fields: vec![
                FieldDef::Tabs(TabsField { tabs: vec![] }),
                FieldDef::Group(GroupField {
                    name: "empty".into(),
                    label: None,
                    fields: vec![],
                }),
                FieldDef::Tabs(TabsField {
                    tabs: vec![TabDef {
                        name: None,
                        label: None,
                        fields: vec![text("x")],
                    }],
                }),
            ],
        };
        let issues = check_global(&g);
        assert_eq!(
            kinds(&issues),
            vec![
                &IssueKind::EmptySlug,
                &IssueKind::EmptyContainer {
                    kind: FieldKind::Tabs
                },
                &IssueKind::EmptyContainer {
                    kind: FieldKind::Group
                },
                &IssueKind::UnlabeledTab,
            ]
        );
        assert!(matches!(
            ensure_well_formed(&g),
            Err(GlobalsError::Malformed { .. })
        ));
    }

    #[test]
    fn zero_row_bound_is_no_bound() {
        let g = global(vec![FieldDef::Array(ArrayField {
            name: "rows".into(),
            label: None,
            required: false,
            min_rows: Some(3),
            max_rows: Some(0),
            fields: vec![text("x")],
        })]);
        assert!(check_global(&g).is_empty());
    }

    #[test]
    fn nameless_fields_are_reported_at_their_parent() {
        let g = global(vec![FieldDef::Group(GroupField {
            name: "meta".into(),
            label: None,
            fields: vec![FieldDef::Array(ArrayField {
                name: "".into(),
                label: None,
                required: false,
                min_rows: Some(4),
                max_rows: Some(1),
                fields: vec![],
            })],
        })]);
        let issues = check_global(&g);
        let rendered: Vec<String> = issues.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "meta: array field has no name",
                "meta: minRows 4 exceeds maxRows 1",
                "meta: array field declares no children",
            ]
        );
        assert!(issues.iter().all(|i| !i.path.ends_with('.')));
    }

    #[test]
    fn empty_tab_name_shares_parent_scope() {
        let g = global(vec![
            text("title"),
            FieldDef::Tabs(TabsField {
                tabs: vec![TabDef {
                    name: Some("".into()),
                    label: Some("Main".into()),
                    fields: vec![text("title")],
                }],
            }),
        ]);
        let issues = check_global(&g);
        assert_eq!(
            kinds(&issues),
            vec![&IssueKind::DuplicateName {
                name: "title".into()
            }]
        );
    }

    #[test]
    fn slug_must_be_a_plain_file_stem() {
        for slug in ["../escaped", "a/b", "a\\b", ".hidden", "x..y"] {
            let g = GlobalDef {
                slug: slug.into(),
                label: None,
                fields: vec![text("x")],
            };
            assert_eq!(
                kinds(&check_global(&g)),
                vec![&IssueKind::InvalidSlug { slug: slug.into() }],
                "{slug}"
            );
        }
        assert!(check_global(&global(vec![text("x")])).is_empty());
    }

    #[test]
    fn issue_display_includes_path() {
        let issue = SchemaIssue {
            path: "outerAray.testArray".into(),
            kind: IssueKind::RowBoundsInverted { min: 7, max: 2 },
        };
        assert_eq!(
            issue.to_string(),
            "outerAray.testArray: minRows 7 exceeds maxRows 2"
        );
    }
}
