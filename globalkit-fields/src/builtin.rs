//! Built-in global definitions.
//!
//! `ArrayIssue` exercises nested arrays where the inner array is optional but
//! declares `minRows`. An empty optional array is valid; a non-empty one must
//! meet its bounds.

use crate::context::GlobalDefaults;
use crate::types::{ArrayField, FieldDef, GlobalDef, TabDef, TabsField, TextField};

/// The `ArrayIssue` global.
pub fn array_issue() -> GlobalDef {
    let text = FieldDef::Text(TextField {
        name: "text".into(),
        label: Some("Text".into()),
        required: true,
        min_length: None,
        max_length: Some(10),
    });

    let test_array = FieldDef::Array(ArrayField {
        name: "testArray".into(),
        label: Some("Non required inner array but with minRows".into()),
        required: false,
        min_rows: Some(2),
        max_rows: Some(7),
        fields: vec![text],
    });

    let outer = FieldDef::Array(ArrayField {
        name: "outerAray".into(),
        label: Some("Outer array".into()),
        required: true,
        min_rows: Some(1),
        max_rows: Some(5),
        fields: vec![test_array],
    });

    GlobalDef {
        slug: "ArrayIssue".into(),
        label: Some("Array Issue".into()),
        fields: vec![FieldDef::Tabs(TabsField {
            tabs: vec![TabDef {
                name: None,
                label: Some("Array Issue".into()),
                fields: vec![outer],
            }],
        })],
    }
}

/// Built-in globals seeded into a fresh registry.
pub fn defaults() -> GlobalDefaults {
    GlobalDefaults::new().global(array_issue())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldKind;
    use crate::wellformed::check_global;

    const DECLARATION: &str = r#"{
      "slug": "ArrayIssue",
      "label": "Array Issue",
      "fields": [
        {
          "type": "tabs",
          "tabs": [
            {
              "label": "Array Issue",
              "fields": [
                {
                  "type": "array",
                  "name": "outerAray",
                  "label": "Outer array",
                  "required": true,
                  "minRows": 1,
                  "maxRows": 5,
                  "fields": [
                    {
                      "type": "array",
                      "label": "Non required inner array but with minRows",
                      "name": "testArray",
                      "fields": [
                        {
                          "type": "text",
                          "name": "text",
                          "label": "Text",
                          "required": true,
                          "maxLength": 10
                        }
                      ],
                      "minRows": 2,
                      "maxRows": 7
                    }
                  ]
                }
              ]
            }
          ]
        }
      ]
    }"#;

    fn array_at<'a>(global: &'a GlobalDef, path: &str) -> &'a ArrayField {
        match global.find(path) {
            Some(FieldDef::Array(a)) => a,
            other => panic!("expected array at {path}, got {other:?}"),
        }
    }

    #[test]
    fn declaration_parses_to_builtin() {
        let parsed: GlobalDef = serde_json::from_str(DECLARATION).unwrap();
        assert_eq!(parsed, array_issue());
    }

    #[test]
    fn row_bounds_are_ordered() {
        let global = array_issue();
        let outer = array_at(&global, "outerAray");
        assert_eq!((outer.min_rows, outer.max_rows), (Some(1), Some(5)));
        assert!(outer.required);

        let inner = array_at(&global, "outerAray.testArray");
        assert_eq!((inner.min_rows, inner.max_rows), (Some(2), Some(7)));
        assert!(!inner.required);
    }

    #[test]
    fn required_fields_have_names() {
        let global = array_issue();
        for fp in global.data_fields() {
            if fp.field.is_required() {
                assert!(!fp.field.name().unwrap_or_default().is_empty());
            }
        }
    }

    #[test]
    fn builtin_is_well_formed() {
        assert!(check_global(&array_issue()).is_empty());
    }

    #[test]
    fn paths_and_kinds() {
        let global = array_issue();
        let listed: Vec<_> = global
            .data_fields()
            .into_iter()
            .map(|fp| (fp.path, fp.field.kind()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("outerAray".to_string(), FieldKind::Array),
                ("outerAray.testArray".to_string(), FieldKind::Array),
                ("outerAray.testArray.text".to_string(), FieldKind::Text),
            ]
        );
    }

    #[test]
    fn json_and_yaml_round_trip() {
        let global = array_issue();

        let json = serde_json::to_string_pretty(&global).unwrap();
        let from_json: GlobalDef = serde_json::from_str(&json).unwrap();
        assert_eq!(global, from_json);

        let yaml = serde_yaml_ng::to_string(&global).unwrap();
        let from_yaml: GlobalDef = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(global, from_yaml);
    }

    #[test]
    fn defaults_contain_array_issue() {
        let defaults = defaults();
        assert_eq!(defaults.globals().len(), 1);
        assert_eq!(defaults.globals()[0].slug, "ArrayIssue");
    }
}
