//! Command handlers. Each writes its report to `out` and returns an exit code.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use globalkit_fields::{
    check_global, defaults, GlobalDef, GlobalkitConfig, GlobalsContext, ValidationEngine,
};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Commands, OutputFormat};

/// Exit code for a failed check or rejected document.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Load configuration, open the registry and dispatch the parsed command.
pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<i32> {
    let config = GlobalkitConfig::load(&cli.config_dir)?;
    let root = cli
        .root
        .clone()
        .unwrap_or_else(|| config.globals_root(&cli.config_dir));
    debug!(root = %root.display(), "opening globals registry");

    let registry = GlobalsContext::open(&root)
        .with_defaults(defaults())
        .build()
        .await
        .with_context(|| format!("failed to open registry at {}", root.display()))?;

    match cli.command {
        Commands::List => run_list(&registry, out),
        Commands::Show { slug, format } => run_show(registry.require(&slug)?, format, out),
        Commands::Paths { slug } => run_paths(registry.require(&slug)?, out),
        Commands::Check { slug } => {
            let globals: Vec<&GlobalDef> = match slug {
                Some(slug) => vec![registry.require(&slug)?],
                None => registry.all().iter().collect(),
            };
            run_check(&globals, out)
        }
        Commands::Validate { slug, file } => {
            let engine = ValidationEngine::new(&config);
            run_validate(&engine, registry.require(&slug)?, &file, out)
        }
    }
}

pub fn run_list(registry: &GlobalsContext, out: &mut dyn Write) -> Result<i32> {
    if registry.all().is_empty() {
        writeln!(out, "No globals found.")?;
        return Ok(0);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Slug", "Label", "Fields"]);
    for slug in registry.slugs() {
        if let Some(global) = registry.get(slug) {
            table.add_row(vec![
                global.slug.as_str(),
                global.display_label(),
                &global.data_fields().len().to_string(),
            ]);
        }
    }
    writeln!(out, "{table}")?;
    Ok(0)
}

pub fn run_show(global: &GlobalDef, format: OutputFormat, out: &mut dyn Write) -> Result<i32> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml_ng::to_string(global)?,
        OutputFormat::Json => serde_json::to_string_pretty(global)? + "\n",
    };
    write!(out, "{rendered}")?;
    Ok(0)
}

pub fn run_paths(global: &GlobalDef, out: &mut dyn Write) -> Result<i32> {
    for fp in global.data_fields() {
        let marker = if fp.field.is_required() { " *" } else { "" };
        writeln!(out, "{}\t{}{}", fp.path, fp.field.kind(), marker)?;
    }
    Ok(0)
}

pub fn run_check(globals: &[&GlobalDef], out: &mut dyn Write) -> Result<i32> {
    let mut failed = false;
    for global in globals {
        let issues = check_global(global);
        if issues.is_empty() {
            writeln!(out, "ok: {}", global.slug)?;
            continue;
        }
        failed = true;
        writeln!(out, "{}: {} issue(s)", global.slug, issues.len())?;
        for issue in issues {
            writeln!(out, "  {issue}")?;
        }
    }
    Ok(if failed { FAILURE_EXIT_CODE } else { 0 })
}

pub fn run_validate(
    engine: &ValidationEngine,
    global: &GlobalDef,
    file: &Path,
    out: &mut dyn Write,
) -> Result<i32> {
    let document = read_document(file)?;
    match engine.validate(global, &document) {
        Ok(()) => {
            writeln!(out, "valid: {} matches {}", file.display(), global.slug)?;
            Ok(0)
        }
        Err(errors) => {
            writeln!(out, "invalid: {errors}")?;
            for error in errors.errors() {
                writeln!(out, "  {error}")?;
            }
            Ok(FAILURE_EXIT_CODE)
        }
    }
}

/// Parse a document file, choosing YAML or JSON by extension.
pub fn read_document(file: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let is_yaml = matches!(
        file.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let value = if is_yaml {
        serde_yaml_ng::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", file.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", file.display()))?
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use globalkit_fields::array_issue;
    use globalkit_fields::types::{ArrayField, FieldDef};
    use tempfile::TempDir;

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<i32>) -> (i32, String) {
        let mut buf = Vec::new();
        let code = f(&mut buf).unwrap();
        (code, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn paths_mark_required_fields() {
        let (code, text) = output(|out| run_paths(&array_issue(), out));
        assert_eq!(code, 0);
        assert_eq!(
            text,
            "outerAray\tarray *\nouterAray.testArray\tarray\nouterAray.testArray.text\ttext *\n"
        );
    }

    #[test]
    fn show_json_round_trips() {
        let (_, text) = output(|out| run_show(&array_issue(), OutputFormat::Json, out));
        let parsed: GlobalDef = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, array_issue());
    }

    #[test]
    fn check_reports_issues() {
        let mut broken = array_issue();
        broken.fields.push(FieldDef::Array(ArrayField {
            name: "extra".into(),
            label: None,
            required: false,
            min_rows: Some(3),
            max_rows: Some(1),
            fields: vec![],
        }));
        let good = array_issue();
        let (code, text) = output(|out| run_check(&[&good, &broken], out));
        assert_eq!(code, FAILURE_EXIT_CODE);
        assert!(text.starts_with("ok: ArrayIssue\nArrayIssue: 2 issue(s)\n"));
        assert!(text.contains("  extra: minRows 3 exceeds maxRows 1"));
        assert!(text.contains("  extra: array field declares no children"));
    }

    #[test]
    fn validate_yaml_document() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("doc.yaml");
        std::fs::write(
            &file,
            "outerAray:\n  - testArray:\n      - text: one\n      - text: two\n",
        )
        .unwrap();
        let engine = ValidationEngine::default();
        let (code, text) = output(|out| run_validate(&engine, &array_issue(), &file, out));
        assert_eq!(code, 0);
        assert!(text.starts_with("valid:"));
    }

    #[test]
    fn validate_rejects_short_inner_array() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("doc.json");
        std::fs::write(&file, r#"{"outerAray":[{"testArray":[{"text":"x"}]}]}"#).unwrap();
        let engine = ValidationEngine::default();
        let (code, text) = output(|out| run_validate(&engine, &array_issue(), &file, out));
        assert_eq!(code, FAILURE_EXIT_CODE);
        assert!(text.contains("outerAray.0.testArray: This field requires at least 2 rows."));
    }

    #[test]
    fn unreadable_document_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("doc.json");
        std::fs::write(&file, "{not json").unwrap();
        assert!(read_document(&file).is_err());
        assert!(read_document(&tmp.path().join("missing.json")).is_err());
    }
}
