use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde_json::Value;
use tracing::debug;

use papertrail_diff::metadata::{ChangeKind, FieldChange};
use papertrail_diff::text_diff::{self, DiffEdit};
use papertrail_diff::{
    similarity, DiffConfig, DiffResult, DocumentDiff, DocumentDiffer, FlattenedDiff, SectionDiff,
    SectionOrigin,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Diff(args) => cmd_diff(args, cli.format),
        Command::Similarity(args) => cmd_similarity(args, cli.format),
    }
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let diff = run_diff(&args)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
        OutputFormat::Text => print!("{}", render_diff(&diff)),
    }
    Ok(())
}

fn cmd_similarity(args: SimilarityArgs, format: OutputFormat) -> anyhow::Result<()> {
    let old = read_text(&args.old)?;
    let new = read_text(&args.new)?;
    let score = similarity(&old, &new);
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "similarity": score })),
        OutputFormat::Text => println!("{:.4}", score),
    }
    Ok(())
}

/// Load both documents and diff them with the effective configuration.
fn run_diff(args: &DiffArgs) -> anyhow::Result<DocumentDiff> {
    let config = load_config(args)?;
    debug!(?config, "effective diff configuration");
    let differ = DocumentDiffer::new(config)?;

    let old = read_json(&args.old)?;
    let new = read_json(&args.new)?;
    let diff = differ
        .diff_json(old, new, args.input_format.into())
        .with_context(|| {
            format!(
                "cannot diff {} against {}",
                args.old.display(),
                args.new.display()
            )
        })?;
    Ok(diff)
}

/// The config file (if any) with command-line flags applied on top.
fn load_config(args: &DiffArgs) -> anyhow::Result<DiffConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = read_text(path)?;
            toml::from_str(&raw)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => DiffConfig::default(),
    };

    if let Some(strategy) = args.strategy {
        config.strategy = strategy.into();
    }
    if let Some(granularity) = args.granularity {
        config.text.granularity = granularity.into();
    }
    if args.no_cleanup {
        config.text.semantic_cleanup = false;
    }
    if let Some(threshold) = args.threshold {
        config.align.positional_threshold = threshold;
    }
    Ok(config)
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let raw = read_text(path)?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn render_diff(diff: &DocumentDiff) -> String {
    let mut out = String::new();
    render_metadata(&mut out, diff.metadata_diff());
    match diff {
        DocumentDiff::Sections(result) => render_sections(&mut out, result),
        DocumentDiff::Flattened(flat) => render_flattened(&mut out, flat),
    }
    out
}

fn render_metadata(out: &mut String, changes: &[FieldChange]) {
    if changes.is_empty() {
        let _ = writeln!(out, "Metadata: {}", "unchanged".green());
        return;
    }
    let _ = writeln!(out, "Metadata: {} field(s) changed", changes.len().to_string().bold());
    for change in changes {
        let line = match change.kind {
            ChangeKind::Added => format!("  + {}: {}", change.field, show(&change.new)).green(),
            ChangeKind::Removed => format!("  - {}: {}", change.field, show(&change.old)).red(),
            ChangeKind::Changed => format!(
                "  ~ {}: {} -> {}",
                change.field,
                show(&change.old),
                show(&change.new)
            )
            .yellow(),
        };
        let _ = writeln!(out, "{line}");
    }
}

fn render_sections(out: &mut String, result: &DiffResult) {
    let _ = writeln!(
        out,
        "Sections: {} matched, {} deleted, {} inserted",
        result.matched().to_string().bold(),
        result.deleted().to_string().red(),
        result.inserted().to_string().green(),
    );
    for section in &result.section_diffs {
        let _ = writeln!(out, "{}", section_line(section));
    }
}

fn section_line(section: &SectionDiff) -> String {
    let heading = match section.origin {
        SectionOrigin::InsertedNew => text_diff::new_text(&section.heading_diff),
        _ => text_diff::old_text(&section.heading_diff),
    };
    let heading = if heading.is_empty() {
        "(untitled)".dimmed().to_string()
    } else {
        heading.bold().to_string()
    };
    let position = format!(
        "[{} -> {}]",
        index(section.old_index),
        index(section.new_index)
    )
    .dimmed();
    let counts = format!(
        "{} {}",
        format!("+{}", section.inserted_chars()).green(),
        format!("-{}", section.deleted_chars()).red()
    );

    match section.origin {
        SectionOrigin::Matched if section.is_unchanged() => {
            format!("  {} {position} {heading} {}", "=".dimmed(), "unchanged".dimmed())
        }
        SectionOrigin::Matched => format!("  {} {position} {heading} {counts}", "~".yellow()),
        SectionOrigin::DeletedOld => format!("  {} {position} {heading} {counts}", "-".red()),
        SectionOrigin::InsertedNew => format!("  {} {position} {heading} {counts}", "+".green()),
    }
}

fn render_flattened(out: &mut String, flat: &FlattenedDiff) {
    let _ = writeln!(
        out,
        "Document: {} {}",
        format!("+{}", text_diff::inserted_chars(&flat.edits)).green(),
        format!("-{}", text_diff::deleted_chars(&flat.edits)).red()
    );
    for edit in &flat.edits {
        let span = match edit {
            DiffEdit::Equal(text) => text.normal(),
            DiffEdit::Insert(text) => text.green().underline(),
            DiffEdit::Delete(text) => text.red().strikethrough(),
        };
        let _ = write!(out, "{span}");
    }
    if !flat.edits.is_empty() {
        out.push('\n');
    }
}

fn index(i: Option<usize>) -> String {
    i.map_or_else(|| "_".to_string(), |i| i.to_string())
}

fn show(value: &Option<Value>) -> String {
    value.as_ref().map_or_else(String::new, Value::to_string)
}
