//! Report formatting for terminal output
//!
//! Run reports go to stderr; stdout belongs to the console destination.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::backup::{BackupReport, RenameReport, RestoreMode, RestoreOutcome, StageReport};

const FAILURE_WIDTH: usize = 60;

#[derive(Tabled)]
struct StageRow {
    #[tabled(rename = "Instance")]
    instance: String,
    #[tabled(rename = "Stage")]
    stage: String,
    #[tabled(rename = "Written")]
    written: usize,
    #[tabled(rename = "Skipped")]
    skipped: usize,
    #[tabled(rename = "Failures")]
    failures: String,
}

impl From<&StageReport> for StageRow {
    fn from(stage: &StageReport) -> Self {
        let failures = match (stage.failures.first(), &stage.note) {
            (Some(first), _) if stage.failures.len() > 1 => format!(
                "{} (+{} more)",
                truncate(first, FAILURE_WIDTH),
                stage.failures.len() - 1
            ),
            (Some(first), _) => truncate(first, FAILURE_WIDTH),
            (None, Some(note)) => note.clone(),
            (None, None) => String::new(),
        };
        Self {
            instance: stage.instance.clone(),
            stage: stage.kind.to_string(),
            written: stage.written,
            skipped: stage.skipped,
            failures,
        }
    }
}

/// Format the per-stage table of a backup run followed by its summary line
pub fn format_backup_report(report: &BackupReport) -> String {
    if report.stages.is_empty() {
        return format!("No stages ran.\n{}", report.summary());
    }

    let rows: Vec<StageRow> = report.stages.iter().map(StageRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::psql());

    format!("{}\n{}", table, report.summary())
}

/// Format the outcome of a restore
pub fn format_restore_outcome(outcome: &RestoreOutcome) -> String {
    let mut output = String::new();
    let mode = match outcome.mode {
        RestoreMode::Created => "created",
        RestoreMode::Updated => "updated",
    };
    output.push_str(&format!("{:<10} {}\n", "Kind:", outcome.kind));
    output.push_str(&format!("{:<10} {}\n", "Name:", outcome.name));
    output.push_str(&format!("{:<10} {}\n", "Mode:", mode));
    if let Some(id) = &outcome.target_id {
        output.push_str(&format!("{:<10} {}\n", "Id:", id));
    }
    output.push_str(&format!("{:<10} {}", "Applied:", outcome.applied.join(", ")));
    output
}

/// Format the flows touched by a rename run
pub fn format_rename_report(report: &RenameReport) -> String {
    if report.renamed.is_empty() && report.already_prefixed.is_empty() {
        return "No matching flows found.".to_string();
    }

    let width = report
        .renamed
        .iter()
        .map(|(from, _)| from.chars().count())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for (from, to) in &report.renamed {
        output.push_str(&format!("{:<width$}  ->  {}\n", from, to, width = width));
    }
    output.push_str(&report.summary());
    output
}

/// Truncate a string to a maximum number of characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
