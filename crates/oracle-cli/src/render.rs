//! Table rendering for reports and evaluation summaries

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use oracle_core::{RunReport, TaskStatus};
use oracle_eval::CorpusSummary;

fn status_cell(status: TaskStatus) -> Cell {
    let (text, color) = match status {
        TaskStatus::Succeeded => ("succeeded", Color::Green),
        TaskStatus::Failed => ("failed", Color::Red),
        TaskStatus::Skipped => ("skipped", Color::Yellow),
        TaskStatus::Cancelled => ("cancelled", Color::DarkYellow),
        TaskStatus::Pending => ("pending", Color::Grey),
        TaskStatus::Running => ("running", Color::Blue),
    };
    Cell::new(text).fg(color)
}

/// Print the run report as a task table plus the verdict
pub fn print_report(report: &RunReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Task", "Agent", "Status", "Attempts", "Detail"]);

    for result in &report.results {
        let detail = result
            .error
            .clone()
            .or_else(|| {
                result
                    .output
                    .as_ref()
                    .map(|o| truncate(&value_text(o), 80))
            })
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&result.task),
            Cell::new(&result.agent),
            status_cell(result.status),
            Cell::new(result.attempts),
            Cell::new(detail),
        ]);
    }

    println!("\nAnalysis of {} ({:?}, {:.1}s)", report.query, report.status, report.elapsed_seconds);
    println!("{table}");

    if let Some(verdict) = &report.verdict {
        println!("\nVerdict: {}", verdict.rating.as_deref().unwrap_or("N/A"));
        println!(
            "Confidence: {}",
            verdict.confidence.as_deref().unwrap_or("N/A")
        );
        match &verdict.justification {
            Some(justification) => println!("\n{justification}"),
            None => println!("\n{}", verdict.raw),
        }
    }
}

/// Print the corpus summary with per-check breakdowns
pub fn print_summary(summary: &CorpusSummary) {
    for case in &summary.cases {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["Check", "Weight", "Raw", "Weighted"]);
        for check in &case.score.breakdown {
            table.add_row(vec![
                Cell::new(&check.name),
                Cell::new(format!("{:.2}", check.weight)),
                Cell::new(format!("{:.3}", check.raw)),
                Cell::new(format!("{:.3}", check.weighted)),
            ]);
        }
        println!("\nCase: {} (total {:.3})", case.name, case.score.total);
        println!("{table}");
    }
    println!("\nMean score over {} cases: {:.3}", summary.cases.len(), summary.mean);
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{cut}…")
    }
}
