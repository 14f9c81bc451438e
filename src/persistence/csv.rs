//! CSV export and import of the task list
//!
//! Fields are joined with bare commas and never quoted, so a comma inside a
//! name or category shifts the columns of that row. Existing exports depend on
//! this layout, so it is kept as is.

use crate::domain::{format_cost, format_hms, start_of_day, Priority, Task};
use crate::error::TaskError;
use chrono::{DateTime, Local, NaiveDate};
use uuid::Uuid;

/// Header row written on export and skipped on import
pub const CSV_HEADERS: [&str; 7] = [
    "Task Name",
    "Priority",
    "Category",
    "Task Due",
    "Time (programado para finalizar)",
    "Time finished (tempo que foi finalizada)",
    "Money USD",
];

/// Number of leading columns read back on import
const IMPORT_FIELDS: usize = 6;

/// Serialize tasks to CSV, one row per task in list order
pub fn export_csv(tasks: &[Task], hourly_rate: f64) -> String {
    let mut rows = Vec::with_capacity(tasks.len() + 1);
    rows.push(CSV_HEADERS.join(","));

    for task in tasks {
        let row = [
            task.name.clone(),
            task.priority.to_tag().to_string(),
            task.category.clone(),
            task.due_date.format("%Y-%m-%d").to_string(),
            format_hms(task.planned_seconds()),
            format_hms(task.time_spent),
            format_cost(task.time_spent, hourly_rate),
        ];
        rows.push(row.join(","));
    }

    rows.join("\n")
}

/// Result of an import: the tasks that parsed, plus one error per rejected line
#[derive(Debug, Default)]
pub struct ImportReport {
    pub tasks: Vec<Task>,
    pub errors: Vec<TaskError>,
}

/// Parse a CSV blob into new tasks
///
/// The first line is treated as the header. Blank lines are skipped. Each
/// remaining line yields a fresh task with a new ID, not completed and with
/// its timer stopped. A malformed line is reported and the rest still load.
pub fn import_csv(content: &str) -> ImportReport {
    let mut report = ImportReport::default();

    for (idx, raw_line) in content.split('\n').enumerate().skip(1) {
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(line) {
            Ok(task) => report.tasks.push(task),
            Err(reason) => report.errors.push(TaskError::parse(idx + 1, reason)),
        }
    }

    report
}

fn parse_row(line: &str) -> Result<Task, String> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < IMPORT_FIELDS {
        return Err(format!(
            "expected {} fields, found {}",
            IMPORT_FIELDS,
            fields.len()
        ));
    }

    let priority = Priority::from_tag(fields[1])
        .ok_or_else(|| format!("unknown priority '{}'", fields[1]))?;
    let due_date = parse_due_date(fields[3])?;
    let duration = parse_planned_minutes(fields[4])?;
    let time_spent = parse_elapsed_seconds(fields[5])?;

    Ok(Task {
        id: Uuid::new_v4(),
        name: fields[0].to_string(),
        due_date,
        priority,
        category: fields[2].to_string(),
        completed: false,
        time_spent,
        duration,
        timer_running: false,
    })
}

/// Accepts "YYYY-MM-DD" (local midnight) or a full RFC 3339 timestamp
fn parse_due_date(value: &str) -> Result<DateTime<Local>, String> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(start_of_day(date));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| format!("invalid due date '{}'", value))
}

fn clock_parts(value: &str, min_parts: usize) -> Result<Vec<u64>, String> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.len() < min_parts {
        return Err(format!("invalid time '{}'", value.trim()));
    }
    parts
        .iter()
        .map(|part| {
            part.trim()
                .parse::<u64>()
                .map_err(|_| format!("invalid time '{}'", value.trim()))
        })
        .collect()
}

/// Planned duration in minutes from "HH:MM:SS". The seconds part is dropped.
fn parse_planned_minutes(value: &str) -> Result<u32, String> {
    let parts = clock_parts(value, 2)?;
    parts[0]
        .checked_mul(60)
        .and_then(|m| m.checked_add(parts[1]))
        .and_then(|m| u32::try_from(m).ok())
        .ok_or_else(|| out_of_range(value))
}

/// Elapsed seconds from "HH:MM:SS"
fn parse_elapsed_seconds(value: &str) -> Result<u64, String> {
    let parts = clock_parts(value, 3)?;
    parts[0]
        .checked_mul(3600)
        .and_then(|s| s.checked_add(parts[1].checked_mul(60)?))
        .and_then(|s| s.checked_add(parts[2]))
        .ok_or_else(|| out_of_range(value))
}

fn out_of_range(value: &str) -> String {
    format!("time '{}' out of range", value.trim())
}
