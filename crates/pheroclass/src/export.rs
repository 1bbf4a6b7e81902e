//! CSV downloads of attendance and quiz results

use chrono::DateTime;
use pheroclass_classroom::AttendeeRecord;

use crate::quiz::StudentQuizResult;

pub const ATTENDANCE_FILE_NAME: &str = "attendance_records.csv";

/// Render a chain timestamp (seconds) for people
pub fn format_timestamp(seconds: u64) -> String {
    i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn rows_to_csv(rows: impl IntoIterator<Item = Vec<String>>) -> String {
    rows.into_iter()
        .map(|row| row.iter().map(|v| field(v)).collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn attendance_csv(records: &[AttendeeRecord]) -> String {
    let header = vec!["Address".to_string(), "Name".to_string()];
    rows_to_csv(
        std::iter::once(header).chain(
            records
                .iter()
                .map(|r| vec![r.address.to_string(), r.name.clone()]),
        ),
    )
}

/// `Quiz_<id>_<title with underscores>_Results.csv`
pub fn quiz_results_file_name(quiz_id: u64, title: &str) -> String {
    let title = title.split_whitespace().collect::<Vec<_>>().join("_");
    format!("Quiz_{}_{}_Results.csv", quiz_id, title)
}

pub fn quiz_results_csv(results: &[StudentQuizResult]) -> String {
    let header = [
        "Student Name",
        "Address",
        "Score",
        "Total Questions",
        "Percentage",
        "Attempted At",
    ]
    .map(String::from)
    .to_vec();

    rows_to_csv(std::iter::once(header).chain(results.iter().map(|r| {
        vec![
            r.name.clone(),
            r.address.to_string(),
            r.score.to_string(),
            r.total_questions.to_string(),
            format!("{}%", r.percentage()),
            format_timestamp(r.attempted_at),
        ]
    })))
}
