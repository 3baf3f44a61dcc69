//! Markdown rendering of `process-alert.md`.

use chrono::{DateTime, Utc};

use auditgate_contracts::event::Alert;

/// `6m 1s`, `1h 2m 0s`, `45s`.
pub fn human_duration(secs: i64) -> String {
    let secs = secs.max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

pub fn render(alerts: &[Alert], detected_at: DateTime<Utc>) -> String {
    let mut out = String::from("# Process alert\n\n");
    out.push_str(&format!(
        "Detected at {}: {} protocol deadline(s) missed.\n\n",
        detected_at.to_rfc3339(),
        alerts.len()
    ));
    out.push_str("| Task | Alert | Severity | Since | Elapsed |\n");
    out.push_str("|---|---|---|---|---|\n");
    for alert in alerts {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            alert.task_id,
            alert.kind.as_str(),
            alert.severity.as_str(),
            alert.since.to_rfc3339(),
            human_duration(alert.elapsed_secs)
        ));
    }
    out.push('\n');
    for alert in alerts {
        out.push_str(&format!("- **{}**: {}\n", alert.task_id, alert.message));
    }
    out.push_str("\nRun `events-monitor clear` once the affected runs have been handled.\n");
    out
}
