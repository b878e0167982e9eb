//! Terminal rendering of job state and client events.

use chrono::Local;
use puncher_client::ClientEvent;
use puncher_shared::domain::{JobField, JobState, JobStatus};

const BAR_WIDTH: usize = 20;

pub fn badge(status: JobStatus) -> String {
    format!("[{}]", status.label())
}

pub fn filename(state: &JobState) -> &str {
    state.filename.as_deref().unwrap_or("None")
}

pub fn progress_bar(progress: u8) -> String {
    let progress = progress.min(100);
    let filled = usize::from(progress) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress
    )
}

pub fn render_state(state: &JobState) -> String {
    format!(
        "{} file: {} {}",
        badge(state.status),
        filename(state),
        progress_bar(state.progress)
    )
}

pub fn render_field(field: JobField, state: &JobState) -> String {
    match field {
        JobField::Status => format!("status: {}", badge(state.status)),
        JobField::Filename => format!("file: {}", filename(state)),
        JobField::Progress => format!("progress: {}", progress_bar(state.progress)),
    }
}

/// `None` for events with nothing to print.
pub fn render_event(event: &ClientEvent) -> Option<String> {
    match event {
        ClientEvent::StateChanged { field, state } => Some(render_field(*field, state)),
        ClientEvent::DownloadReady(artifact) => Some(format!(
            "test result ready: {} ({} bytes)",
            artifact.filename,
            artifact.bytes.len()
        )),
        ClientEvent::ValidationAlert(message) => Some(format!("alert: {message}")),
        ClientEvent::Error(message) => Some(format!("error: {message}")),
        ClientEvent::ErrorCleared => None,
    }
}

pub fn timestamped(line: &str) -> String {
    format!("{} {line}", Local::now().format("%H:%M:%S"))
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
