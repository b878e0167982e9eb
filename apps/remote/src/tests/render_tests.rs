use super::*;

use puncher_client::DownloadArtifact;

#[test]
fn idle_state_shows_none_for_missing_file() {
    let state = JobState::default();
    assert_eq!(
        render_state(&state),
        "[Idle] file: None [--------------------]   0%"
    );
}

#[test]
fn punching_state_shows_file_and_progress() {
    let state = JobState {
        status: JobStatus::Punching,
        filename: Some("song.mid".into()),
        progress: 42,
    };
    assert_eq!(
        render_state(&state),
        "[Punching] file: song.mid [########------------]  42%"
    );
}

#[test]
fn error_badge_reads_unable_to_get_status() {
    assert_eq!(badge(JobStatus::Error), "[Unable to get status]");
}

#[test]
fn full_progress_fills_the_bar() {
    assert_eq!(progress_bar(100), "[####################] 100%");
    assert_eq!(progress_bar(250), "[####################] 100%");
}

#[test]
fn events_render_per_field() {
    let state = JobState {
        status: JobStatus::Punching,
        filename: Some("song.mid".into()),
        progress: 5,
    };
    let event = ClientEvent::StateChanged {
        field: JobField::Filename,
        state: state.clone(),
    };
    assert_eq!(render_event(&event).as_deref(), Some("file: song.mid"));

    let event = ClientEvent::StateChanged {
        field: JobField::Status,
        state,
    };
    assert_eq!(render_event(&event).as_deref(), Some("status: [Punching]"));
}

#[test]
fn banner_events_render_and_clear_is_silent() {
    assert_eq!(
        render_event(&ClientEvent::Error("Error 400: bad".into())).as_deref(),
        Some("error: Error 400: bad")
    );
    assert_eq!(render_event(&ClientEvent::ErrorCleared), None);
    assert_eq!(
        render_event(&ClientEvent::DownloadReady(DownloadArtifact::new(vec![0; 4]))).as_deref(),
        Some("test result ready: puncher.mid (4 bytes)")
    );
}
