use super::*;

#[test]
fn punch_request_uses_wire_field_names() {
    let request = PunchRequest {
        midi_file_base64: "TWlkaQ==".into(),
        filename: "song.mid".into(),
        transpose: -2,
        autofit: true,
    };
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(
        value,
        serde_json::json!({
            "midiFile": "TWlkaQ==",
            "filename": "song.mid",
            "transpose": -2,
            "autofit": true,
        })
    );
}

#[test]
fn idle_status_without_file_parses() {
    let status: ServerStatus =
        serde_json::from_str(r#"{"active": false, "progress": 0.0}"#).expect("parse");
    assert_eq!(status.job_status(), JobStatus::Idle);
    assert_eq!(status.active_filename(), None);
}

#[test]
fn unknown_status_keys_are_ignored() {
    let status: ServerStatus =
        serde_json::from_str(r#"{"active": true, "file": "a.mid", "progress": 0.5, "error": null}"#)
            .expect("parse");
    assert_eq!(status.active_filename().as_deref(), Some("a.mid"));
    assert_eq!(status.progress_percent(), 50);
}

#[test]
fn progress_is_rounded_and_clamped() {
    let mut status = ServerStatus {
        active: true,
        file: None,
        progress: 0.426,
    };
    assert_eq!(status.progress_percent(), 43);
    status.progress = 1.7;
    assert_eq!(status.progress_percent(), 100);
    status.progress = -0.2;
    assert_eq!(status.progress_percent(), 0);
    status.progress = f64::NAN;
    assert_eq!(status.progress_percent(), 0);
}

#[test]
fn active_status_without_file_still_names_the_job() {
    let status = ServerStatus {
        active: true,
        file: None,
        progress: 0.0,
    };
    assert_eq!(status.active_filename(), Some(String::new()));
}
