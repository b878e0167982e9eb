use super::*;

#[test]
fn punch_arguments_become_form_values() {
    let cli = Cli::try_parse_from([
        "puncher-remote",
        "punch",
        "song.mid",
        "--transpose",
        "-3",
        "--autofit",
        "--label",
        "Waltz",
        "--watch",
    ])
    .expect("parse");

    let Command::Punch { submit, watch } = cli.command else {
        panic!("expected punch command");
    };
    assert!(watch);
    let form = submit.into_form();
    assert_eq!(form.file, Some(PathBuf::from("song.mid")));
    assert_eq!(form.transpose, -3);
    assert!(form.autofit);
    assert_eq!(form.label.as_deref(), Some("Waltz"));
    assert!(!transpose_ignored(&form));
}

#[test]
fn file_argument_is_optional_so_the_client_can_reject_it() {
    let cli = Cli::try_parse_from(["puncher-remote", "test"]).expect("parse");
    let Command::Test { submit, out } = cli.command else {
        panic!("expected test command");
    };
    assert_eq!(out, None);
    assert_eq!(submit.into_form().file, None);
}

#[test]
fn transpose_without_autofit_is_flagged() {
    let form = PunchForm {
        transpose: 2,
        autofit: false,
        ..PunchForm::default()
    };
    assert!(transpose_ignored(&form));
    assert!(!transpose_ignored(&PunchForm::default()));
}

#[test]
fn global_flags_override_settings() {
    let cli = Cli::try_parse_from([
        "puncher-remote",
        "status",
        "--server-url",
        "http://puncher.local:8080/api",
        "--poll-interval-ms",
        "900",
    ])
    .expect("parse");
    assert!(matches!(cli.command, Command::Status));

    let settings = resolve_settings(&cli).expect("settings");
    assert_eq!(settings.server_url, "http://puncher.local:8080/api");
    assert_eq!(settings.poll_interval_ms, 900);
}

#[test]
fn invalid_server_url_flag_is_rejected() {
    let cli = Cli::try_parse_from(["puncher-remote", "stop", "--server-url", "nope"])
        .expect("parse");
    assert!(resolve_settings(&cli).is_err());
}
