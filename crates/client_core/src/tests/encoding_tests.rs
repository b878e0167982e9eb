use super::*;
use std::io::Write as _;

fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 256) as u8).collect()
}

#[test]
fn round_trips_across_chunk_boundaries() {
    let chunk_bytes = DECODE_CHUNK_CHARS / 4 * 3;
    for len in [
        0,
        1,
        2,
        3,
        4,
        chunk_bytes - 1,
        chunk_bytes,
        chunk_bytes + 1,
        3 * chunk_bytes + 2,
        100_000,
    ] {
        let bytes = sample_bytes(len);
        let decoded = base64_to_binary(&encode_base64(&bytes)).expect("decode");
        assert_eq!(decoded, bytes, "length {len}");
    }
}

#[test]
fn empty_input_decodes_to_empty_output() {
    assert_eq!(encode_base64(&[]), "");
    assert!(base64_to_binary("").expect("decode").is_empty());
}

#[test]
fn decodes_midi_header_sample() {
    assert_eq!(
        base64_to_binary("TWlkaQ==").expect("decode"),
        vec![0x4D, 0x69, 0x64, 0x69]
    );
}

#[test]
fn tolerates_surrounding_whitespace_and_data_url_prefix() {
    assert_eq!(
        base64_to_binary("  TWlkaQ==\n").expect("decode"),
        b"Midi".to_vec()
    );
    assert_eq!(
        base64_to_binary("data:audio/midi;base64,TWlkaQ==").expect("decode"),
        b"Midi".to_vec()
    );
}

#[test]
fn strip_data_url_prefix_leaves_plain_payloads_alone() {
    assert_eq!(strip_data_url_prefix("TWlkaQ=="), "TWlkaQ==");
    assert_eq!(
        strip_data_url_prefix("data:application/octet-stream;base64,AAEC"),
        "AAEC"
    );
    assert_eq!(
        strip_data_url_prefix("data:text/plain,hello"),
        "data:text/plain,hello"
    );
}

#[test]
fn rejects_invalid_payload() {
    let err = base64_to_binary("not*base64").expect_err("must fail");
    assert!(matches!(err, EncodingError::InvalidBase64 { offset: 0, .. }));
}

#[test]
fn reports_offset_of_failing_chunk() {
    let mut payload = encode_base64(&sample_bytes(DECODE_CHUNK_CHARS / 4 * 3));
    payload.push_str("!!!!");
    let err = base64_to_binary(&payload).expect_err("must fail");
    assert!(matches!(
        err,
        EncodingError::InvalidBase64 { offset, .. } if offset == DECODE_CHUNK_CHARS
    ));
}

#[tokio::test]
async fn file_to_base64_reads_whole_file() {
    let bytes = sample_bytes(5000);
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(&bytes).expect("write");
    file.flush().expect("flush");

    let encoded = file_to_base64(file.path()).await.expect("encode");
    assert!(!encoded.starts_with("data:"));
    assert_eq!(base64_to_binary(&encoded).expect("decode"), bytes);
}

#[tokio::test]
async fn file_to_base64_reports_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = file_to_base64(dir.path().join("missing.mid"))
        .await
        .expect_err("missing file");
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}
