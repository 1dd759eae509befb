//! Checksum Tests

use std::io::Cursor;

use filexfer::transfer::{digest_bytes, digest_reader, file_digest, verify_digest, Digest, TransferState};
use filexfer::XferError;
use tempfile::TempDir;

#[test]
fn test_known_digests() {
    assert_eq!(digest_bytes(b""), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(
        digest_bytes(b"The quick brown fox jumps over the lazy dog"),
        "9e107d9d372bb6826bd81d3542a419d6"
    );
}

#[test]
fn test_incremental_matches_one_shot() {
    let data: Vec<u8> = (0..100_000u32).map(|i| (i % 253) as u8).collect();

    let mut digest = Digest::new();
    for piece in data.chunks(777) {
        digest.update(piece);
    }

    assert_eq!(digest.finish(), digest_bytes(&data));
    assert_eq!(digest_reader(&mut Cursor::new(&data)).unwrap(), digest_bytes(&data));
}

#[test]
fn test_file_digest() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("f.txt");
    std::fs::write(&path, b"hello world").unwrap();

    assert_eq!(file_digest(&path).unwrap(), digest_bytes(b"hello world"));
}

#[test]
fn test_file_digest_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = file_digest(&temp_dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, XferError::Io(_)));
}

#[test]
fn test_verify_digest() {
    let digest = digest_bytes(b"abc");
    assert!(verify_digest(&digest, &digest).is_ok());
    assert!(verify_digest(&digest.to_uppercase(), &digest).is_ok());
    assert!(matches!(
        verify_digest(&digest, &digest_bytes(b"abd")),
        Err(XferError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_transfer_state_accounting() {
    let mut state = TransferState::new(10);
    assert_eq!(state.percent(), 0.0);
    assert_eq!(state.remaining(), 10);
    assert!(!state.is_complete());

    state.record(b"abcd");
    assert_eq!(state.bytes_moved(), 4);
    assert_eq!(state.remaining(), 6);
    assert_eq!(state.percent(), 40.0);

    state.record(b"efghij");
    assert!(state.is_complete());
    assert_eq!(state.percent(), 100.0);
    assert_eq!(state.total_size(), 10);
    assert_eq!(state.finish(), digest_bytes(b"abcdefghij"));
}

#[test]
fn test_empty_transfer_state_is_complete() {
    let state = TransferState::new(0);
    assert!(state.is_complete());
    assert_eq!(state.percent(), 100.0);
}
