//! Frame Tests
//!
//! Tests for the length-prefixed framing layer.

use std::io::{self, Cursor, Read};

use filexfer::protocol::{encode_frame, read_frame, write_frame, LENGTH_PREFIX_SIZE};
use filexfer::XferError;

// =============================================================================
// Helper Types
// =============================================================================

/// Reader that hands out at most one byte per call
struct Trickle<R>(R);

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(1);
        self.0.read(&mut buf[..len])
    }
}

/// Reader that fails with `Interrupted` before every successful read
struct Interrupting<R> {
    inner: R,
    interrupt_next: bool,
}

impl<R: Read> Read for Interrupting<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt_next = !self.interrupt_next;
        if self.interrupt_next {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
        }
        self.inner.read(buf)
    }
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_frame_prefix_is_big_endian_length() {
    let frame = encode_frame(b"hello").unwrap();
    assert_eq!(&frame[..LENGTH_PREFIX_SIZE], &[0, 0, 0, 5]);
    assert_eq!(&frame[LENGTH_PREFIX_SIZE..], b"hello");
}

#[test]
fn test_write_frame_matches_encode_frame() {
    let payload = vec![0xAB; 300];
    let mut written = Vec::new();
    write_frame(&mut written, &payload).unwrap();

    assert_eq!(written, encode_frame(&payload).unwrap());
    assert_eq!(&written[..4], &300u32.to_be_bytes());
}

#[test]
fn test_empty_frame() {
    let mut written = Vec::new();
    write_frame(&mut written, b"").unwrap();
    assert_eq!(written, vec![0, 0, 0, 0]);

    let frame = read_frame(&mut Cursor::new(written)).unwrap().unwrap();
    assert!(frame.is_empty());
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_read_consecutive_frames() {
    let mut stream = Vec::new();
    write_frame(&mut stream, b"first").unwrap();
    write_frame(&mut stream, b"second").unwrap();

    let mut reader = Cursor::new(stream);
    assert_eq!(&read_frame(&mut reader).unwrap().unwrap()[..], b"first");
    assert_eq!(&read_frame(&mut reader).unwrap().unwrap()[..], b"second");
    assert!(read_frame(&mut reader).unwrap().is_none());
}

#[test]
fn test_clean_close_is_none() {
    let mut reader = Cursor::new(Vec::<u8>::new());
    assert!(read_frame(&mut reader).unwrap().is_none());
}

#[test]
fn test_close_mid_length_is_truncation() {
    let mut reader = Cursor::new(vec![0u8, 0]);
    match read_frame(&mut reader) {
        Err(XferError::ConnectionTruncated { expected, received }) => {
            assert_eq!(expected, 4);
            assert_eq!(received, 2);
        }
        other => panic!("Expected ConnectionTruncated, got {:?}", other),
    }
}

#[test]
fn test_close_mid_payload_is_truncation() {
    let mut bytes = 10u32.to_be_bytes().to_vec();
    bytes.extend_from_slice(b"abc");

    let err = read_frame(&mut Cursor::new(bytes)).unwrap_err();
    assert!(err.is_fatal());
    match err {
        XferError::ConnectionTruncated { expected, received } => {
            assert_eq!(expected, 10);
            assert_eq!(received, 3);
        }
        other => panic!("Expected ConnectionTruncated, got {:?}", other),
    }
}

#[test]
fn test_read_assembles_short_reads() {
    let payload: Vec<u8> = (0..=255).collect();
    let stream = encode_frame(&payload).unwrap();

    let mut reader = Trickle(Cursor::new(stream));
    let frame = read_frame(&mut reader).unwrap().unwrap();
    assert_eq!(&frame[..], &payload[..]);
}

#[test]
fn test_read_retries_interrupted() {
    let stream = encode_frame(b"interrupted").unwrap();
    let mut reader = Interrupting {
        inner: Trickle(Cursor::new(stream)),
        interrupt_next: false,
    };

    let frame = read_frame(&mut reader).unwrap().unwrap();
    assert_eq!(&frame[..], b"interrupted");
}

#[test]
fn test_large_frame_has_no_size_cap() {
    let payload = vec![7u8; 3 * 1024 * 1024];
    let stream = encode_frame(&payload).unwrap();

    let frame = read_frame(&mut Cursor::new(stream)).unwrap().unwrap();
    assert_eq!(frame.len(), payload.len());
}

#[test]
fn test_socket_error_is_connection_error() {
    struct Broken;
    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    let err = read_frame(&mut Broken).unwrap_err();
    assert!(matches!(err, XferError::Connection(_)));
    assert!(err.is_fatal());
}
