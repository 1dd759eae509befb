//! Message Tests
//!
//! Tests for control message encoding, decoding, and validation.

use std::io::Cursor;

use filexfer::protocol::{
    decode_request, decode_response, encode_request, encode_response, read_request,
    read_response, write_frame, write_request, write_response, FileRecord, Request, Response,
    ServerInfo,
};
use filexfer::XferError;
use serde_json::{json, Value};

fn as_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

// =============================================================================
// Request Wire Shape Tests
// =============================================================================

#[test]
fn test_request_wire_shapes() {
    let cases = vec![
        (Request::List, json!({"command": "list"})),
        (
            Request::Upload {
                filename: "a.txt".to_string(),
                size: 42,
            },
            json!({"command": "upload", "filename": "a.txt", "size": 42}),
        ),
        (
            Request::Download {
                filename: "a.txt".to_string(),
            },
            json!({"command": "download", "filename": "a.txt"}),
        ),
        (
            Request::Delete {
                filename: "a.txt".to_string(),
            },
            json!({"command": "delete", "filename": "a.txt"}),
        ),
        (Request::Info, json!({"command": "info"})),
        (Request::Disconnect, json!({"command": "disconnect"})),
    ];

    for (request, expected) in cases {
        assert_eq!(as_json(&encode_request(&request).unwrap()), expected);
        assert_eq!(request.name(), expected["command"]);
    }
}

#[test]
fn test_decode_request_ignores_extra_fields() {
    let bytes = br#"{"command":"download","filename":"x.bin","client":"gui"}"#;
    assert_eq!(
        decode_request(bytes).unwrap(),
        Request::Download {
            filename: "x.bin".to_string()
        }
    );
}

// =============================================================================
// Request Validation Tests
// =============================================================================

#[test]
fn test_unknown_command() {
    let err = decode_request(br#"{"command":"frobnicate"}"#).unwrap_err();
    match &err {
        XferError::UnknownCommand(name) => assert_eq!(name, "frobnicate"),
        other => panic!("Expected UnknownCommand, got {:?}", other),
    }
    assert!(err.to_string().starts_with("unknown command"));
    assert!(!err.is_fatal());
}

#[test]
fn test_missing_required_field_is_malformed() {
    let err = decode_request(br#"{"command":"upload","filename":"a.txt"}"#).unwrap_err();
    match err {
        XferError::Protocol(msg) => {
            assert!(msg.contains("upload"), "{}", msg);
            assert!(msg.contains("size"), "{}", msg);
        }
        other => panic!("Expected Protocol, got {:?}", other),
    }
}

#[test]
fn test_wrong_field_type_is_malformed() {
    let err = decode_request(br#"{"command":"upload","filename":"a","size":-5}"#).unwrap_err();
    assert!(matches!(err, XferError::Protocol(_)));
}

#[test]
fn test_missing_command_is_malformed() {
    let err = decode_request(br#"{"status":"ready"}"#).unwrap_err();
    assert!(matches!(err, XferError::Protocol(_)));
}

#[test]
fn test_non_object_and_invalid_json_are_malformed() {
    assert!(matches!(decode_request(b"[1,2,3]"), Err(XferError::Protocol(_))));
    assert!(matches!(decode_request(b"{not json"), Err(XferError::Protocol(_))));
    assert!(matches!(decode_request(&[0xff, 0xfe]), Err(XferError::Protocol(_))));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_wire_shapes() {
    assert_eq!(
        as_json(&encode_response(&Response::ready()).unwrap()),
        json!({"status": "ready"})
    );
    assert_eq!(
        as_json(&encode_response(&Response::error("nope")).unwrap()),
        json!({"status": "error", "message": "nope"})
    );
    assert_eq!(
        as_json(&encode_response(&Response::file_meta("a.txt", 12, "abc")).unwrap()),
        json!({"status": "success", "size": 12, "filename": "a.txt", "md5": "abc"})
    );
    assert_eq!(
        as_json(&encode_response(&Response::message("file deleted")).unwrap()),
        json!({"status": "success", "message": "file deleted"})
    );
}

#[test]
fn test_listing_and_info_accessors() {
    let files = vec![FileRecord {
        name: "a.txt".to_string(),
        size: 3,
        modified: 1_700_000_000.5,
    }];
    let bytes = encode_response(&Response::listing(files.clone())).unwrap();
    assert_eq!(decode_response(&bytes).unwrap().into_files().unwrap(), files);

    let info = ServerInfo {
        upload_dir: "/srv/files".to_string(),
        total_files: 1,
        total_size: 3,
    };
    let bytes = encode_response(&Response::info(info.clone())).unwrap();
    let value = as_json(&bytes);
    assert_eq!(value["info"]["total_files"], 1);
    assert_eq!(decode_response(&bytes).unwrap().into_info().unwrap(), info);
}

#[test]
fn test_error_response_becomes_remote_error() {
    let response = decode_response(br#"{"status":"error","message":"File not found"}"#).unwrap();
    match response.into_file_meta() {
        Err(XferError::Remote(msg)) => assert_eq!(msg, "File not found"),
        other => panic!("Expected Remote, got {:?}", other),
    }
}

#[test]
fn test_success_missing_expected_field() {
    let response = decode_response(br#"{"status":"success","size":10}"#).unwrap();
    assert!(matches!(response.into_file_meta(), Err(XferError::Protocol(_))));
}

#[test]
fn test_error_response_requires_message() {
    assert!(decode_response(br#"{"status":"error"}"#).is_err());
    assert!(decode_response(br#"{"status":"pending"}"#).is_err());
}

#[test]
fn test_ready_accessor() {
    assert!(Response::ready().into_ready().is_ok());
    assert!(Response::ready().is_ready());
    assert!(matches!(
        Response::error("too big").into_ready(),
        Err(XferError::Remote(_))
    ));
    assert!(matches!(
        Response::message("hi").into_ready(),
        Err(XferError::Protocol(_))
    ));
}

// =============================================================================
// Stream Tests
// =============================================================================

#[test]
fn test_stream_round_trip() {
    let mut stream = Vec::new();
    write_request(&mut stream, &Request::Info).unwrap();
    write_response(&mut stream, &Response::uploaded("file uploaded", "d41d8cd98f00b204e9800998ecf8427e"))
        .unwrap();

    let mut reader = Cursor::new(stream);
    assert_eq!(read_request(&mut reader).unwrap().unwrap().unwrap(), Request::Info);
    let md5 = read_response(&mut reader).unwrap().unwrap().into_md5().unwrap();
    assert_eq!(md5, "d41d8cd98f00b204e9800998ecf8427e");

    assert!(read_request(&mut reader).unwrap().is_none());
}

#[test]
fn test_read_request_keeps_stream_usable_after_bad_message() {
    let mut stream = Vec::new();
    write_frame(&mut stream, br#"{"command":"frobnicate"}"#).unwrap();
    write_request(&mut stream, &Request::List).unwrap();

    let mut reader = Cursor::new(stream);
    assert!(matches!(
        read_request(&mut reader).unwrap().unwrap(),
        Err(XferError::UnknownCommand(_))
    ));
    assert_eq!(read_request(&mut reader).unwrap().unwrap().unwrap(), Request::List);
}
