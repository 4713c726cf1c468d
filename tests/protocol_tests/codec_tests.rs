//! Codec Tests
//!
//! Tests for request parsing and response encoding.

use std::io::Cursor;

use lineserve::protocol::{
    decode_command, decode_control_command, encode_command, encode_response,
    read_request_line, read_response, write_response,
    Command, ControlCommand, Response, Status, GENERIC_ERROR_MESSAGE, MAX_REQUEST_LEN,
};
use lineserve::LineError;

// =============================================================================
// Command Parsing Tests
// =============================================================================

#[test]
fn test_decode_get() {
    assert_eq!(
        decode_command("GET 42").unwrap(),
        Command::Get { line: "42".to_string() }
    );
}

#[test]
fn test_decode_is_case_insensitive() {
    assert_eq!(decode_command("get 7").unwrap(), Command::Get { line: "7".to_string() });
    assert_eq!(decode_command("Quit").unwrap(), Command::Quit);
    assert_eq!(decode_command("shutdown").unwrap(), Command::Shutdown);
}

#[test]
fn test_decode_tolerates_extra_whitespace_and_args() {
    assert_eq!(
        decode_command("  GET\t3   ignored  ").unwrap(),
        Command::Get { line: "3".to_string() }
    );
    assert_eq!(decode_command("QUIT now").unwrap(), Command::Quit);
}

#[test]
fn test_decode_keeps_get_argument_verbatim() {
    // Validation of the number happens in the engine
    assert_eq!(
        decode_command("GET abc").unwrap(),
        Command::Get { line: "abc".to_string() }
    );
}

#[test]
fn test_decode_rejects_bad_input() {
    for input in ["", "   ", "GET", "PUT 1", "GETS 1", "HELLO"] {
        assert!(
            matches!(decode_command(input), Err(LineError::Protocol(_))),
            "expected protocol error for {:?}",
            input
        );
    }
}

#[test]
fn test_encode_command() {
    assert_eq!(encode_command(&Command::Get { line: "9".to_string() }), "GET 9\n");
    assert_eq!(encode_command(&Command::Quit), "QUIT\n");
    assert_eq!(encode_command(&Command::Shutdown), "SHUTDOWN\n");
}

// =============================================================================
// Control Command Tests
// =============================================================================

#[test]
fn test_decode_control_shutdown_any_case() {
    assert_eq!(decode_control_command("SHUTDOWN"), ControlCommand::Shutdown);
    assert_eq!(decode_control_command("shutdown"), ControlCommand::Shutdown);
    assert_eq!(decode_control_command("ShutDown now please"), ControlCommand::Shutdown);
}

#[test]
fn test_decode_control_unknown() {
    assert_eq!(
        decode_control_command("reboot"),
        ControlCommand::Unknown("reboot".to_string())
    );
}

// =============================================================================
// Request Reading Tests
// =============================================================================

#[test]
fn test_read_request_lines_in_order() {
    let mut reader = Cursor::new(b"GET 1\r\nQUIT\n".to_vec());

    assert_eq!(read_request_line(&mut reader).unwrap().as_deref(), Some("GET 1"));
    assert_eq!(read_request_line(&mut reader).unwrap().as_deref(), Some("QUIT"));
    assert_eq!(read_request_line(&mut reader).unwrap(), None);
}

#[test]
fn test_read_request_without_trailing_newline() {
    let mut reader = Cursor::new(b"GET 5".to_vec());

    assert_eq!(read_request_line(&mut reader).unwrap().as_deref(), Some("GET 5"));
    assert_eq!(read_request_line(&mut reader).unwrap(), None);
}

#[test]
fn test_read_request_blank_line() {
    let mut reader = Cursor::new(b"\n".to_vec());

    assert_eq!(read_request_line(&mut reader).unwrap().as_deref(), Some(""));
}

#[test]
fn test_read_request_is_capped() {
    let mut input = vec![b'A'; MAX_REQUEST_LEN + 10];
    input.push(b'\n');
    let mut reader = Cursor::new(input);

    let first = read_request_line(&mut reader).unwrap().unwrap();
    let rest = read_request_line(&mut reader).unwrap().unwrap();

    assert_eq!(first.len(), MAX_REQUEST_LEN);
    assert_eq!(rest, "A".repeat(10));
}

// =============================================================================
// Response Encoding Tests
// =============================================================================

#[test]
fn test_encode_responses() {
    assert_eq!(&encode_response(&Response::line("hello world"))[..], b"OK\nhello world\n");
    assert_eq!(&encode_response(&Response::line(""))[..], b"OK\n\n");
    assert_eq!(&encode_response(&Response::not_found())[..], b"ERR\n");
    assert_eq!(&encode_response(&Response::invalid_command())[..], b"INVALID COMMAND!\n");

    let expected = format!("Server error: {}\n", GENERIC_ERROR_MESSAGE);
    assert_eq!(&encode_response(&Response::server_error())[..], expected.as_bytes());
}

#[test]
fn test_response_status() {
    assert_eq!(Response::line("x").status(), Status::Ok);
    assert_eq!(Response::not_found().status(), Status::NotFound);
    assert_eq!(Response::invalid_command().status(), Status::Invalid);
    assert_eq!(Response::server_error().status(), Status::Error);
}

#[test]
fn test_write_then_read_response_stream() {
    let mut wire = Vec::new();
    write_response(&mut wire, &Response::line("first")).unwrap();
    write_response(&mut wire, &Response::not_found()).unwrap();
    write_response(&mut wire, &Response::invalid_command()).unwrap();
    write_response(&mut wire, &Response::server_error()).unwrap();
    write_response(&mut wire, &Response::line("")).unwrap();

    let mut reader = Cursor::new(wire);
    assert_eq!(read_response(&mut reader).unwrap(), Some(Response::line("first")));
    assert_eq!(read_response(&mut reader).unwrap(), Some(Response::NotFound));
    assert_eq!(read_response(&mut reader).unwrap(), Some(Response::InvalidCommand));
    assert_eq!(read_response(&mut reader).unwrap(), Some(Response::server_error()));
    assert_eq!(read_response(&mut reader).unwrap(), Some(Response::line("")));
    assert_eq!(read_response(&mut reader).unwrap(), None);
}

#[test]
fn test_read_response_rejects_garbage() {
    let mut reader = Cursor::new(b"WHAT\n".to_vec());

    assert!(matches!(read_response(&mut reader), Err(LineError::Protocol(_))));
}

#[test]
fn test_read_response_ok_without_line() {
    let mut reader = Cursor::new(b"OK\n".to_vec());

    assert!(matches!(read_response(&mut reader), Err(LineError::Protocol(_))));
}
