//! RESP wire protocol codec.
//!
//! Decoding is incremental: frames are parsed out of a [`BytesMut`] receive
//! buffer and only consumed once a complete frame is available, so a partial
//! read from the socket simply leaves the buffer untouched until more bytes
//! arrive. Encoding reproduces RESP framing byte-exactly.

use bytes::{Buf, BytesMut};
use thiserror::Error;

/// Upper bound on nested array depth accepted from the wire.
pub const MAX_FRAME_DEPTH: usize = 32;

/// Errors raised by the decoder for malformed frames.
///
/// Any of these leaves the byte stream desynchronized, so the connection that
/// produced the bytes must be closed rather than resynchronized.
#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("unknown RESP type marker")]
    UnknownTypeMarker,
    #[error("invalid length prefix")]
    InvalidLength,
    #[error("invalid integer")]
    InvalidInteger,
    #[error("bulk string length mismatch")]
    BulkLengthMismatch,
    #[error("frame nesting too deep")]
    NestingTooDeep,
}

impl RespError {
    /// Converts the error into a RESP-encoded error string for the client.
    pub fn as_string(&self) -> String {
        RespValue::Error(format!("ERR Protocol error: {}", self)).encode()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(String),
    NullBulkString,
    Array(Vec<RespValue>),
    NullArray,
}

enum DecodeFailure {
    /// The buffer does not yet hold a complete frame.
    Incomplete,
    Protocol(RespError),
}

type DecodeResult<T> = Result<T, DecodeFailure>;

impl RespValue {
    /// Decodes one frame from the front of `buffer`.
    ///
    /// Returns `Ok(Some(frame))` and consumes exactly the frame's bytes when a
    /// complete frame is buffered, `Ok(None)` (consuming nothing) when more
    /// bytes are needed, and `Err` when the buffered bytes are malformed.
    pub fn decode(buffer: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
        if buffer.is_empty() {
            return Ok(None);
        }

        let mut pos = 0;

        match parse_value(&buffer[..], &mut pos, 0) {
            Ok(value) => {
                buffer.advance(pos);
                Ok(Some(value))
            }
            Err(DecodeFailure::Incomplete) => Ok(None),
            Err(DecodeFailure::Protocol(err)) => Err(err),
        }
    }

    /// Encodes the value into its RESP wire representation.
    pub fn encode(&self) -> String {
        match self {
            RespValue::SimpleString(value) => format!("+{}\r\n", value),
            RespValue::Error(message) => format!("-{}\r\n", message),
            RespValue::Integer(value) => format!(":{}\r\n", value),
            RespValue::BulkString(value) => format!("${}\r\n{}\r\n", value.len(), value),
            RespValue::NullBulkString => "$-1\r\n".to_string(),
            RespValue::Array(elements) => {
                let mut encoded = format!("*{}\r\n", elements.len());

                for element in elements {
                    encoded.push_str(&element.encode());
                }

                encoded
            }
            RespValue::NullArray => "*-1\r\n".to_string(),
        }
    }
}

fn parse_value(input: &[u8], pos: &mut usize, depth: usize) -> DecodeResult<RespValue> {
    if *pos >= input.len() {
        return Err(DecodeFailure::Incomplete);
    }

    let marker = input[*pos];
    *pos += 1;

    match marker {
        b'+' => {
            let line = read_line(input, pos)?;
            Ok(RespValue::SimpleString(line.to_string()))
        }
        b'-' => {
            let line = read_line(input, pos)?;
            Ok(RespValue::Error(line.to_string()))
        }
        b':' => {
            let line = read_line(input, pos)?;
            let value = line
                .parse::<i64>()
                .map_err(|_| DecodeFailure::Protocol(RespError::InvalidInteger))?;

            Ok(RespValue::Integer(value))
        }
        b'$' => parse_bulk_string(input, pos),
        b'*' => parse_array(input, pos, depth),
        _ => Err(DecodeFailure::Protocol(RespError::UnknownTypeMarker)),
    }
}

fn parse_bulk_string(input: &[u8], pos: &mut usize) -> DecodeResult<RespValue> {
    let declared_length = read_length(input, pos)?;

    let Some(length) = declared_length else {
        return Ok(RespValue::NullBulkString);
    };

    if input.len() < *pos + length + 2 {
        return Err(DecodeFailure::Incomplete);
    }

    if &input[*pos + length..*pos + length + 2] != b"\r\n" {
        return Err(DecodeFailure::Protocol(RespError::BulkLengthMismatch));
    }

    let content = std::str::from_utf8(&input[*pos..*pos + length])
        .map_err(|_| DecodeFailure::Protocol(RespError::InvalidUtf8))?;
    *pos += length + 2;

    Ok(RespValue::BulkString(content.to_string()))
}

fn parse_array(input: &[u8], pos: &mut usize, depth: usize) -> DecodeResult<RespValue> {
    let declared_length = read_length(input, pos)?;

    let Some(length) = declared_length else {
        return Ok(RespValue::NullArray);
    };

    if depth >= MAX_FRAME_DEPTH {
        return Err(DecodeFailure::Protocol(RespError::NestingTooDeep));
    }

    let mut elements = Vec::with_capacity(length.min(64));

    for _ in 0..length {
        let element = parse_value(input, pos, depth + 1)?;
        elements.push(element);
    }

    Ok(RespValue::Array(elements))
}

/// Reads a `<len>\r\n` prefix. `-1` is the null sentinel and maps to `None`.
fn read_length(input: &[u8], pos: &mut usize) -> DecodeResult<Option<usize>> {
    let line = read_line(input, pos)?;
    let length = line
        .parse::<i64>()
        .map_err(|_| DecodeFailure::Protocol(RespError::InvalidLength))?;

    match length {
        -1 => Ok(None),
        n if n < -1 => Err(DecodeFailure::Protocol(RespError::InvalidLength)),
        n => Ok(Some(n as usize)),
    }
}

fn read_line<'a>(input: &'a [u8], pos: &mut usize) -> DecodeResult<&'a str> {
    let Some(terminator) = input[*pos..].windows(2).position(|window| window == b"\r\n") else {
        return Err(DecodeFailure::Incomplete);
    };

    let line = std::str::from_utf8(&input[*pos..*pos + terminator])
        .map_err(|_| DecodeFailure::Protocol(RespError::InvalidUtf8))?;
    *pos += terminator + 2;

    Ok(line)
}
