//! RESP (REdis Serialization Protocol) parser and serializer
//!
//! RESP2 only. Frames are parsed straight out of the connection buffer; an
//! incomplete frame leaves the buffer untouched until more bytes arrive.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Maximum bulk string size (32MB)
pub const MAX_BULK_LEN: usize = 32 * 1024 * 1024;

/// Maximum array size (1M elements)
const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Maximum array nesting. Commands are flat arrays of bulk strings.
const MAX_DEPTH: usize = 2;

/// RESP data types
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// `+OK\r\n`
    SimpleString(String),
    /// `-ERR message\r\n`
    Error(String),
    /// `:1000\r\n`
    Integer(i64),
    /// `$6\r\nfoobar\r\n`, or `$-1\r\n` for null
    BulkString(Option<Bytes>),
    /// `*2\r\n...`, or `*-1\r\n` for null
    Array(Option<Vec<RespValue>>),
}

/// Malformed input on the wire
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// First byte of a frame is not a RESP type marker
    UnknownType(u8),
    /// Length or integer line is not a valid number
    InvalidNumber(String),
    /// Simple string or error line is not UTF-8
    InvalidUtf8,
    /// Bulk payload not followed by `\r\n`
    MissingTerminator,
    /// Bulk string or array length above the configured limit
    TooLarge(usize),
    /// Arrays nested deeper than `MAX_DEPTH`
    TooDeep,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownType(b) => write!(f, "unknown RESP type byte {:?}", *b as char),
            ProtocolError::InvalidNumber(s) => write!(f, "invalid length or integer '{}'", s),
            ProtocolError::InvalidUtf8 => write!(f, "invalid UTF-8 in line"),
            ProtocolError::MissingTerminator => write!(f, "expected \\r\\n after bulk string"),
            ProtocolError::TooLarge(len) => write!(f, "frame too large: {}", len),
            ProtocolError::TooDeep => write!(f, "arrays nested deeper than {}", MAX_DEPTH),
        }
    }
}

impl std::error::Error for ProtocolError {}

type ParseResult<T> = Result<Option<T>, ProtocolError>;

impl RespValue {
    /// Shorthand for a non-null bulk string
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        RespValue::BulkString(Some(data.into()))
    }

    /// Shorthand for `+OK`
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    /// Shorthand for an error reply
    pub fn error(msg: impl Into<String>) -> Self {
        RespValue::Error(msg.into())
    }

    /// Append the wire encoding of this value to `out`
    pub fn write_to(&self, out: &mut BytesMut) {
        match self {
            RespValue::SimpleString(s) => write_line(out, b'+', s.as_bytes()),
            RespValue::Error(e) => write_line(out, b'-', e.as_bytes()),
            RespValue::Integer(i) => write_line(out, b':', i.to_string().as_bytes()),
            RespValue::BulkString(None) => out.put_slice(b"$-1\r\n"),
            RespValue::BulkString(Some(data)) => {
                write_line(out, b'$', data.len().to_string().as_bytes());
                out.put_slice(data);
                out.put_slice(b"\r\n");
            }
            RespValue::Array(None) => out.put_slice(b"*-1\r\n"),
            RespValue::Array(Some(items)) => {
                write_line(out, b'*', items.len().to_string().as_bytes());
                for item in items {
                    item.write_to(out);
                }
            }
        }
    }

    /// Encode into a fresh buffer
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::new();
        self.write_to(&mut out);
        out.freeze()
    }

    /// Parse one frame from the front of `buf`
    ///
    /// Returns `Ok(None)` when `buf` does not yet hold a complete frame; the
    /// buffer is only advanced past frames that parse completely.
    pub fn parse(buf: &mut BytesMut) -> ParseResult<RespValue> {
        let mut parser = Parser { src: &buf[..], pos: 0 };
        match parser.value(0)? {
            Some(value) => {
                let consumed = parser.pos;
                buf.advance(consumed);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

fn write_line(out: &mut BytesMut, marker: u8, body: &[u8]) {
    out.reserve(body.len() + 3);
    out.put_u8(marker);
    out.put_slice(body);
    out.put_slice(b"\r\n");
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Parse one value; `depth` counts the arrays enclosing it
    fn value(&mut self, depth: usize) -> ParseResult<RespValue> {
        let Some(&marker) = self.src.get(self.pos) else {
            return Ok(None);
        };
        self.pos += 1;

        match marker {
            b'+' => Ok(self.text()?.map(RespValue::SimpleString)),
            b'-' => Ok(self.text()?.map(RespValue::Error)),
            b':' => Ok(self.number()?.map(RespValue::Integer)),
            b'$' => self.bulk(),
            b'*' => self.array(depth),
            other => Err(ProtocolError::UnknownType(other)),
        }
    }

    fn line(&mut self) -> Option<&'a [u8]> {
        let rest: &'a [u8] = &self.src[self.pos..];
        let end = rest.windows(2).position(|w| w == b"\r\n")?;
        self.pos += end + 2;
        Some(&rest[..end])
    }

    fn text(&mut self) -> ParseResult<String> {
        match self.line() {
            Some(line) => std::str::from_utf8(line)
                .map(|s| Some(s.to_string()))
                .map_err(|_| ProtocolError::InvalidUtf8),
            None => Ok(None),
        }
    }

    fn number(&mut self) -> ParseResult<i64> {
        let Some(line) = self.line() else {
            return Ok(None);
        };
        let text = String::from_utf8_lossy(line);
        text.parse::<i64>()
            .map(Some)
            .map_err(|_| ProtocolError::InvalidNumber(text.into_owned()))
    }

    /// Length prefix of a bulk string or array; `Some(None)` is the null form
    fn length(&mut self, limit: usize) -> ParseResult<Option<usize>> {
        match self.number()? {
            None => Ok(None),
            Some(-1) => Ok(Some(None)),
            Some(n) if n < 0 => Err(ProtocolError::InvalidNumber(n.to_string())),
            Some(n) if n as u64 > limit as u64 => Err(ProtocolError::TooLarge(n as usize)),
            Some(n) => Ok(Some(Some(n as usize))),
        }
    }

    fn bulk(&mut self) -> ParseResult<RespValue> {
        let len = match self.length(MAX_BULK_LEN)? {
            None => return Ok(None),
            Some(None) => return Ok(Some(RespValue::BulkString(None))),
            Some(Some(len)) => len,
        };

        let rest = &self.src[self.pos..];
        if rest.len() < len + 2 {
            return Ok(None); // Need more data
        }
        if &rest[len..len + 2] != b"\r\n" {
            return Err(ProtocolError::MissingTerminator);
        }

        let data = Bytes::copy_from_slice(&rest[..len]);
        self.pos += len + 2;
        Ok(Some(RespValue::BulkString(Some(data))))
    }

    fn array(&mut self, depth: usize) -> ParseResult<RespValue> {
        if depth >= MAX_DEPTH {
            return Err(ProtocolError::TooDeep);
        }

        let len = match self.length(MAX_ARRAY_LEN)? {
            None => return Ok(None),
            Some(None) => return Ok(Some(RespValue::Array(None))),
            Some(Some(len)) => len,
        };

        let mut items = Vec::with_capacity(len.min(64));
        for _ in 0..len {
            match self.value(depth + 1)? {
                Some(item) => items.push(item),
                None => return Ok(None),
            }
        }
        Ok(Some(RespValue::Array(Some(items))))
    }
}
