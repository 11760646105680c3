//! Wire format for page requests and responses.
//!
//! This is the only place that turns bytes into protocol values and back.
//! No I/O happens here.
//!
//! # Wire format
//!
//! Plain text, one line per message, `\n` terminated.
//!
//! ```text
//!  client → server   <offset>,<count>\n
//!  server → client   w1,w2,...,wN\n          more pages follow
//!                    w1,w2,...,wN,EOF\n      last page (N may equal count)
//!                    EOF\n                   nothing at this offset
//! ```
//!
//! `offset` and `count` are signed decimal integers; negative or zero values
//! are legal on the wire and answered with a bare `EOF\n`.

use thiserror::Error;

/// End-of-data token.
pub const EOF_MARKER: &str = "EOF";

/// Longest request line the server will buffer, newline excluded.
pub const MAX_REQUEST_LINE: usize = 512;

/// Malformed request line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("request line has no comma")]
    MissingComma,
    #[error("invalid integer field {0:?}")]
    InvalidNumber(String),
    #[error("request line exceeds {} bytes", MAX_REQUEST_LINE)]
    LineTooLong,
    #[error("request line is not valid UTF-8")]
    NotUtf8,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// `offset,count` request for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: i64,
    pub count: i64,
}

impl PageRequest {
    pub fn new(offset: i64, count: i64) -> Self {
        Self { offset, count }
    }

    /// Serialise as a newline-terminated request line.
    pub fn encode(&self) -> String {
        format!("{},{}\n", self.offset, self.count)
    }

    /// Parse one request line.
    ///
    /// `line` may still carry its trailing `\n` (and a `\r` before it);
    /// whitespace around either field is ignored.
    pub fn parse(line: &[u8]) -> Result<Self, ProtocolError> {
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        if line.len() > MAX_REQUEST_LINE {
            return Err(ProtocolError::LineTooLong);
        }
        let text = std::str::from_utf8(line).map_err(|_| ProtocolError::NotUtf8)?;
        let (offset, count) = text.split_once(',').ok_or(ProtocolError::MissingComma)?;
        Ok(Self {
            offset: parse_field(offset)?,
            count: parse_field(count)?,
        })
    }
}

fn parse_field(field: &str) -> Result<i64, ProtocolError> {
    let field = field.trim();
    field
        .parse()
        .map_err(|_| ProtocolError::InvalidNumber(field.to_owned()))
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// One page of words plus the end-of-data flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResponse {
    pub words: Vec<String>,
    pub end_of_data: bool,
}

impl PageResponse {
    /// Bare `EOF` response carrying no words.
    pub fn end() -> Self {
        Self {
            words: Vec::new(),
            end_of_data: true,
        }
    }

    /// Serialise as a newline-terminated response line.
    pub fn encode(&self) -> String {
        let mut out = self.words.join(",");
        if self.end_of_data {
            if !out.is_empty() {
                out.push(',');
            }
            out.push_str(EOF_MARKER);
        }
        out.push('\n');
        out
    }

    /// Parse a response line.
    ///
    /// Tokens before the first `EOF` token are words; empty tokens are
    /// skipped and anything after `EOF` is ignored.
    pub fn parse(line: &str) -> Self {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);

        let mut response = Self::default();
        for token in line.split(',') {
            if token == EOF_MARKER {
                response.end_of_data = true;
                break;
            }
            if !token.is_empty() {
                response.words.push(token.to_owned());
            }
        }
        response
    }
}
