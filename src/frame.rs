// Command framing: clients send either a RESP array of bulk strings or a single inline line.

use std::fmt;

use bytes::Bytes;

static CRLF: &[u8; 2] = b"\r\n";

/// Outcome of looking for a well-formed frame at the start of a buffer.
///
/// `NotRecognized` does not tell a malformed frame apart from a truncated one; the caller knows
/// whether more input may still arrive and decides which one it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recognition {
    Recognized(usize),
    NotRecognized,
}

/// One command as cut out of a connection's byte stream.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// `*<n>\r\n` followed by `n` bulk strings, already recognized as well-formed.
    Array(Bytes),
    /// A line of space separated tokens, terminator stripped.
    Inline(Bytes),
}

impl Frame {
    /// Splits the frame into its ordered argument list.
    pub fn arguments(&self) -> Vec<Bytes> {
        match self {
            Frame::Array(bytes) => parse_array(bytes),
            Frame::Inline(bytes) => split_inline(bytes),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Array(bytes) => write!(f, "array {:?}", String::from_utf8_lossy(bytes)),
            Frame::Inline(bytes) => write!(f, "inline {:?}", String::from_utf8_lossy(bytes)),
        }
    }
}

/// Recognizes `$<len>\r\n<len bytes>\r\n` at the start of `data`.
pub fn recognize_bulk_string(data: &[u8]) -> Recognition {
    use Recognition::*;

    let Some(rest) = data.strip_prefix(b"$") else {
        return NotRecognized;
    };
    let Some((len, header)) = parse_length(rest) else {
        return NotRecognized;
    };

    // Marker, length digits and CRLF, then the payload and its CRLF.
    let start = 1 + header;
    let Some(end) = start.checked_add(len) else {
        return NotRecognized;
    };
    match data.get(end..end.saturating_add(CRLF.len())) {
        Some(terminator) if terminator == CRLF => Recognized(end + CRLF.len()),
        _ => NotRecognized,
    }
}

/// Recognizes `*<count>\r\n` followed by exactly `count` back to back bulk strings at the start
/// of `data`. Anything after the last bulk string is ignored.
pub fn recognize_array(data: &[u8]) -> Recognition {
    use Recognition::*;

    let Some(rest) = data.strip_prefix(b"*") else {
        return NotRecognized;
    };
    let Some((count, header)) = parse_length(rest) else {
        return NotRecognized;
    };

    let mut consumed = 1 + header;
    for _ in 0..count {
        match recognize_bulk_string(&data[consumed..]) {
            Recognized(len) => consumed += len,
            NotRecognized => return NotRecognized,
        }
    }

    Recognized(consumed)
}

/// Extracts the payloads of an array frame. Only valid on input accepted by [`recognize_array`].
pub fn parse_array(data: &[u8]) -> Vec<Bytes> {
    let Some((count, header)) = parse_length(&data[1..]) else {
        return vec![];
    };

    let mut args = Vec::with_capacity(count);
    let mut offset = 1 + header;
    for _ in 0..count {
        let (arg, len) = parse_bulk_string(&data[offset..]);
        args.push(arg);
        offset += len;
    }

    args
}

/// Extracts the payload of a bulk string frame and the number of bytes the frame spans. Only
/// valid on input accepted by [`recognize_bulk_string`].
pub fn parse_bulk_string(data: &[u8]) -> (Bytes, usize) {
    let Some((len, header)) = parse_length(&data[1..]) else {
        return (Bytes::new(), 0);
    };

    let start = 1 + header;
    let payload = Bytes::copy_from_slice(&data[start..start + len]);

    (payload, start + len + CRLF.len())
}

/// Finds the next line of `data`. Returns the line without its terminator and the number of
/// bytes it spans including the terminator. A final line without terminator is only returned
/// when `at_eof` is set.
pub fn scan_line(data: &[u8], at_eof: bool) -> Option<(&[u8], usize)> {
    match data.iter().position(|&b| b == b'\n') {
        Some(index) => Some((drop_cr(&data[..index]), index + 1)),
        None if at_eof && !data.is_empty() => Some((drop_cr(data), data.len())),
        None => None,
    }
}

fn split_inline(line: &[u8]) -> Vec<Bytes> {
    line.split(|&b| b == b' ')
        .filter(|token| !token.is_empty())
        .map(Bytes::copy_from_slice)
        .collect()
}

fn drop_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parses `[+]<digits>\r\n`, returning the number and the bytes consumed including the CRLF.
fn parse_length(data: &[u8]) -> Option<(usize, usize)> {
    let end = data.windows(2).position(|window| window == CRLF)?;
    let digits = &data[..end];
    let digits = digits.strip_prefix(b"+").unwrap_or(digits);

    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    let len = std::str::from_utf8(digits).ok()?.parse::<usize>().ok()?;
    Some((len, end + CRLF.len()))
}
