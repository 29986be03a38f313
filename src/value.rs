// https://redis.io/docs/reference/protocol-spec

use std::fmt;
use std::io::Cursor;
use std::str;

use bytes::{Buf, Bytes};
use itertools::Itertools;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Num, Zero};
use thiserror::Error as ThisError;

use crate::list::List;

static CRLF: &[u8; 2] = b"\r\n";

/// Every shape a stored value or a command reply can take.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Double(f64),
    Boolean(bool),
    /// Human readable text. Encoded as a simple string unless it carries control characters.
    Text(String),
    /// Binary-safe payload, always encoded as a bulk string.
    Bulk(Bytes),
    Error(String),
    Array(Vec<Value>),
    /// Pairs in insertion order. Keys are values themselves, so this is not a hash map.
    Map(Vec<(Value, Value)>),
    BigNumber(BigNumber),
    List(List),
}

#[derive(Clone, Debug, PartialEq)]
pub enum BigNumber {
    Integer(BigInt),
    Rational(BigRational),
}

#[derive(Debug, ThisError, PartialEq)]
pub enum ParseError {
    #[error("not enough data is available to parse an entire value")]
    Incomplete,
    #[error("invalid value data type: {0}")]
    InvalidDataType(u8),
    #[error("protocol error; {0}")]
    Invalid(String),
}

impl Value {
    /// Reads one RESP2/RESP3 value starting at the cursor position, leaving the cursor right
    /// after it.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, ParseError> {
        // The first byte in an RESP-serialized payload always identifies its type.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => Ok(Value::Text(get_string(src)?)),
            DataType::SimpleError => Ok(Value::Error(get_string(src)?)),
            DataType::Integer => Ok(Value::Integer(get_integer(src)?)),
            // $<length>\r\n<data>\r\n
            DataType::BulkString => match get_integer(src)? {
                -1 => Ok(Value::Null),
                length => {
                    let data = get_exact(src, length)?;
                    Ok(Value::Bulk(Bytes::copy_from_slice(data)))
                }
            },
            // !<length>\r\n<error>\r\n
            DataType::BulkError => {
                let length = get_integer(src)?;
                let msg = get_exact(src, length)?;
                Ok(Value::Error(to_string(msg)?))
            }
            // =<length>\r\n<encoding>:<data>\r\n
            DataType::VerbatimString => {
                let length = get_integer(src)?;
                let data = get_exact(src, length)?;
                match data.get(3) {
                    Some(b':') => Ok(Value::Text(to_string(&data[4..])?)),
                    _ => Err(ParseError::Invalid(
                        "verbatim string without encoding".to_string(),
                    )),
                }
            }
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array | DataType::Set | DataType::Push => match get_integer(src)? {
                -1 => Ok(Value::Null),
                length => {
                    let length = usize::try_from(length)
                        .map_err(|_| ParseError::Invalid(format!("invalid length {length}")))?;
                    let mut values = Vec::with_capacity(length);
                    for _ in 0..length {
                        values.push(Self::parse(src)?);
                    }
                    Ok(Value::Array(values))
                }
            },
            // %<number-of-entries>\r\n<key-1><value-1>...<key-n><value-n>
            DataType::Map => {
                let length = get_integer(src)?;
                let length = usize::try_from(length)
                    .map_err(|_| ParseError::Invalid(format!("invalid length {length}")))?;
                let mut pairs = Vec::with_capacity(length);
                for _ in 0..length {
                    let key = Self::parse(src)?;
                    let value = Self::parse(src)?;
                    pairs.push((key, value));
                }
                Ok(Value::Map(pairs))
            }
            DataType::Null => {
                get_line(src)?;
                Ok(Value::Null)
            }
            DataType::Boolean => match get_line(src)? {
                b"t" => Ok(Value::Boolean(true)),
                b"f" => Ok(Value::Boolean(false)),
                other => Err(ParseError::Invalid(format!(
                    "invalid boolean {}",
                    String::from_utf8_lossy(other)
                ))),
            },
            DataType::Double => {
                let line = get_string(src)?;
                let double = match line.as_str() {
                    "inf" => f64::INFINITY,
                    "-inf" => f64::NEG_INFINITY,
                    "nan" => f64::NAN,
                    s => s
                        .parse::<f64>()
                        .map_err(|_| ParseError::Invalid(format!("invalid double {s}")))?,
                };
                Ok(Value::Double(double))
            }
            DataType::BigNumber => {
                let line = get_string(src)?;
                BigNumber::parse(&line).map(Value::BigNumber)
            }
        }
    }

    pub fn text(s: impl Into<String>) -> Value {
        Value::Text(s.into())
    }

    pub fn bulk(b: impl Into<Bytes>) -> Value {
        Value::Bulk(b.into())
    }

    pub fn error(msg: impl Into<String>) -> Value {
        Value::Error(msg.into())
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::BigNumber(BigNumber::Integer(n))
    }
}

impl From<BigRational> for Value {
    fn from(r: BigRational) -> Self {
        Value::BigNumber(BigNumber::Rational(r))
    }
}

impl BigNumber {
    fn parse(s: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::Invalid(format!("invalid big number {s}"));

        match s.split_once('/') {
            Some((numer, denom)) => {
                let numer = BigInt::from_str_radix(numer, 10).map_err(|_| invalid())?;
                let denom = BigInt::from_str_radix(denom, 10).map_err(|_| invalid())?;
                if denom.is_zero() {
                    return Err(invalid());
                }
                Ok(BigNumber::Rational(BigRational::new(numer, denom)))
            }
            None => BigInt::from_str_radix(s, 10)
                .map(BigNumber::Integer)
                .map_err(|_| invalid()),
        }
    }
}

impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BigNumber::Integer(n) => write!(f, "{n}"),
            BigNumber::Rational(r) => write!(f, "{r}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "(nil)"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Bulk(b) => write!(f, "{:?}", String::from_utf8_lossy(b)),
            Value::Error(e) => write!(f, "(error) {e}"),
            Value::Array(values) => write!(f, "[{}]", values.iter().join(", ")),
            Value::Map(pairs) => write!(
                f,
                "{{{}}}",
                pairs.iter().map(|(k, v)| format!("{k}: {v}")).join(", ")
            ),
            Value::BigNumber(n) => write!(f, "{n}"),
            Value::List(list) => write!(f, "[{}]", list.iter().join(", ")),
        }
    }
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, ParseError> {
    if !src.has_remaining() {
        return Err(ParseError::Incomplete);
    }
    Ok(src.get_u8())
}

/// Returns the bytes up to the next CRLF and moves the cursor past it.
fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], ParseError> {
    let start = src.position() as usize;
    let buf: &'a [u8] = *src.get_ref();

    let end = buf[start..]
        .windows(2)
        .position(|window| window == CRLF)
        .map(|index| start + index)
        .ok_or(ParseError::Incomplete)?;

    src.set_position((end + CRLF.len()) as u64);

    Ok(&buf[start..end])
}

/// Returns exactly `length` bytes, which must be followed by CRLF.
fn get_exact<'a>(src: &mut Cursor<&'a [u8]>, length: i64) -> Result<&'a [u8], ParseError> {
    let length = usize::try_from(length)
        .map_err(|_| ParseError::Invalid(format!("invalid length {length}")))?;
    let start = src.position() as usize;
    let buf: &'a [u8] = *src.get_ref();
    let end = start + length;

    if buf.len() < end + CRLF.len() {
        return Err(ParseError::Incomplete);
    }
    if &buf[end..end + CRLF.len()] != CRLF {
        return Err(ParseError::Invalid("missing CRLF after payload".to_string()));
    }

    src.set_position((end + CRLF.len()) as u64);

    Ok(&buf[start..end])
}

fn get_string(src: &mut Cursor<&[u8]>) -> Result<String, ParseError> {
    to_string(get_line(src)?)
}

fn get_integer(src: &mut Cursor<&[u8]>) -> Result<i64, ParseError> {
    let line = get_string(src)?;
    line.parse::<i64>()
        .map_err(|_| ParseError::Invalid(format!("invalid integer {line}")))
}

fn to_string(bytes: &[u8]) -> Result<String, ParseError> {
    str::from_utf8(bytes)
        .map(String::from)
        .map_err(|_| ParseError::Invalid("invalid UTF-8 string".to_string()))
}

#[derive(Debug)]
pub(crate) enum DataType {
    SimpleString,   // '+'
    BulkString,     // '$'
    VerbatimString, // '='
    SimpleError,    // '-'
    BulkError,      // '!'
    Boolean,        // '#'
    Integer,        // ':'
    Double,         // ','
    BigNumber,      // '('
    Array,          // '*'
    Map,            // '%'
    Set,            // '~'
    Push,           // '>'
    Null,           // '_'
}

impl TryFrom<u8> for DataType {
    type Error = ParseError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'!' => Ok(Self::BulkError),
            b'*' => Ok(Self::Array),
            b'_' => Ok(Self::Null),
            b'#' => Ok(Self::Boolean),
            b',' => Ok(Self::Double),
            b'(' => Ok(Self::BigNumber),
            b'=' => Ok(Self::VerbatimString),
            b'%' => Ok(Self::Map),
            b'~' => Ok(Self::Set),
            b'>' => Ok(Self::Push),
            _ => Err(ParseError::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::BulkError => b'!',
            DataType::Array => b'*',
            DataType::Null => b'_',
            DataType::Boolean => b'#',
            DataType::Double => b',',
            DataType::BigNumber => b'(',
            DataType::VerbatimString => b'=',
            DataType::Map => b'%',
            DataType::Set => b'~',
            DataType::Push => b'>',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &[u8]) -> Result<Value, ParseError> {
        let mut cursor = Cursor::new(data);
        Value::parse(&mut cursor)
    }

    #[test]
    fn parse_simple_string() {
        assert_eq!(parse(b"+OK\r\n"), Ok(Value::text("OK")));
    }

    #[test]
    fn parse_simple_error() {
        assert_eq!(
            parse(b"-Error message\r\n"),
            Ok(Value::error("Error message"))
        );
    }

    #[test]
    fn parse_integers() {
        assert_eq!(parse(b":1000\r\n"), Ok(Value::Integer(1000)));
        assert_eq!(parse(b":-1000\r\n"), Ok(Value::Integer(-1000)));
        assert_eq!(parse(b":+1000\r\n"), Ok(Value::Integer(1000)));
        assert_eq!(parse(b":0\r\n"), Ok(Value::Integer(0)));
    }

    #[test]
    fn parse_bulk_string() {
        assert_eq!(parse(b"$6\r\nfoobar\r\n"), Ok(Value::bulk("foobar")));
        assert_eq!(parse(b"$0\r\n\r\n"), Ok(Value::bulk("")));
        assert_eq!(parse(b"$-1\r\n"), Ok(Value::Null));
    }

    #[test]
    fn parse_bulk_string_with_crlf_inside() {
        assert_eq!(parse(b"$4\r\na\r\nb\r\n"), Ok(Value::bulk("a\r\nb")));
    }

    #[test]
    fn parse_bulk_string_incomplete() {
        assert_eq!(parse(b"$6\r\nfoo"), Err(ParseError::Incomplete));
    }

    #[test]
    fn parse_bulk_error() {
        assert_eq!(parse(b"!6\r\nfoobar\r\n"), Ok(Value::error("foobar")));
    }

    #[test]
    fn parse_resp3_scalars() {
        assert_eq!(parse(b"_\r\n"), Ok(Value::Null));
        assert_eq!(parse(b"#t\r\n"), Ok(Value::Boolean(true)));
        assert_eq!(parse(b"#f\r\n"), Ok(Value::Boolean(false)));
        assert_eq!(parse(b",1.5e0\r\n"), Ok(Value::Double(1.5)));
        assert_eq!(parse(b",-inf\r\n"), Ok(Value::Double(f64::NEG_INFINITY)));
        assert!(matches!(parse(b",nan\r\n"), Ok(Value::Double(d)) if d.is_nan()));
        assert_eq!(
            parse(b"(3492890328409238509324850943850943825024385\r\n"),
            Ok(Value::from(
                "3492890328409238509324850943850943825024385"
                    .parse::<BigInt>()
                    .unwrap()
            ))
        );
        assert_eq!(parse(b"=15\r\ntxt:Some string\r\n"), Ok(Value::text("Some string")));
    }

    #[test]
    fn parse_array_nested() {
        let data = b"*2\r\n*3\r\n:1\r\n:2\r\n:3\r\n*2\r\n+Hello\r\n-World\r\n";

        assert_eq!(
            parse(data),
            Ok(Value::Array(vec![
                Value::Array(vec![
                    Value::Integer(1),
                    Value::Integer(2),
                    Value::Integer(3)
                ]),
                Value::Array(vec![Value::text("Hello"), Value::error("World")]),
            ]))
        );
    }

    #[test]
    fn parse_array_null_in_the_middle() {
        let data = b"*3\r\n$5\r\nhello\r\n$-1\r\n$5\r\nworld\r\n";

        assert_eq!(
            parse(data),
            Ok(Value::Array(vec![
                Value::bulk("hello"),
                Value::Null,
                Value::bulk("world"),
            ]))
        );
    }

    #[test]
    fn parse_map() {
        assert_eq!(
            parse(b"%1\r\n+first\r\n:1\r\n"),
            Ok(Value::Map(vec![(Value::text("first"), Value::Integer(1))]))
        );
    }

    #[test]
    fn parse_unknown_type() {
        assert_eq!(parse(b"?oops\r\n"), Err(ParseError::InvalidDataType(b'?')));
    }
}
