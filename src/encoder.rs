use std::collections::HashMap;

use bytes::{BufMut, BytesMut};

use crate::value::{DataType, Value};

static CRLF: &[u8; 2] = b"\r\n";

/// Option key selecting the protocol version replies are encoded for. `"2"` flattens maps into
/// arrays.
pub const RESP_VERSION: &str = "resp_version";
/// Option key holding a three character type tag (e.g. `txt`) that turns text replies into
/// verbatim strings.
pub const VERBATIM: &str = "verbatim";

/// String to string settings consulted while encoding a reply.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SerDeOptions {
    options: HashMap<String, String>,
}

impl SerDeOptions {
    pub fn new() -> SerDeOptions {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> SerDeOptions {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    fn legacy_maps(&self) -> bool {
        self.get(RESP_VERSION) == Some("2")
    }

    fn verbatim_tag(&self) -> Option<&str> {
        self.get(VERBATIM).filter(|tag| tag.len() == 3)
    }
}

/// Renders `value` in wire format.
#[cfg(test)]
pub(crate) fn encode(value: &Value, options: &SerDeOptions) -> Vec<u8> {
    let mut dst = BytesMut::new();
    encode_into(value, options, &mut dst);
    dst.to_vec()
}

/// Renders `value` in wire format, appending to `dst`.
pub fn encode_into(value: &Value, options: &SerDeOptions, dst: &mut BytesMut) {
    match value {
        Value::Null => {
            // RESP2 null bulk string, understood by every client.
            dst.put_u8(u8::from(DataType::BulkString));
            dst.put_slice(b"-1");
            dst.put_slice(CRLF);
        }
        Value::Integer(i) => {
            dst.put_u8(u8::from(DataType::Integer));
            dst.put_slice(i.to_string().as_bytes());
            dst.put_slice(CRLF);
        }
        Value::Double(d) => {
            let repr = if d.is_nan() {
                "nan".to_string()
            } else if *d == f64::INFINITY {
                "inf".to_string()
            } else if *d == f64::NEG_INFINITY {
                "-inf".to_string()
            } else {
                format!("{d:e}")
            };
            dst.put_u8(u8::from(DataType::Double));
            dst.put_slice(repr.as_bytes());
            dst.put_slice(CRLF);
        }
        Value::Boolean(b) => {
            dst.put_u8(u8::from(DataType::Boolean));
            dst.put_u8(if *b { b't' } else { b'f' });
            dst.put_slice(CRLF);
        }
        Value::Text(s) => match options.verbatim_tag() {
            Some(tag) => {
                // =<length>\r\n<tag>:<data>\r\n
                dst.put_u8(u8::from(DataType::VerbatimString));
                dst.put_slice((tag.len() + 1 + s.len()).to_string().as_bytes());
                dst.put_slice(CRLF);
                dst.put_slice(tag.as_bytes());
                dst.put_u8(b':');
                dst.put_slice(s.as_bytes());
                dst.put_slice(CRLF);
            }
            None if needs_length_prefix(s) => {
                put_length_prefixed(DataType::BulkString, s.as_bytes(), dst)
            }
            None => put_simple(DataType::SimpleString, s, dst),
        },
        Value::Bulk(bytes) => put_length_prefixed(DataType::BulkString, bytes, dst),
        Value::Error(msg) => {
            if needs_length_prefix(msg) {
                put_length_prefixed(DataType::BulkError, msg.as_bytes(), dst)
            } else {
                put_simple(DataType::SimpleError, msg, dst)
            }
        }
        Value::Array(values) => {
            put_header(DataType::Array, values.len(), dst);
            for value in values {
                encode_into(value, options, dst);
            }
        }
        Value::List(list) => {
            put_header(DataType::Array, list.len(), dst);
            for value in list {
                encode_into(value, options, dst);
            }
        }
        Value::Map(pairs) if options.legacy_maps() => {
            put_header(DataType::Array, pairs.len() * 2, dst);
            for (key, value) in pairs {
                encode_into(key, options, dst);
                encode_into(value, options, dst);
            }
        }
        Value::Map(pairs) => {
            put_header(DataType::Map, pairs.len(), dst);
            for (key, value) in pairs {
                encode_into(key, options, dst);
                encode_into(value, options, dst);
            }
        }
        Value::BigNumber(n) => {
            dst.put_u8(u8::from(DataType::BigNumber));
            dst.put_slice(n.to_string().as_bytes());
            dst.put_slice(CRLF);
        }
    }
}

/// Simple strings and errors cannot carry CR, LF or other control characters.
fn needs_length_prefix(s: &str) -> bool {
    s.chars().any(char::is_control)
}

fn put_simple(data_type: DataType, s: &str, dst: &mut BytesMut) {
    dst.put_u8(u8::from(data_type));
    dst.put_slice(s.as_bytes());
    dst.put_slice(CRLF);
}

fn put_length_prefixed(data_type: DataType, data: &[u8], dst: &mut BytesMut) {
    put_header(data_type, data.len(), dst);
    dst.put_slice(data);
    dst.put_slice(CRLF);
}

fn put_header(data_type: DataType, len: usize, dst: &mut BytesMut) {
    dst.put_u8(u8::from(data_type));
    dst.put_slice(len.to_string().as_bytes());
    dst.put_slice(CRLF);
}
