use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{parse_integer, CommandError, CommandParser};
use crate::store::{self, Store};
use crate::value::Value;

/// Increments the number stored at key by `amount`, one when omitted. A missing key counts as 0.
/// The result is written back without an expiry.
///
/// Ref: <https://redis.io/docs/latest/commands/incr/>
#[derive(Debug, PartialEq)]
pub struct Incr {
    pub key: String,
    pub amount: Option<i64>,
}

impl Executable for Incr {
    fn exec(self, store: &mut Store) -> Result<Value, CommandError> {
        let amount = self.amount.unwrap_or(1);
        apply(store, self.key, |current| current.checked_add(amount))
    }
}

impl TryFrom<&mut CommandParser> for Incr {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let (key, amount) = key_and_amount(parser)?;

        Ok(Self { key, amount })
    }
}

/// Reads `key [amount]`, shared by `INCR` and `DECR`.
pub(crate) fn key_and_amount(
    parser: &mut CommandParser,
) -> Result<(String, Option<i64>), CommandError> {
    let key = parser.next_key()?;
    let amount = parser.try_next_bytes();
    parser.finish()?;

    let amount = amount
        .map(|amount| {
            parse_integer(&amount).ok_or_else(|| CommandError::InvalidAmount {
                command: parser.command().as_ref().to_string(),
            })
        })
        .transpose()?;

    Ok((key, amount))
}

/// Replaces the integer stored at `key` with `op(current)`.
pub(crate) fn apply(
    store: &mut Store,
    key: String,
    op: impl FnOnce(i64) -> Option<i64>,
) -> Result<Value, CommandError> {
    let current = match store.get(&key) {
        Ok(value) => as_integer(value).ok_or(CommandError::NotInteger)?,
        Err(store::Error::KeyAbsent) => 0,
    };

    let next = op(current).ok_or(CommandError::NotInteger)?;

    store.set(key, Value::Bulk(Bytes::from(next.to_string())), None);

    Ok(Value::Integer(next))
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Bulk(bytes) => parse_integer(bytes),
        Value::Text(text) => parse_integer(text.as_bytes()),
        Value::Integer(i) => Some(*i),
        _ => None,
    }
}
