use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{parse_integer, CommandError, CommandParser};
use crate::store::{Expiry, Store};
use crate::value::Value;

/// Set `key` to hold the string `value`. If `key` already holds a value, it is overwritten,
/// regardless of its type. At most one of `EX`, `PX`, `EXAT` or `PXAT` may be given.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: Bytes,
    pub expiry: Option<Expiry>,
}

impl Executable for Set {
    fn exec(self, store: &mut Store) -> Result<Value, CommandError> {
        store.set(self.key, Value::Bulk(self.value), self.expiry);

        Ok(Value::text("OK"))
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_key()?;
        let value = parser.next_bytes()?;

        let mut expiry = None;

        while let Some(option) = parser.try_next_bytes() {
            let option = String::from_utf8_lossy(&option).to_uppercase();

            let expiry_at: fn(i64) -> Expiry = match option.as_str() {
                "EX" => Expiry::Ex,
                "PX" => Expiry::Px,
                "EXAT" => Expiry::ExAt,
                "PXAT" => Expiry::PxAt,
                _ => {
                    return Err(CommandError::UnknownOption {
                        option: option.clone(),
                    })
                }
            };

            if expiry.is_some() {
                return Err(CommandError::MultipleExpiries);
            }

            let amount = parser
                .try_next_bytes()
                .and_then(|amount| parse_integer(&amount))
                .ok_or_else(|| CommandError::InvalidExpiry {
                    option: option.clone(),
                })?;

            expiry = Some(expiry_at(amount));
        }

        Ok(Self { key, value, expiry })
    }
}
