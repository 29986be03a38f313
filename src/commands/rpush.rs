use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::lpush::{push, End};
use crate::commands::{CommandError, CommandParser};
use crate::store::Store;
use crate::value::Value;

/// Insert all the specified values at the tail of the list stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/rpush/>
#[derive(Debug, PartialEq)]
pub struct Rpush {
    pub key: String,
    pub values: Vec<Bytes>,
}

impl Executable for Rpush {
    fn exec(self, store: &mut Store) -> Result<Value, CommandError> {
        push(store, self.key, self.values, End::Back)
    }
}

impl TryFrom<&mut CommandParser> for Rpush {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_key()?;
        let values = parser.remaining_bytes()?;

        Ok(Self { key, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn appends_in_order() {
        let mut store = Store::new();

        for (value, len) in [("a", 1), ("b", 2)] {
            let result = Command::try_from(vec![
                Bytes::from("RPUSH"),
                Bytes::from("mylist"),
                Bytes::from(value),
            ])
            .unwrap()
            .exec(&mut store)
            .unwrap();

            assert_eq!(result, Value::Integer(len));
        }

        match store.get("mylist") {
            Ok(Value::List(list)) => {
                assert_eq!(list.to_vec(), vec![Value::bulk("a"), Value::bulk("b")])
            }
            other => panic!("expected a list, got {other:?}"),
        }
    }

    #[test]
    fn wrong_type() {
        let mut store = Store::new();
        store.set("key1".to_string(), Value::Integer(1), None);

        let err = Command::try_from(vec![
            Bytes::from("RPUSH"),
            Bytes::from("key1"),
            Bytes::from("a"),
        ])
        .unwrap()
        .exec(&mut store)
        .unwrap_err();

        assert_eq!(err, CommandError::WrongType);
    }
}
