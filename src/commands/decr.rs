use crate::commands::executable::Executable;
use crate::commands::incr::{apply, key_and_amount};
use crate::commands::{CommandError, CommandParser};
use crate::store::Store;
use crate::value::Value;

/// Decrements the number stored at key by `amount`, one when omitted.
///
/// Ref: <https://redis.io/docs/latest/commands/decr/>
#[derive(Debug, PartialEq)]
pub struct Decr {
    pub key: String,
    pub amount: Option<i64>,
}

impl Executable for Decr {
    fn exec(self, store: &mut Store) -> Result<Value, CommandError> {
        let amount = self.amount.unwrap_or(1);
        apply(store, self.key, |current| current.checked_sub(amount))
    }
}

impl TryFrom<&mut CommandParser> for Decr {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let (key, amount) = key_and_amount(parser)?;

        Ok(Self { key, amount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use bytes::Bytes;

    #[test]
    fn existing_key() {
        let cmd = Command::try_from(vec![Bytes::from("DECR"), Bytes::from("key1")]).unwrap();

        assert_eq!(
            cmd,
            Command::Decr(Decr {
                key: "key1".to_string(),
                amount: None,
            })
        );

        let mut store = Store::new();
        store.set(String::from("key1"), Value::bulk("1"), None);

        let result = cmd.exec(&mut store).unwrap();

        assert_eq!(result, Value::Integer(0));
        assert_eq!(store.get("key1"), Ok(&Value::bulk("0")));
    }

    #[test]
    fn non_existing_key() {
        let mut store = Store::new();

        let result = Command::try_from(vec![Bytes::from("DECR"), Bytes::from("key1")])
            .unwrap()
            .exec(&mut store)
            .unwrap();

        assert_eq!(result, Value::Integer(-1));
    }

    #[test]
    fn incr_then_decr() {
        let mut store = Store::new();

        Command::try_from(vec![
            Bytes::from("INCR"),
            Bytes::from("key1"),
            Bytes::from("5"),
        ])
        .unwrap()
        .exec(&mut store)
        .unwrap();

        let result = Command::try_from(vec![
            Bytes::from("DECR"),
            Bytes::from("key1"),
            Bytes::from("3"),
        ])
        .unwrap()
        .exec(&mut store)
        .unwrap();

        assert_eq!(result, Value::Integer(2));
    }

    #[test]
    fn invalid_amount() {
        let err = Command::try_from(vec![
            Bytes::from("DECR"),
            Bytes::from("key1"),
            Bytes::from("1.5"),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            CommandError::InvalidAmount {
                command: "decr".to_string()
            }
        );
    }
}
