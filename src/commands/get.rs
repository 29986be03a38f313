use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::store::{self, Store};
use crate::value::Value;

/// Get the value of `key`. If the key does not exist the special value `nil` is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/get/>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: String,
}

impl Executable for Get {
    fn exec(self, store: &mut Store) -> Result<Value, CommandError> {
        match store.get(&self.key) {
            Ok(value) => Ok(value.clone()),
            Err(store::Error::KeyAbsent) => Ok(Value::Null),
        }
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_key()?;
        parser.finish()?;

        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::store::Expiry;
    use bytes::Bytes;

    #[test]
    fn existing_key() {
        let cmd = Command::try_from(vec![Bytes::from("GET"), Bytes::from("key1")]).unwrap();

        assert_eq!(
            cmd,
            Command::Get(Get {
                key: String::from("key1")
            })
        );

        let mut store = Store::new();
        store.set(String::from("key1"), Value::bulk("1"), None);

        let result = cmd.exec(&mut store).unwrap();

        assert_eq!(result, Value::bulk("1"));
    }

    #[test]
    fn missing_key() {
        let cmd = Command::try_from(vec![Bytes::from("GET"), Bytes::from("key1")]).unwrap();

        let mut store = Store::new();

        let result = cmd.exec(&mut store).unwrap();

        assert_eq!(result, Value::Null);
    }

    #[test]
    fn expired_key() {
        let cmd = Command::try_from(vec![Bytes::from("GET"), Bytes::from("key1")]).unwrap();

        let mut store = Store::new();
        store.set(String::from("key1"), Value::bulk("1"), Some(Expiry::Ex(0)));

        let result = cmd.exec(&mut store).unwrap();

        assert_eq!(result, Value::Null);
        assert!(store.is_empty());
    }

    #[test]
    fn wrong_number_of_arguments() {
        let err = Command::try_from(vec![Bytes::from("GET")]).unwrap_err();
        assert_eq!(
            err,
            CommandError::WrongArity {
                command: "get".to_string()
            }
        );

        let err = Command::try_from(vec![
            Bytes::from("GET"),
            Bytes::from("key1"),
            Bytes::from("key2"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            CommandError::WrongArity {
                command: "get".to_string()
            }
        );
    }
}
