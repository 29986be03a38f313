use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::store::Store;
use crate::value::Value;

/// Returns `PONG`. Arguments are ignored.
///
/// Ref: <https://redis.io/docs/latest/commands/ping/>
#[derive(Debug, PartialEq)]
pub struct Ping;

impl Executable for Ping {
    fn exec(self, _store: &mut Store) -> Result<Value, CommandError> {
        Ok(Value::text("PONG"))
    }
}

impl TryFrom<&mut CommandParser> for Ping {
    type Error = CommandError;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use bytes::Bytes;

    #[test]
    fn pong() {
        for args in [
            vec![Bytes::from("PING")],
            vec![Bytes::from("ping"), Bytes::from("hello")],
        ] {
            let cmd = Command::try_from(args).unwrap();
            assert_eq!(cmd, Command::Ping(Ping));

            let result = cmd.exec(&mut Store::new()).unwrap();
            assert_eq!(result, Value::text("PONG"));
        }
    }
}
