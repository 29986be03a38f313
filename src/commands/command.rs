use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::store::Store;
use crate::value::Value;

/// Introspection placeholder. Clients such as `redis-cli` send it on connect; an empty array
/// keeps them happy.
///
/// Ref: <https://redis.io/docs/latest/commands/command/>
#[derive(Debug, PartialEq)]
pub struct Command;

impl Executable for Command {
    fn exec(self, _store: &mut Store) -> Result<Value, CommandError> {
        Ok(Value::Array(vec![]))
    }
}

impl TryFrom<&mut CommandParser> for Command {
    type Error = CommandError;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
