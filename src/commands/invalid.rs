use crate::commands::executable::Executable;
use crate::commands::CommandError;
use crate::store::Store;
use crate::value::Value;

/// Stands in for empty frames and names that are not registered.
#[derive(Debug, PartialEq)]
pub struct Invalid;

impl Executable for Invalid {
    fn exec(self, _store: &mut Store) -> Result<Value, CommandError> {
        Err(CommandError::InvalidCommand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_fails() {
        let err = Invalid.exec(&mut Store::new()).unwrap_err();

        assert_eq!(err, CommandError::InvalidCommand);
        assert_eq!(err.to_string(), "ERR invalid command");
    }
}
