use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::list::List;
use crate::store::{self, Store};
use crate::value::Value;

/// Insert all the specified values at the head of the list stored at key, one after the other.
/// `LPUSH mylist a b c` therefore leaves `c` first.
///
/// Ref: <https://redis.io/docs/latest/commands/lpush/>
#[derive(Debug, PartialEq)]
pub struct Lpush {
    pub key: String,
    pub values: Vec<Bytes>,
}

impl Executable for Lpush {
    fn exec(self, store: &mut Store) -> Result<Value, CommandError> {
        push(store, self.key, self.values, End::Front)
    }
}

impl TryFrom<&mut CommandParser> for Lpush {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_key()?;
        let values = parser.remaining_bytes()?;

        Ok(Self { key, values })
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum End {
    Front,
    Back,
}

/// Pushes `values` onto the list at `key` and returns its new length. An existing list is
/// changed in place and keeps its expiry; a new one never expires.
pub(crate) fn push(
    store: &mut Store,
    key: String,
    values: Vec<Bytes>,
    end: End,
) -> Result<Value, CommandError> {
    let insert = |list: &mut List| {
        for value in values {
            match end {
                End::Front => list.prepend(Value::Bulk(value)),
                End::Back => list.append(Value::Bulk(value)),
            }
        }
        list.len()
    };

    let len = match store.get_mut(&key) {
        Ok(Value::List(list)) => insert(list),
        Ok(_) => return Err(CommandError::WrongType),
        Err(store::Error::KeyAbsent) => {
            let mut list = List::new();
            let len = insert(&mut list);
            store.set(key, Value::List(list), None);
            len
        }
    };

    Ok(Value::Integer(len as i64))
}
