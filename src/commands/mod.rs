pub mod command;
pub mod decr;
pub mod del;
pub mod echo;
pub mod executable;
pub mod exists;
pub mod get;
pub mod incr;
pub mod invalid;
pub mod lpush;
pub mod ping;
pub mod rpush;
pub mod set;

use bytes::Bytes;
use std::str::{self, FromStr};
use std::vec;
use strum_macros::{AsRefStr, EnumIter, EnumString};
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Store;
use crate::value::Value;

use command::Command as Command_;
use decr::Decr;
use del::Del;
use echo::Echo;
use exists::Exists;
use get::Get;
use incr::Incr;
use invalid::Invalid;
use lpush::Lpush;
use ping::Ping;
use rpush::Rpush;
use set::Set;

/// Names the server answers to, matched case-insensitively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CommandName {
    Get,
    Set,
    Command,
    Ping,
    Echo,
    Exists,
    Del,
    Incr,
    Decr,
    Lpush,
    Rpush,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Decr(Decr),
    Del(Del),
    Exists(Exists),
    Get(Get),
    Incr(Incr),
    Lpush(Lpush),
    Rpush(Rpush),
    Set(Set),

    Command(Command_),
    Echo(Echo),
    Invalid(Invalid),
    Ping(Ping),
}

impl Executable for Command {
    fn exec(self, store: &mut Store) -> Result<Value, CommandError> {
        match self {
            Command::Command(cmd) => cmd.exec(store),
            Command::Decr(cmd) => cmd.exec(store),
            Command::Del(cmd) => cmd.exec(store),
            Command::Echo(cmd) => cmd.exec(store),
            Command::Exists(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::Incr(cmd) => cmd.exec(store),
            Command::Invalid(cmd) => cmd.exec(store),
            Command::Lpush(cmd) => cmd.exec(store),
            Command::Ping(cmd) => cmd.exec(store),
            Command::Rpush(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
        }
    }
}

impl TryFrom<Vec<Bytes>> for Command {
    type Error = CommandError;

    fn try_from(args: Vec<Bytes>) -> Result<Self, Self::Error> {
        let mut parts = args.into_iter();

        // Empty frames and unknown names all end up in the same handler.
        let name = match parts.next().as_deref().and_then(parse_command_name) {
            Some(name) => name,
            None => return Ok(Command::Invalid(Invalid)),
        };

        let parser = &mut CommandParser {
            command: name,
            parts,
        };

        match name {
            CommandName::Command => Command_::try_from(parser).map(Command::Command),
            CommandName::Decr => Decr::try_from(parser).map(Command::Decr),
            CommandName::Del => Del::try_from(parser).map(Command::Del),
            CommandName::Echo => Echo::try_from(parser).map(Command::Echo),
            CommandName::Exists => Exists::try_from(parser).map(Command::Exists),
            CommandName::Get => Get::try_from(parser).map(Command::Get),
            CommandName::Incr => Incr::try_from(parser).map(Command::Incr),
            CommandName::Lpush => Lpush::try_from(parser).map(Command::Lpush),
            CommandName::Ping => Ping::try_from(parser).map(Command::Ping),
            CommandName::Rpush => Rpush::try_from(parser).map(Command::Rpush),
            CommandName::Set => Set::try_from(parser).map(Command::Set),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        Command::try_from(frame.arguments())
    }
}

/// Runs one framed command against the store and turns the outcome into the reply for the client.
pub fn execute(store: &mut Store, frame: Frame) -> Value {
    let res = Command::try_from(frame).and_then(|cmd| cmd.exec(store));

    match res {
        Ok(value) => value,
        Err(err) => Value::Error(err.to_string()),
    }
}

fn parse_command_name(bytes: &[u8]) -> Option<CommandName> {
    str::from_utf8(bytes)
        .ok()
        .and_then(|name| CommandName::from_str(name).ok())
}

/// Parses a base 10 signed integer argument.
pub(crate) fn parse_integer(bytes: &[u8]) -> Option<i64> {
    str::from_utf8(bytes).ok()?.parse::<i64>().ok()
}

/// Walks the arguments that follow the command name.
pub struct CommandParser {
    command: CommandName,
    parts: vec::IntoIter<Bytes>,
}

impl CommandParser {
    pub(crate) fn command(&self) -> CommandName {
        self.command
    }

    pub(crate) fn next_bytes(&mut self) -> Result<Bytes, CommandError> {
        self.parts.next().ok_or_else(|| self.wrong_arity())
    }

    pub(crate) fn try_next_bytes(&mut self) -> Option<Bytes> {
        self.parts.next()
    }

    /// Keys are text; anything that is not valid UTF-8 is rejected.
    pub(crate) fn next_key(&mut self) -> Result<String, CommandError> {
        let bytes = self.next_bytes()?;

        str::from_utf8(&bytes[..])
            .map(|s| s.to_string())
            .map_err(|_| CommandError::KeyNotText)
    }

    /// All remaining arguments as keys. At least one is required.
    pub(crate) fn remaining_keys(&mut self) -> Result<Vec<String>, CommandError> {
        let mut keys = vec![self.next_key()?];
        while !self.is_empty() {
            keys.push(self.next_key()?);
        }
        Ok(keys)
    }

    /// All remaining arguments as values. At least one is required.
    pub(crate) fn remaining_bytes(&mut self) -> Result<Vec<Bytes>, CommandError> {
        let first = self.next_bytes()?;
        Ok(std::iter::once(first).chain(self.parts.by_ref()).collect())
    }

    /// Fails when arguments are left over.
    pub(crate) fn finish(&mut self) -> Result<(), CommandError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.wrong_arity())
        }
    }

    fn is_empty(&self) -> bool {
        self.parts.as_slice().is_empty()
    }

    fn wrong_arity(&self) -> CommandError {
        CommandError::WrongArity {
            command: self.command.as_ref().to_string(),
        }
    }
}

/// Errors reported back to the client. The connection stays open after any of them.
#[derive(Debug, ThisError, PartialEq)]
pub enum CommandError {
    #[error("ERR invalid command")]
    InvalidCommand,
    #[error("ERR wrong number of arguments for '{command}' command")]
    WrongArity { command: String },
    #[error("ERR invalid use. key must be string")]
    KeyNotText,
    #[error("ERR wrong arguments for 'set' command. '{option}' value invalid")]
    InvalidExpiry { option: String },
    #[error("ERR wrong number of arguments for 'set' command. multiple expiries provided")]
    MultipleExpiries,
    #[error("ERR wrong arguments for 'set' command. unknown option '{option}'")]
    UnknownOption { option: String },
    #[error("ERR invalid '{command}' value provided")]
    InvalidAmount { command: String },
    #[error("ERR value is not an integer or out of range")]
    NotInteger,
    #[error("ERR cannot push to a non list value")]
    WrongType,
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn args(parts: &[&'static str]) -> Vec<Bytes> {
        parts.iter().map(|part| Bytes::from(*part)).collect()
    }

    #[test]
    fn names_are_case_insensitive() {
        for name in ["GET", "get", "Get", "gEt"] {
            let cmd = Command::try_from(args(&[name, "foo"])).unwrap();

            assert_eq!(
                cmd,
                Command::Get(Get {
                    key: String::from("foo")
                })
            );
        }
    }

    #[test]
    fn registry() {
        let names: Vec<String> = CommandName::iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "get", "set", "command", "ping", "echo", "exists", "del", "incr", "decr", "lpush",
                "rpush"
            ]
        );
    }

    #[test]
    fn unknown_and_empty_commands_are_invalid() {
        assert_eq!(
            Command::try_from(args(&["FLUSHALL"])).unwrap(),
            Command::Invalid(Invalid)
        );
        assert_eq!(
            Command::try_from(Vec::<Bytes>::new()).unwrap(),
            Command::Invalid(Invalid)
        );
        assert_eq!(
            Command::try_from(vec![Bytes::from_static(&[0xff, 0xfe])]).unwrap(),
            Command::Invalid(Invalid)
        );

        let mut store = Store::new();
        assert_eq!(
            execute(&mut store, Frame::Inline(Bytes::from("FLUSHALL"))),
            Value::error("ERR invalid command")
        );
    }

    #[test]
    fn from_inline_frame() {
        let frame = Frame::Inline(Bytes::from("SET foo bar"));

        assert_eq!(
            Command::try_from(frame).unwrap(),
            Command::Set(Set {
                key: String::from("foo"),
                value: Bytes::from("bar"),
                expiry: None,
            })
        );
    }

    #[test]
    fn key_must_be_text() {
        let err = Command::try_from(vec![
            Bytes::from("GET"),
            Bytes::from_static(&[0xc3, 0x28]),
        ])
        .unwrap_err();

        assert_eq!(err, CommandError::KeyNotText);
    }

    #[test]
    fn execute_renders_errors() {
        let mut store = Store::new();

        assert_eq!(
            execute(&mut store, Frame::Array(Bytes::from("*1\r\n$3\r\nGET\r\n"))),
            Value::error("ERR wrong number of arguments for 'get' command")
        );
        assert_eq!(
            execute(&mut store, Frame::Inline(Bytes::from("SET k v"))),
            Value::text("OK")
        );
        assert_eq!(
            execute(&mut store, Frame::Inline(Bytes::from("GET k"))),
            Value::bulk("v")
        );
        assert_eq!(
            execute(&mut store, Frame::Inline(Bytes::new())),
            Value::error("ERR invalid command")
        );
    }
}
