use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error as ThisError;

use crate::value::Value;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    /// The key holds no live entry. Never sent to clients as is; commands translate it.
    #[error("key absent")]
    KeyAbsent,
}

/// When an entry stops being visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Expiry {
    /// Seconds from now.
    Ex(i64),
    /// Milliseconds from now.
    Px(i64),
    /// Unix time in seconds.
    ExAt(i64),
    /// Unix time in milliseconds.
    PxAt(i64),
}

impl Expiry {
    /// The absolute instant this expiry refers to, taking `now` as the current time. Negative
    /// amounts land in the past.
    pub fn deadline(&self, now: SystemTime) -> SystemTime {
        match *self {
            Expiry::Ex(seconds) => {
                shift(now, seconds.unsigned_abs().saturating_mul(1000), seconds < 0)
            }
            Expiry::Px(millis) => shift(now, millis.unsigned_abs(), millis < 0),
            Expiry::ExAt(seconds) => {
                shift(UNIX_EPOCH, seconds.unsigned_abs().saturating_mul(1000), seconds < 0)
            }
            Expiry::PxAt(millis) => shift(UNIX_EPOCH, millis.unsigned_abs(), millis < 0),
        }
    }
}

fn shift(from: SystemTime, millis: u64, backwards: bool) -> SystemTime {
    let offset = Duration::from_millis(millis);
    let shifted = if backwards {
        from.checked_sub(offset)
    } else {
        from.checked_add(offset)
    };

    // Out of range instants clamp to the furthest representable point we can reason about.
    shifted.unwrap_or(if backwards { UNIX_EPOCH } else { far_future(from) })
}

fn far_future(from: SystemTime) -> SystemTime {
    from.checked_add(Duration::from_secs(100 * 365 * 24 * 60 * 60))
        .unwrap_or(from)
}

#[derive(Debug)]
pub struct Entry {
    pub value: Value,
    /// `None` never expires.
    pub expires_at: Option<SystemTime>,
}

impl Entry {
    fn is_live(&self, now: SystemTime) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// The key space. It has exactly one owner, the task executing commands, so it carries no
/// locking of its own.
///
/// Expired entries are removed lazily: a lookup that finds one deletes it and reports the key as
/// absent. Nothing sweeps them in the background.
#[derive(Debug, Default)]
pub struct Store {
    entries: HashMap<String, Entry>,
}

impl Store {
    pub fn new() -> Store {
        Self::default()
    }

    pub fn get(&mut self, key: &str) -> Result<&Value, Error> {
        self.get_mut(key).map(|value| &*value)
    }

    /// Mutable access to a live value. Changing it in place keeps the entry's expiry.
    pub fn get_mut(&mut self, key: &str) -> Result<&mut Value, Error> {
        self.purge_if_expired(key);

        self.entries
            .get_mut(key)
            .map(|entry| &mut entry.value)
            .ok_or(Error::KeyAbsent)
    }

    /// Stores `value` under `key`, replacing whatever was there regardless of its type. Without
    /// an expiry the entry never expires.
    pub fn set(&mut self, key: String, value: Value, expiry: Option<Expiry>) {
        let expires_at = expiry.map(|expiry| expiry.deadline(SystemTime::now()));
        self.entries.insert(key, Entry { value, expires_at });
    }

    pub fn exists(&mut self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    /// Removes a live entry, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.purge_if_expired(key);
        self.entries.remove(key).map(|entry| entry.value)
    }

    #[cfg(test)]
    pub(crate) fn expires_at(&mut self, key: &str) -> Result<Option<SystemTime>, Error> {
        self.purge_if_expired(key);

        self.entries
            .get(key)
            .map(|entry| entry.expires_at)
            .ok_or(Error::KeyAbsent)
    }

    /// Number of entries held, including expired ones nobody has looked up yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn purge_if_expired(&mut self, key: &str) {
        let now = SystemTime::now();
        if self
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_live(now))
        {
            self.entries.remove(key);
        }
    }
}
