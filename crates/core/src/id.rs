//! ULID-class identifier generation.
//!
//! IDs are 26-character Crockford-base32 ULIDs: a 48-bit millisecond-epoch
//! prefix followed by 80 bits of randomness. Sorting by string equals
//! sorting by creation time. Callers may supply their own ID for
//! idempotency — the generator is only consulted when none is given.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use ulid::Ulid;

/// Trait for truncating identifiers to a short prefix (e.g. for CLI display).
pub trait ShortId {
    /// Returns a string slice truncated to at most `n` characters.
    fn short(&self, n: usize) -> &str;
}

impl ShortId for str {
    fn short(&self, n: usize) -> &str {
        if self.len() <= n {
            self
        } else {
            &self[..n]
        }
    }
}

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `short()`, `Display`, `From<String>`,
/// `From<&str>`, `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>`.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns a string slice truncated to at most `n` characters.
            pub fn short(&self, n: usize) -> &str {
                if self.0.len() <= n {
                    &self.0
                } else {
                    &self.0[..n]
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Which kind of entity an ID names, for prefixing in log lines / errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Task,
    Event,
    Artifact,
}

impl IdKind {
    fn prefix(self) -> &'static str {
        match self {
            IdKind::Task => "task_",
            IdKind::Event => "ev_",
            IdKind::Artifact => "art_",
        }
    }
}

/// Generates ULID-class identifiers, monotonic within a millisecond.
pub trait IdGen: Send + Sync {
    fn next(&self, kind: IdKind) -> String;

    fn next_task_id(&self) -> String {
        self.next(IdKind::Task)
    }
    fn next_event_id(&self) -> String {
        self.next(IdKind::Event)
    }
    fn next_artifact_id(&self) -> String {
        self.next(IdKind::Artifact)
    }
}

/// Production ULID generator. Within the same millisecond, successive
/// IDs are strictly increasing: a monotonic counter seeded from the
/// previous random tail is bumped instead of re-rolled, matching spec
/// §4.1 ("successive IDs must be strictly increasing").
pub struct MonotonicUlidGen {
    last: Mutex<Option<Ulid>>,
}

impl Default for MonotonicUlidGen {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicUlidGen {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }
}

impl IdGen for MonotonicUlidGen {
    fn next(&self, kind: IdKind) -> String {
        let now_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let mut last = self.last.lock();
        let candidate = Ulid::new();
        let next = match *last {
            Some(prev) if prev.timestamp_ms() >= now_ms => prev
                .increment()
                .unwrap_or_else(|| Ulid::from_parts(now_ms, candidate.random())),
            _ => candidate,
        };
        *last = Some(next);
        format!("{}{}", kind.prefix(), next)
    }
}

/// Sequential ID generator for deterministic tests.
pub struct SequentialIdGen {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("test")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self, kind: IdKind) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}{}-{:06}", kind.prefix(), self.prefix, n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
