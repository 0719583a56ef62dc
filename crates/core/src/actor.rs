//! Actor identity: `kind:identifier`, e.g. `human:alice`, `agent:claude-1`.
//!
//! Spec §6 fixes the wire format but leaves authentication and access
//! control out of scope; `Actor` only validates shape.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

fn actor_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_-]*:\S+$").expect("static actor regex"))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid actor string {0:?}: must match kind:identifier, e.g. human:alice")]
pub struct InvalidActor(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Actor(String);

impl Actor {
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidActor> {
        let raw = raw.into();
        if actor_pattern().is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(InvalidActor(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> &str {
        self.0.split_once(':').map(|(k, _)| k).unwrap_or(&self.0)
    }

    pub fn identifier(&self) -> &str {
        self.0.split_once(':').map(|(_, id)| id).unwrap_or("")
    }
}

impl TryFrom<String> for Actor {
    type Error = InvalidActor;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Actor::parse(value)
    }
}

impl From<Actor> for String {
    fn from(actor: Actor) -> Self {
        actor.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
