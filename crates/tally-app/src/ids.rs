// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;
use std::fmt;
use uuid::Uuid;

/// Opaque identity of a line item. Only equality matters; the format depends
/// on the generator that minted it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineItemId(String);

impl LineItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

pub trait IdGenerator {
    fn next_id(&mut self) -> LineItemId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> LineItemId {
        LineItemId(Uuid::new_v4().to_string())
    }
}

/// Counter-backed ids (`item-1`, `item-2`, ...). Deterministic, so tests and
/// the `sequential` config option use it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub const fn new() -> Self {
        Self { next: 0 }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> LineItemId {
        self.next = self.next.saturating_add(1);
        LineItemId(format!("item-{}", self.next))
    }
}

/// Config value of `[ids] generator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    Uuid,
    Sequential,
}

impl IdStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::Sequential => "sequential",
        }
    }

    pub fn source(self) -> IdSource {
        match self {
            Self::Uuid => IdSource::Uuid(UuidIds),
            Self::Sequential => IdSource::Sequential(SequentialIds::new()),
        }
    }
}

/// Generator picked at startup from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSource {
    Uuid(UuidIds),
    Sequential(SequentialIds),
}

impl Default for IdSource {
    fn default() -> Self {
        Self::Uuid(UuidIds)
    }
}

impl IdGenerator for IdSource {
    fn next_id(&mut self) -> LineItemId {
        match self {
            Self::Uuid(ids) => ids.next_id(),
            Self::Sequential(ids) => ids.next_id(),
        }
    }
}
