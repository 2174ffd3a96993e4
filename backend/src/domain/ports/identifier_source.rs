//! Driven port supplying fresh identifiers.
//!
//! Injected so tests can pin the ids a service assigns.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{EntryId, UserId};

pub trait IdentifierSource: Send + Sync {
    /// A never-before-issued user id.
    fn user_id(&self) -> UserId;

    /// A never-before-issued entry id, time-ordered by `created_at`.
    fn entry_id(&self, created_at: DateTime<Utc>) -> EntryId;
}

/// Production source: random v4 user ids and v7 entry ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdentifierSource;

impl IdentifierSource for RandomIdentifierSource {
    fn user_id(&self) -> UserId {
        UserId::random()
    }

    fn entry_id(&self, created_at: DateTime<Utc>) -> EntryId {
        EntryId::for_instant(created_at)
    }
}

/// Deterministic source issuing `00000000-0000-4000-8000-<counter>` user ids
/// and `00000000-0000-7000-8000-<counter>` entry ids from one shared counter.
#[derive(Debug, Default)]
pub struct SequentialIdentifierSource {
    next: AtomicU64,
}

impl SequentialIdentifierSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl IdentifierSource for SequentialIdentifierSource {
    fn user_id(&self) -> UserId {
        let n = self.bump();
        UserId::from_uuid(Uuid::from_u128(
            (0x4000_u128 << 64) | (0x8000_u128 << 48) | u128::from(n),
        ))
    }

    fn entry_id(&self, _created_at: DateTime<Utc>) -> EntryId {
        let n = self.bump();
        EntryId::from_uuid(Uuid::from_u128(
            (0x7000_u128 << 64) | (0x8000_u128 << 48) | u128::from(n),
        ))
    }
}
