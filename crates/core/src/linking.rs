//! Linking codes: short-lived, single-use credentials that bind a tenant user
//! to the external chat identity that later presents the code.

use rand::Rng;
use serde::Serialize;

use crate::types::{TenantId, Timestamp, UserId};

/// Number of characters in a generated code.
pub const CODE_LENGTH: usize = 8;

/// Uppercase base36.
pub const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Default code lifetime in seconds (5 minutes).
pub const DEFAULT_CODE_TTL_SECS: i64 = 300;

/// How many fresh codes to try before giving up on a uniqueness conflict.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// A persisted linking code. Never deleted; `used` flips exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkingCode {
    pub code: String,
    pub owner_user_id: UserId,
    pub tenant_id: TenantId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub used: bool,
    pub used_at: Option<Timestamp>,
}

impl LinkingCode {
    /// `true` while the code is unused and `now < expires_at`.
    pub fn is_consumable_at(&self, now: Timestamp) -> bool {
        !self.used && now < self.expires_at
    }
}

/// Insert DTO for a new linking code.
#[derive(Debug, Clone)]
pub struct NewLinkingCode {
    pub code: String,
    pub owner_user_id: UserId,
    pub tenant_id: TenantId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl NewLinkingCode {
    pub fn new(
        code: impl Into<String>,
        owner_user_id: impl Into<UserId>,
        tenant_id: impl Into<TenantId>,
        now: Timestamp,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            code: code.into(),
            owner_user_id: owner_user_id.into(),
            tenant_id: tenant_id.into(),
            created_at: now,
            expires_at: now + ttl,
        }
    }
}

/// Who a successfully consumed code was issued to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeOwner {
    pub owner_user_id: UserId,
    pub tenant_id: TenantId,
}

/// Draw a random [`CODE_LENGTH`]-character code from [`CODE_ALPHABET`].
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// Canonicalize user-typed input: trims, uppercases, and rejects anything
/// that could not have been produced by [`generate_code`].
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    let well_formed = code.len() == CODE_LENGTH && code.bytes().all(|b| CODE_ALPHABET.contains(&b));
    well_formed.then_some(code)
}

/// Deep link that opens the bot conversation with the code as `/start` payload.
pub fn deep_link(bot_username: &str, code: &str) -> String {
    format!(
        "https://t.me/{}?start={code}",
        bot_username.trim_start_matches('@')
    )
}
