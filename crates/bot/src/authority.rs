//! Issues and consumes linking codes.

use std::sync::Arc;

use chatlink_core::clock::Clock;
use chatlink_core::linking::{self, CodeOwner, NewLinkingCode, MAX_GENERATION_ATTEMPTS};
use chatlink_core::types::Timestamp;
use chatlink_db::LinkingCodeStore;
use serde::Serialize;

use crate::error::{BotError, BotResult};

type CodeGenerator = dyn Fn() -> String + Send + Sync;

/// A freshly stored code, ready to hand to the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: Timestamp,
}

pub struct LinkingCodeAuthority {
    store: Arc<dyn LinkingCodeStore>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    generator: Arc<CodeGenerator>,
}

impl LinkingCodeAuthority {
    pub fn new(store: Arc<dyn LinkingCodeStore>, clock: Arc<dyn Clock>, ttl: chrono::Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            generator: Arc::new(|| linking::generate_code(&mut rand::rng())),
        }
    }

    /// Replace the random source, e.g. to force collisions in tests.
    pub fn with_generator(mut self, generator: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.generator = Arc::new(generator);
        self
    }

    /// Generate and store a code for `owner_user_id`.
    ///
    /// A code that already exists in the store is discarded and a new one
    /// drawn, up to [`MAX_GENERATION_ATTEMPTS`] times.
    pub async fn generate_code(&self, owner_user_id: &str, tenant_id: &str) -> BotResult<IssuedCode> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let code = (self.generator)();
            if let Some(issued) = self.store_code(&code, owner_user_id, tenant_id).await? {
                tracing::info!(owner_user_id, tenant_id, attempt, "Linking code issued");
                return Ok(issued);
            }
            tracing::warn!(attempt, "Linking code collision, regenerating");
        }
        Err(BotError::CodeSpaceExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Persist `code` with `used = false`. `None` when the code is taken.
    pub async fn store_code(
        &self,
        code: &str,
        owner_user_id: &str,
        tenant_id: &str,
    ) -> BotResult<Option<IssuedCode>> {
        let input = NewLinkingCode::new(code, owner_user_id, tenant_id, self.clock.now(), self.ttl);
        let inserted = self.store.insert_code(&input).await?;
        Ok(inserted.then(|| IssuedCode {
            code: input.code,
            expires_at: input.expires_at,
        }))
    }

    /// Atomically consume a code typed or deep-linked by a user.
    ///
    /// Missing, malformed, expired, and already-used codes all yield `None`.
    pub async fn verify_and_consume(&self, raw: &str) -> BotResult<Option<CodeOwner>> {
        let Some(code) = linking::normalize_code(raw) else {
            return Ok(None);
        };
        Ok(self.store.consume_code(&code, self.clock.now()).await?)
    }
}
