//! Repository for the `chats` and `chat_messages` tables.

use chatlink_core::chat::{ChatMessage, InboundMessage, LinkageSnapshot};
use chatlink_core::types::{ChatId, ExternalId, Timestamp};
use sqlx::PgPool;

use crate::models::chat::{ChatMessageRow, ChatRow};

const CHAT_COLUMNS: &str = "chat_id, external_user_id, tenant_user_id, tenant_id, is_linked, \
                            last_message_text, last_message_at, message_count, \
                            sender_username, sender_first_name, sender_last_name, \
                            created_at, updated_at";

const MESSAGE_COLUMNS: &str = "chat_id, message_id, text, from_external_id, direction, sent_at";

pub struct ChatRepo;

impl ChatRepo {
    /// Upsert the chat and append the inbound message in one transaction.
    ///
    /// The increment happens inside the `ON CONFLICT` branch, so concurrent
    /// deliveries to the same chat serialize on the row lock. If the message
    /// id is already logged the transaction is rolled back and the current
    /// row is returned unchanged.
    pub async fn record_inbound(
        pool: &PgPool,
        input: &InboundMessage,
    ) -> Result<ChatRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (tenant_user_id, tenant_id) = match &input.linkage {
            Some(l) => (Some(l.tenant_user_id.as_str()), Some(l.tenant_id.as_str())),
            None => (None, None),
        };

        let upsert = format!(
            "INSERT INTO chats \
                (chat_id, external_user_id, tenant_user_id, tenant_id, is_linked, \
                 last_message_text, last_message_at, message_count, \
                 sender_username, sender_first_name, sender_last_name, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 1, $8, $9, $10, $7, $7) \
             ON CONFLICT (chat_id) DO UPDATE SET \
                 message_count = chats.message_count + 1, \
                 last_message_text = CASE \
                     WHEN EXCLUDED.last_message_at >= chats.last_message_at \
                     THEN EXCLUDED.last_message_text ELSE chats.last_message_text END, \
                 last_message_at = GREATEST(chats.last_message_at, EXCLUDED.last_message_at), \
                 tenant_user_id = EXCLUDED.tenant_user_id, \
                 tenant_id = EXCLUDED.tenant_id, \
                 is_linked = EXCLUDED.is_linked, \
                 sender_username = EXCLUDED.sender_username, \
                 sender_first_name = EXCLUDED.sender_first_name, \
                 sender_last_name = EXCLUDED.sender_last_name, \
                 updated_at = EXCLUDED.updated_at \
             RETURNING {CHAT_COLUMNS}"
        );
        let chat = sqlx::query_as::<_, ChatRow>(&upsert)
            .bind(input.chat_id)
            .bind(input.sender.external_id)
            .bind(tenant_user_id)
            .bind(tenant_id)
            .bind(input.linkage.is_some())
            .bind(&input.text)
            .bind(input.received_at)
            .bind(&input.sender.username)
            .bind(&input.sender.first_name)
            .bind(&input.sender.last_name)
            .fetch_one(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            "INSERT INTO chat_messages \
                (chat_id, message_id, text, from_external_id, direction, sent_at) \
             VALUES ($1, $2, $3, $4, 'incoming', $5) \
             ON CONFLICT (chat_id, message_id) DO NOTHING",
        )
        .bind(input.chat_id)
        .bind(input.message_id)
        .bind(&input.text)
        .bind(input.sender.external_id)
        .bind(input.received_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            tracing::debug!(
                chat_id = input.chat_id,
                message_id = input.message_id,
                "Inbound message already logged"
            );
            return Self::find(pool, input.chat_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound);
        }

        tx.commit().await?;
        Ok(chat)
    }

    /// Append an outgoing message if the chat exists.
    pub async fn record_outbound(pool: &PgPool, message: &ChatMessage) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let touched = sqlx::query("UPDATE chats SET updated_at = $2 WHERE chat_id = $1")
            .bind(message.chat_id)
            .bind(message.timestamp)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if touched == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let inserted = sqlx::query(
            "INSERT INTO chat_messages \
                (chat_id, message_id, text, from_external_id, direction, sent_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (chat_id, message_id) DO NOTHING",
        )
        .bind(message.chat_id)
        .bind(message.message_id)
        .bind(&message.text)
        .bind(message.from_external_id)
        .bind(message.direction.as_str())
        .bind(message.timestamp)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(inserted == 1)
    }

    /// Batch-update the linkage snapshot on every chat of `external_id`.
    pub async fn set_linkage_for_external(
        pool: &PgPool,
        external_id: ExternalId,
        linkage: Option<&LinkageSnapshot>,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE chats SET tenant_user_id = $2, tenant_id = $3, is_linked = $4, updated_at = $5 \
             WHERE external_user_id = $1",
        )
        .bind(external_id)
        .bind(linkage.map(|l| l.tenant_user_id.as_str()))
        .bind(linkage.map(|l| l.tenant_id.as_str()))
        .bind(linkage.is_some())
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_by_tenant(pool: &PgPool, tenant_id: &str) -> Result<Vec<ChatRow>, sqlx::Error> {
        let query = format!(
            "SELECT {CHAT_COLUMNS} FROM chats \
             WHERE tenant_id = $1 \
             ORDER BY last_message_at DESC, chat_id"
        );
        sqlx::query_as::<_, ChatRow>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find(pool: &PgPool, chat_id: ChatId) -> Result<Option<ChatRow>, sqlx::Error> {
        let query = format!("SELECT {CHAT_COLUMNS} FROM chats WHERE chat_id = $1");
        sqlx::query_as::<_, ChatRow>(&query)
            .bind(chat_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_messages(
        pool: &PgPool,
        chat_id: ChatId,
        limit: i64,
    ) -> Result<Vec<ChatMessageRow>, sqlx::Error> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages \
             WHERE chat_id = $1 \
             ORDER BY sent_at DESC, message_id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, ChatMessageRow>(&query)
            .bind(chat_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
