mod common;

use std::collections::BTreeMap;

use chatlink_bot::{messages, BotConfig, UpdateOutcome};
use chatlink_core::chat::Direction;
use chatlink_core::domain::{EodReport, Meeting, StreakSummary, Task};
use chatlink_core::identity::RelinkPolicy;
use chrono::{NaiveDate, TimeZone, Utc};
use common::{callback_update, text_update, Harness, EXTERNAL_ID, TENANT, USER};

fn task(id: &str, tenant: &str, status: Option<&str>, assignee: &str) -> Task {
    Task {
        id: id.into(),
        tenant_id: tenant.into(),
        title: format!("Task {id}"),
        status: status.map(Into::into),
        priority: None,
        due_date: None,
        assignee_ids: vec![assignee.into()],
        member_progress: BTreeMap::new(),
    }
}

// ---------------------------------------------------------------------------
// /start and linking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_without_code_sends_onboarding() {
    let h = Harness::new();

    let outcome = h.say(EXTERNAL_ID, "/start").await;

    assert_eq!(outcome, UpdateOutcome::Handled);
    assert_eq!(h.last_reply(), messages::ONBOARDING);
    assert!(h.bot.links.resolve(EXTERNAL_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn start_with_valid_code_links_and_marks_chat() {
    let h = Harness::new();
    let issued = h.bot.authority.generate_code(USER, TENANT).await.unwrap();

    let outcome = h.say(EXTERNAL_ID, &format!("/start {}", issued.code)).await;

    assert_eq!(outcome, UpdateOutcome::Handled);
    assert!(h.last_reply().contains("You're all set"));
    let link = h.bot.links.resolve(EXTERNAL_ID).await.unwrap().unwrap();
    assert_eq!(link.tenant_user_id, USER);
    assert_eq!(link.tenant_id, TENANT);

    let chat = h.bot.ledger.find(EXTERNAL_ID).await.unwrap().unwrap();
    assert!(chat.is_linked);
    assert_eq!(chat.tenant_id.as_deref(), Some(TENANT));
    assert_eq!(chat.tenant_user_id.as_deref(), Some(USER));
}

#[tokio::test]
async fn code_is_single_use() {
    let h = Harness::new();
    let issued = h.bot.authority.generate_code(USER, TENANT).await.unwrap();

    h.say(EXTERNAL_ID, &format!("/start {}", issued.code)).await;
    let outcome = h.say(9001, &format!("/start {}", issued.code)).await;

    assert_eq!(outcome, UpdateOutcome::Handled);
    assert_eq!(h.last_reply(), messages::INVALID_CODE);
    assert!(h.bot.links.resolve(9001).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let h = Harness::new();
    let issued = h.bot.authority.generate_code(USER, TENANT).await.unwrap();
    h.clock.advance(chrono::Duration::seconds(301));

    h.say(EXTERNAL_ID, &format!("/start {}", issued.code)).await;

    assert_eq!(h.last_reply(), messages::INVALID_CODE);
    assert!(h.bot.links.resolve(EXTERNAL_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn lowercase_code_is_accepted() {
    let h = Harness::new();
    let issued = h.bot.authority.generate_code(USER, TENANT).await.unwrap();

    h.say(EXTERNAL_ID, &format!("/start {}", issued.code.to_lowercase()))
        .await;

    assert!(h.bot.links.resolve(EXTERNAL_ID).await.unwrap().is_some());
}

#[tokio::test]
async fn start_when_linked_welcomes_back_without_consuming_code() {
    let h = Harness::new();
    h.link_default_user().await;
    let spare = h.bot.authority.generate_code(USER, TENANT).await.unwrap();

    h.say(EXTERNAL_ID, &format!("/start {}", spare.code)).await;

    assert!(h.last_reply().contains("Welcome back"));
    // The spare code is still redeemable.
    let owner = h
        .bot
        .authority
        .verify_and_consume(&spare.code)
        .await
        .unwrap();
    assert!(owner.is_some());
}

#[tokio::test]
async fn relink_under_overwrite_moves_the_identity() {
    let h = Harness::new();
    h.link_default_user().await;
    h.say(EXTERNAL_ID, "/unlink").await;
    h.press(EXTERNAL_ID, "unlink_confirm").await;
    h.store.insert_user(chatlink_core::domain::TenantUser {
        id: "u2".into(),
        tenant_id: TENANT.into(),
        display_name: "Grace".into(),
        timezone: None,
    });
    let issued = h.bot.authority.generate_code("u2", TENANT).await.unwrap();

    h.say(EXTERNAL_ID, &format!("/start {}", issued.code)).await;

    let link = h.bot.links.resolve(EXTERNAL_ID).await.unwrap().unwrap();
    assert_eq!(link.tenant_user_id, "u2");
}

#[tokio::test]
async fn reject_policy_still_allows_first_link() {
    let h = Harness::with_config(BotConfig {
        relink_policy: RelinkPolicy::Reject,
        ..Default::default()
    });
    h.link_default_user().await;
    assert!(h.bot.links.resolve(EXTERNAL_ID).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Protected commands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn protected_commands_require_a_link() {
    let h = Harness::new();
    h.store.insert_task(task("t1", TENANT, Some("todo"), USER));

    for command in ["/tasks", "/today", "/streak", "/leaderboard", "/unlink", "/help"] {
        h.transport.clear();
        let outcome = h.say(EXTERNAL_ID, command).await;
        assert_eq!(outcome, UpdateOutcome::Handled, "{command}");
        assert_eq!(h.last_reply(), messages::NOT_LINKED, "{command}");
    }
    assert!(h.transport.sent().iter().all(|m| !m.text.contains("Task t1")));
}

#[tokio::test]
async fn tasks_lists_only_the_callers_pending_work() {
    let h = Harness::new();
    h.link_default_user().await;
    h.store.insert_task(task("open", TENANT, Some("in_progress"), USER));
    h.store.insert_task(task("done", TENANT, Some("Completed"), USER));
    h.store.insert_task(task("nostatus", TENANT, None, USER));
    h.store.insert_task(task("other-user", TENANT, Some("todo"), "u2"));
    h.store.insert_task(task("other-tenant", "globex", Some("todo"), USER));
    let mut finished = task("mine-finished", TENANT, Some("todo"), USER);
    finished.member_progress.insert(USER.into(), "done".into());
    h.store.insert_task(finished);

    h.say(EXTERNAL_ID, "/tasks").await;

    let reply = h.last_reply();
    assert!(reply.contains("Your pending tasks (2)"), "{reply}");
    assert!(reply.contains("Task open"));
    assert!(reply.contains("Task nostatus"));
    for hidden in ["Task done", "Task other-user", "Task other-tenant", "Task mine-finished"] {
        assert!(!reply.contains(hidden), "{hidden} leaked: {reply}");
    }
    let sent = h.transport.sent();
    let keyboard = sent.last().unwrap().keyboard.as_ref().unwrap();
    assert_eq!(
        keyboard.inline_keyboard[0][0].url.as_deref(),
        Some("https://app.example.com/tasks")
    );
}

#[tokio::test]
async fn tasks_with_nothing_pending() {
    let h = Harness::new();
    h.link_default_user().await;

    h.say(EXTERNAL_ID, "/tasks").await;

    assert!(h.last_reply().contains("no pending tasks"));
}

#[tokio::test]
async fn today_uses_the_users_local_day() {
    let h = Harness::new();
    h.link_default_user().await;
    // 09:00 UTC is 18:00 in Tokyo on 2024-05-01.
    h.store.insert_meeting(Meeting {
        id: "m1".into(),
        tenant_id: TENANT.into(),
        title: "Standup".into(),
        meeting_date_time: Utc.with_ymd_and_hms(2024, 5, 1, 1, 0, 0).unwrap(),
        attendee_ids: vec![USER.into()],
        meeting_link: None,
    });
    h.store.insert_meeting(Meeting {
        id: "m2".into(),
        tenant_id: TENANT.into(),
        title: "Retro".into(),
        meeting_date_time: Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).unwrap(),
        attendee_ids: vec![USER.into()],
        meeting_link: None,
    });
    h.store.insert_eod_report(EodReport {
        id: "r1".into(),
        tenant_id: TENANT.into(),
        user_id: USER.into(),
        report_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        submitted_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
    });
    h.store.insert_task(task("open", TENANT, Some("todo"), USER));

    h.say(EXTERNAL_ID, "/today").await;

    let reply = h.last_reply();
    assert!(reply.contains("Wednesday, May 1"), "{reply}");
    assert!(reply.contains("10:00 Standup"), "{reply}");
    assert!(!reply.contains("Retro"), "{reply}");
    assert!(reply.contains("Pending tasks: 1"));
    assert!(reply.contains("✅ submitted"));
}

#[tokio::test]
async fn today_offers_eod_link_when_missing() {
    let h = Harness::new();
    h.link_default_user().await;

    h.say(EXTERNAL_ID, "/today").await;

    let reply = h.last_reply();
    assert!(reply.contains("none today"));
    assert!(reply.contains("not submitted yet"));
    let sent = h.transport.sent();
    let urls: Vec<_> = sent.last().unwrap().keyboard.as_ref().unwrap().inline_keyboard
        .iter()
        .flatten()
        .filter_map(|b| b.url.clone())
        .collect();
    assert!(urls.contains(&"https://app.example.com/eod".to_string()));
}

#[tokio::test]
async fn streak_reports_current_and_longest() {
    let h = Harness::new();
    h.link_default_user().await;
    h.store.set_streak(
        TENANT,
        USER,
        StreakSummary {
            current_streak: 4,
            longest_streak: 9,
            last_report_date: NaiveDate::from_ymd_opt(2024, 4, 30),
        },
    );

    h.say(EXTERNAL_ID, "/streak").await;

    let reply = h.last_reply();
    assert!(reply.contains("Current streak: 4 days"));
    assert!(reply.contains("Longest streak: 9 days"));
}

#[tokio::test]
async fn leaderboard_links_into_the_app() {
    let h = Harness::new();
    h.link_default_user().await;

    h.say(EXTERNAL_ID, "/leaderboard@chatlink_bot").await;

    let sent = h.transport.sent();
    let button = &sent.last().unwrap().keyboard.as_ref().unwrap().inline_keyboard[0][0];
    assert_eq!(button.url.as_deref(), Some("https://app.example.com/leaderboard"));
}

#[tokio::test]
async fn missing_tenant_is_reported() {
    let h = Harness::new();
    let issued = h
        .bot
        .authority
        .generate_code("ghost", "vanished")
        .await
        .unwrap();
    h.say(EXTERNAL_ID, &format!("/start {}", issued.code)).await;

    h.say(EXTERNAL_ID, "/tasks").await;

    assert_eq!(h.last_reply(), messages::TENANT_MISSING);
}

#[tokio::test]
async fn unknown_command_and_plain_text_get_a_hint() {
    let h = Harness::new();

    h.say(EXTERNAL_ID, "/dance").await;
    assert_eq!(h.last_reply(), messages::UNKNOWN_COMMAND);

    h.say(EXTERNAL_ID, "hello?").await;
    assert_eq!(h.last_reply(), messages::UNKNOWN_COMMAND);
}

// ---------------------------------------------------------------------------
// /unlink
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unlink_cancel_keeps_the_link() {
    let h = Harness::new();
    h.link_default_user().await;

    h.say(EXTERNAL_ID, "/unlink").await;
    assert_eq!(h.last_reply(), messages::UNLINK_PROMPT);
    assert!(h.bot.links.resolve(EXTERNAL_ID).await.unwrap().is_some());

    let outcome = h.press(EXTERNAL_ID, "unlink_cancel").await;

    assert_eq!(outcome, UpdateOutcome::Handled);
    assert_eq!(h.last_reply(), messages::UNLINK_CANCELLED);
    assert!(h.bot.links.resolve(EXTERNAL_ID).await.unwrap().is_some());
    assert_eq!(h.transport.answered().len(), 1);
}

#[tokio::test]
async fn unlink_confirm_deactivates_and_locks_commands() {
    let h = Harness::new();
    h.link_default_user().await;

    h.say(EXTERNAL_ID, "/unlink").await;
    h.press(EXTERNAL_ID, "unlink_confirm").await;

    assert_eq!(h.last_reply(), messages::UNLINK_DONE);
    assert!(h.bot.links.resolve(EXTERNAL_ID).await.unwrap().is_none());
    let chat = h.bot.ledger.find(EXTERNAL_ID).await.unwrap().unwrap();
    assert!(!chat.is_linked);
    assert!(chat.tenant_id.is_none());

    h.say(EXTERNAL_ID, "/tasks").await;
    assert_eq!(h.last_reply(), messages::NOT_LINKED);
}

#[tokio::test]
async fn unknown_callback_is_ignored_but_answered() {
    let h = Harness::new();

    let outcome = h.press(EXTERNAL_ID, "vote_42").await;

    assert_eq!(outcome, UpdateOutcome::Ignored);
    assert!(h.transport.sent().is_empty());
    assert_eq!(h.transport.answered().len(), 1);
}

// ---------------------------------------------------------------------------
// Delivery semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_update_is_processed_once() {
    let h = Harness::new();
    let update = text_update(77, EXTERNAL_ID, "/start");

    assert_eq!(h.bot.router.handle_update(&update).await, UpdateOutcome::Handled);
    assert_eq!(h.bot.router.handle_update(&update).await, UpdateOutcome::Duplicate);

    assert_eq!(h.transport.sent().len(), 1);
    let chat = h.bot.ledger.find(EXTERNAL_ID).await.unwrap().unwrap();
    assert_eq!(chat.message_count, 1);
}

#[tokio::test]
async fn duplicate_callback_is_processed_once() {
    let h = Harness::new();
    h.link_default_user().await;
    let update = callback_update(500, EXTERNAL_ID, "unlink_cancel");

    h.bot.router.handle_update(&update).await;
    let outcome = h.bot.router.handle_update(&update).await;

    assert_eq!(outcome, UpdateOutcome::Duplicate);
    assert_eq!(h.transport.answered().len(), 1);
}

#[tokio::test]
async fn store_outage_is_absorbed() {
    let h = Harness::new();
    h.store.set_unavailable(true);

    let outcome = h.say(EXTERNAL_ID, "/tasks").await;

    assert_eq!(outcome, UpdateOutcome::Failed);
    assert_eq!(h.last_reply(), messages::TEMPORARY_FAILURE);
}

#[tokio::test]
async fn bot_senders_and_non_text_are_ignored() {
    let h = Harness::new();
    let mut from_bot = text_update(900, EXTERNAL_ID, "/start");
    from_bot.message.as_mut().unwrap().from.as_mut().unwrap().is_bot = true;
    let mut sticker = text_update(901, EXTERNAL_ID, "");
    sticker.message.as_mut().unwrap().text = None;

    assert_eq!(h.bot.router.handle_update(&from_bot).await, UpdateOutcome::Ignored);
    assert_eq!(h.bot.router.handle_update(&sticker).await, UpdateOutcome::Ignored);
    assert!(h.transport.sent().is_empty());
}

#[tokio::test]
async fn conversation_is_logged_both_ways() {
    let h = Harness::new();
    h.link_default_user().await;
    h.clock.advance(chrono::Duration::seconds(1));

    h.say(EXTERNAL_ID, "/help").await;

    let messages = h.bot.ledger.messages(EXTERNAL_ID, 50).await.unwrap();
    // Newest first: help reply, /help, welcome reply, /start <code>.
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].direction, Direction::Outgoing);
    assert!(messages[0].text.ends_with(chatlink_bot::messages::HELP));
    assert_eq!(messages[1].direction, Direction::Incoming);
    assert_eq!(messages[1].text, "/help");

    let chat = h.bot.ledger.find(EXTERNAL_ID).await.unwrap().unwrap();
    assert_eq!(chat.message_count, 2);
    assert_eq!(chat.last_message_text, "/help");
}
