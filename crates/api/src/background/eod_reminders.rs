//! Hourly end-of-day report reminders.
//!
//! Every active link is checked against its user's local clock. When the
//! local hour equals the configured reminder hour and no report exists for
//! the local date, an `eod_reminder` notification is sent. Each user is
//! reminded at most once per local date for the lifetime of the process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chatlink_bot::{BatchReport, DeliveryOutcome, IdentityLinks, NotificationDispatcher};
use chatlink_core::clock::Clock;
use chatlink_core::identity::IdentityLink;
use chatlink_core::notification::NotificationType;
use chatlink_core::time::{local_date, local_hour, parse_timezone};
use chatlink_core::types::UserId;
use chatlink_db::{Directory, StoreResult};
use chrono::NaiveDate;
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// How often the job wakes up.
const CHECK_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

pub struct EodReminderJob {
    links: Arc<IdentityLinks>,
    directory: Arc<dyn Directory>,
    dispatcher: Arc<NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    reminder_hour: u32,
    /// Last local date each user was reminded for.
    reminded: Mutex<HashMap<UserId, NaiveDate>>,
}

enum Check {
    Due(NaiveDate),
    NotDue,
}

impl EodReminderJob {
    pub fn new(
        links: Arc<IdentityLinks>,
        directory: Arc<dyn Directory>,
        dispatcher: Arc<NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        reminder_hour: u32,
    ) -> Self {
        Self {
            links,
            directory,
            dispatcher,
            clock,
            reminder_hour,
            reminded: Mutex::new(HashMap::new()),
        }
    }

    /// Run the reminder loop until `cancel` is triggered.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            reminder_hour = self.reminder_hour,
            interval_secs = CHECK_INTERVAL.as_secs(),
            "EOD reminder job started"
        );

        let mut interval = tokio::time::interval(CHECK_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("EOD reminder job stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.run_once().await;
                }
            }
        }
    }

    /// One pass over every active link. Individual failures are counted and
    /// never stop the pass.
    pub async fn run_once(&self) -> BatchReport {
        let mut report = BatchReport::default();

        let links = match self.links.list_active().await {
            Ok(links) => links,
            Err(e) => {
                tracing::error!(error = %e, "EOD reminders: could not list links");
                return report;
            }
        };

        for link in links {
            let date = match self.check(&link).await {
                Ok(Check::Due(date)) => date,
                Ok(Check::NotDue) => continue,
                Err(e) => {
                    tracing::warn!(
                        tenant_user_id = %link.tenant_user_id,
                        error = %e,
                        "EOD reminders: check failed"
                    );
                    report.failed += 1;
                    continue;
                }
            };

            let payload = json!({ "date": date.format("%b %-d").to_string() });
            let outcome = self
                .dispatcher
                .send_in_tenant(
                    &link.tenant_id,
                    &link.tenant_user_id,
                    NotificationType::EodReminder,
                    &payload,
                )
                .await;
            match outcome {
                DeliveryOutcome::Sent => {
                    report.sent += 1;
                    self.mark_reminded(&link.tenant_user_id, date);
                }
                DeliveryOutcome::NotLinked => report.skipped += 1,
                DeliveryOutcome::Failed => report.failed += 1,
            }
        }

        if report.sent + report.failed > 0 {
            tracing::info!(
                sent = report.sent,
                skipped = report.skipped,
                failed = report.failed,
                "EOD reminders sent"
            );
        }
        report
    }

    async fn check(&self, link: &IdentityLink) -> StoreResult<Check> {
        let Some(user) = self
            .directory
            .find_user(&link.tenant_id, &link.tenant_user_id)
            .await?
        else {
            return Ok(Check::NotDue);
        };

        let now = self.clock.now();
        let tz = parse_timezone(user.timezone.as_deref());
        if local_hour(now, tz) != self.reminder_hour {
            return Ok(Check::NotDue);
        }

        let today = local_date(now, tz);
        if self.already_reminded(&user.id, today) {
            return Ok(Check::NotDue);
        }

        let submitted = self
            .directory
            .has_eod_report(&link.tenant_id, &user.id, today)
            .await?;
        Ok(if submitted { Check::NotDue } else { Check::Due(today) })
    }

    fn already_reminded(&self, user_id: &str, date: NaiveDate) -> bool {
        self.reminded
            .lock()
            .map(|reminded| reminded.get(user_id) == Some(&date))
            .unwrap_or(false)
    }

    fn mark_reminded(&self, user_id: &str, date: NaiveDate) {
        if let Ok(mut reminded) = self.reminded.lock() {
            reminded.insert(user_id.to_string(), date);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chatlink_bot::{BotConfig, BotServices};
    use chatlink_core::clock::ManualClock;
    use chatlink_core::chat::SenderProfile;
    use chatlink_core::domain::{EodReport, Tenant, TenantUser};
    use chatlink_db::{MemoryStore, Stores};
    use chatlink_telegram::DryRunTransport;
    use chrono::{TimeZone, Utc};

    use super::*;

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        transport: Arc<DryRunTransport>,
        job: EodReminderJob,
    }

    /// Two linked users: u1 in Berlin (UTC+2 in May), u2 in UTC.
    async fn fixture(now: chatlink_core::types::Timestamp) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(now));
        let transport = Arc::new(DryRunTransport::new());
        let stores = Stores::memory(store.clone());
        let services = BotServices::new(
            &stores,
            transport.clone(),
            clock.clone(),
            BotConfig {
                retry_delays: vec![Duration::ZERO; 3],
                ..Default::default()
            },
        );

        store.insert_tenant(Tenant { id: "acme".into(), name: "Acme".into() });
        for (id, tz, external_id) in [("u1", "Europe/Berlin", 101), ("u2", "UTC", 102)] {
            store.insert_user(TenantUser {
                id: id.into(),
                tenant_id: "acme".into(),
                display_name: id.into(),
                timezone: Some(tz.into()),
            });
            services
                .links
                .link(&SenderProfile::new(external_id), id, "acme")
                .await
                .unwrap();
        }

        let job = EodReminderJob::new(
            services.links.clone(),
            stores.directory.clone(),
            services.dispatcher.clone(),
            clock.clone(),
            18,
        );
        Fixture { store, clock, transport, job }
    }

    #[tokio::test]
    async fn reminds_users_whose_local_hour_matches() {
        // 16:30 UTC is 18:30 in Berlin.
        let f = fixture(Utc.with_ymd_and_hms(2024, 5, 1, 16, 30, 0).unwrap()).await;

        let report = f.job.run_once().await;

        assert_eq!(report.sent, 1);
        assert_eq!(f.transport.sent_to(101).len(), 1);
        assert!(f.transport.sent_to(102).is_empty());
        assert!(f.transport.last_text().unwrap().contains("May 1"));
    }

    #[tokio::test]
    async fn reminds_once_per_local_date() {
        let f = fixture(Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).unwrap()).await;

        f.job.run_once().await;
        f.clock.advance(chrono::Duration::minutes(30));
        let second = f.job.run_once().await;

        assert_eq!(second.sent, 0);
        assert_eq!(f.transport.sent_to(101).len(), 1);
    }

    #[tokio::test]
    async fn submitted_report_suppresses_reminder() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).unwrap();
        let f = fixture(now).await;
        f.store.insert_eod_report(EodReport {
            id: "r1".into(),
            tenant_id: "acme".into(),
            user_id: "u1".into(),
            report_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            submitted_at: now,
        });

        let report = f.job.run_once().await;

        assert_eq!(report.sent, 0);
        assert!(f.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn store_outage_sends_nothing() {
        let f = fixture(Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).unwrap()).await;
        f.store.set_unavailable(true);

        let report = f.job.run_once().await;

        assert_eq!(report, BatchReport::default());
        assert!(f.transport.sent().is_empty());
    }
}
