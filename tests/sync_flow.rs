use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;

use mailmind::commands;
use mailmind::models::{DueDate, FetchWindow, Message, MessageRef, Settings};
use mailmind::services::capabilities::{ContentAnalyzer, MessageSource};
use mailmind::services::reconciler::CompletionState;
use mailmind::{AppContext, Error, Result, Store};

#[derive(Default)]
struct FakeMailbox {
    messages: Vec<Message>,
    broken: HashSet<String>,
    offline: bool,
    windows: Mutex<Vec<FetchWindow>>,
}

#[async_trait]
impl MessageSource for FakeMailbox {
    async fn list(&self, window: &FetchWindow) -> Result<Vec<MessageRef>> {
        self.windows.lock().unwrap().push(*window);
        if self.offline {
            return Err(Error::transport("mailbox offline"));
        }
        Ok(self
            .messages
            .iter()
            .filter(|m| window.since.map_or(true, |since| m.source_date > since))
            .take(window.limit)
            .map(|m| MessageRef { id: m.id.clone() })
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Message> {
        if self.broken.contains(id) {
            return Err(Error::transport(format!("cannot fetch {}", id)));
        }
        self.messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| Error::transport(format!("no message {}", id)))
    }
}

/// Answers by subject; subjects it does not know get "No".
#[derive(Default)]
struct FakeAnalyzer {
    answers: Mutex<HashMap<String, String>>,
    failing: HashSet<String>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeAnalyzer {
    fn answer(&self, subject: &str, text: &str) {
        self.answers
            .lock()
            .unwrap()
            .insert(subject.to_string(), text.to_string());
    }
}

#[async_trait]
impl ContentAnalyzer for FakeAnalyzer {
    async fn analyze(&self, subject: &str, _body: &str, _at: DateTime<Utc>) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(subject) {
            return Err(Error::transport("analyzer rejected request"));
        }
        Ok(self
            .answers
            .lock()
            .unwrap()
            .get(subject)
            .cloned()
            .unwrap_or_else(|| "No".to_string()))
    }
}

fn message(id: &str, subject: &str, day: u32) -> Message {
    Message {
        id: id.to_string(),
        subject: subject.to_string(),
        body_snippet: format!("body of {}", subject),
        source_date: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
    }
}

fn settings(initial: usize, incremental: usize, concurrency: usize) -> Settings {
    let mut settings = Settings::default();
    settings.sync.initial_limit = initial;
    settings.sync.incremental_limit = incremental;
    settings.sync.max_concurrency = concurrency;
    settings
}

fn context(mailbox: FakeMailbox, analyzer: Arc<FakeAnalyzer>, settings: Settings) -> (AppContext, Arc<FakeMailbox>) {
    let mailbox = Arc::new(mailbox);
    let store = Arc::new(Store::open_in_memory().unwrap());
    let ctx = AppContext::new(store, mailbox.clone(), analyzer, settings);
    (ctx, mailbox)
}

fn ids<T: AsRef<str>>(items: impl IntoIterator<Item = T>) -> Vec<String> {
    items.into_iter().map(|s| s.as_ref().to_string()).collect()
}

const USER: &str = "student@example.com";

#[tokio::test]
async fn first_sync_previews_and_records_last_sync() {
    let analyzer = Arc::new(FakeAnalyzer::default());
    analyzer.answer("Essay", "2024-03-20 23:59:00 | Submit essay");
    analyzer.answer("Lunch", "Unknown | Pick a lunch place");
    let mailbox = FakeMailbox {
        messages: vec![
            message("m1", "Essay", 1),
            message("m2", "Newsletter", 2),
            message("m3", "Lunch", 3),
            message("m4", "Beyond preview", 4),
        ],
        ..Default::default()
    };
    let (ctx, mailbox) = context(mailbox, analyzer, settings(3, 10, 4));

    let report = commands::sync::sync_user(&ctx, USER).await.unwrap();

    assert_eq!(report.window, FetchWindow { since: None, limit: 3 });
    assert!(report.is_complete());
    assert_eq!(ids(report.stored.iter().map(|t| &t.id)), ids(["m1", "m3"]));

    let tasks = commands::tasks::list_tasks(&ctx.store).unwrap();
    assert_eq!(ids(tasks.iter().map(|t| &t.id)), ids(["m1", "m3"]));
    assert_eq!(tasks[1].due_date, DueDate::Unknown);
    assert_eq!(tasks[1].description, "Pick a lunch place");

    let dashboard = commands::dashboard::build_dashboard(&ctx.store, USER).unwrap();
    assert_eq!(dashboard.last_sync, Some(report.started_at));
    assert_eq!(mailbox.windows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn later_sync_catches_up_from_last_sync() {
    let analyzer = Arc::new(FakeAnalyzer::default());
    let (ctx, mailbox) = context(FakeMailbox::default(), analyzer, settings(3, 10, 4));

    let first = commands::sync::sync_user(&ctx, USER).await.unwrap();
    let second = commands::sync::sync_user(&ctx, USER).await.unwrap();

    assert_eq!(second.window.since, Some(first.started_at));
    assert_eq!(second.window.limit, 10);
    let windows = mailbox.windows.lock().unwrap();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[1].since, Some(first.started_at));
}

#[tokio::test]
async fn failed_message_is_reported_and_others_are_kept() {
    let mut failing = HashSet::new();
    failing.insert("Flaky".to_string());
    let analyzer = Arc::new(FakeAnalyzer {
        failing,
        ..Default::default()
    });
    analyzer.answer("Report", "2024-04-01 12:00:00 | Send report");
    let mut broken = HashSet::new();
    broken.insert("m3".to_string());
    let mailbox = FakeMailbox {
        messages: vec![
            message("m1", "Report", 1),
            message("m2", "Flaky", 2),
            message("m3", "Unfetchable", 3),
        ],
        broken,
        ..Default::default()
    };
    let (ctx, _) = context(mailbox, analyzer, settings(10, 10, 2));

    let report = commands::sync::sync_user(&ctx, USER).await.unwrap();

    assert!(!report.is_complete());
    assert_eq!(
        ids(report.failures.iter().map(|f| &f.message_id)),
        ids(["m2", "m3"])
    );
    assert_eq!(ids(report.stored.iter().map(|t| &t.id)), ids(["m1"]));
    assert_eq!(commands::tasks::list_tasks(&ctx.store).unwrap().len(), 1);

    let dashboard = commands::dashboard::build_dashboard(&ctx.store, USER).unwrap();
    assert_eq!(dashboard.last_sync, None);
}

#[tokio::test]
async fn unreachable_source_aborts_sync() {
    let analyzer = Arc::new(FakeAnalyzer::default());
    let mailbox = FakeMailbox {
        messages: vec![message("m1", "Anything", 1)],
        offline: true,
        ..Default::default()
    };
    let (ctx, _) = context(mailbox, analyzer, settings(3, 10, 4));

    let err = commands::sync::sync_user(&ctx, USER).await.unwrap_err();
    assert!(err.is_transport());
    assert!(commands::tasks::list_tasks(&ctx.store).unwrap().is_empty());
    assert_eq!(
        commands::dashboard::build_dashboard(&ctx.store, USER).unwrap().last_sync,
        None
    );
}

#[tokio::test]
async fn reanalysis_replaces_the_stored_task() {
    let analyzer = Arc::new(FakeAnalyzer::default());
    analyzer.answer("Plans", "Unknown | Decide on plans");
    let mailbox = FakeMailbox {
        messages: vec![message("m1", "Plans", 1)],
        ..Default::default()
    };
    let (ctx, _) = context(mailbox, analyzer.clone(), settings(3, 10, 4));

    commands::sync::sync(&ctx, USER, None).await.unwrap();
    analyzer.answer("Plans", "2024-03-09 17:00:00 | Book tickets");
    let stored = commands::sync::sync(&ctx, USER, None).await.unwrap();

    assert_eq!(stored.len(), 1);
    let tasks = commands::tasks::list_tasks(&ctx.store).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description, "Book tickets");
    assert_eq!(tasks[0].due_date.to_string(), "2024-03-09 17:00:00");

    // explicit-window syncs leave the recorded last sync alone
    assert_eq!(
        commands::dashboard::build_dashboard(&ctx.store, USER).unwrap().last_sync,
        None
    );
}

#[tokio::test]
async fn fan_out_respects_concurrency_limit() {
    let analyzer = Arc::new(FakeAnalyzer::default());
    let messages = (1..=12)
        .map(|i| message(&format!("m{}", i), &format!("Subject {}", i), i))
        .collect();
    let mailbox = FakeMailbox {
        messages,
        ..Default::default()
    };
    let (ctx, _) = context(mailbox, analyzer.clone(), settings(20, 20, 3));

    commands::sync::sync_user(&ctx, USER).await.unwrap();

    let peak = analyzer.peak.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 3, "peak concurrency was {}", peak);
}

#[tokio::test]
async fn completion_flow_over_synced_tasks() {
    let analyzer = Arc::new(FakeAnalyzer::default());
    analyzer.answer("A", "2024-05-01 10:00:00 | Task A");
    analyzer.answer("B", "Unknown | Task B");
    analyzer.answer("C", "2024-04-01 10:00:00 | Task C");
    let mailbox = FakeMailbox {
        messages: vec![message("a", "A", 1), message("b", "B", 2), message("c", "C", 3)],
        ..Default::default()
    };
    let (ctx, _) = context(mailbox, analyzer, settings(10, 10, 4));
    commands::sync::sync_user(&ctx, USER).await.unwrap();

    commands::tasks::set_completion(&ctx.store, USER, "a", true).unwrap();
    assert_eq!(
        commands::tasks::set_completion(&ctx.store, USER, "a", true).unwrap(),
        CompletionState::Completed
    );
    assert_eq!(
        commands::tasks::set_completion(&ctx.store, USER, "b", false).unwrap(),
        CompletionState::Open
    );

    let dashboard = commands::dashboard::build_dashboard(&ctx.store, USER).unwrap();
    assert_eq!(ids(dashboard.current.iter().map(|t| &t.id)), ids(["c", "b"]));
    assert_eq!(ids(dashboard.completed.iter().map(|t| &t.id)), ids(["a"]));

    let remaining = commands::tasks::clear_completed(&ctx.store, USER).unwrap();
    assert_eq!(ids(remaining.iter().map(|t| &t.id)), ids(["c", "b"]));

    let dashboard = commands::dashboard::build_dashboard(&ctx.store, USER).unwrap();
    assert!(dashboard.completed.is_empty());
    assert_eq!(dashboard.current.len(), 2);
}

#[tokio::test]
async fn refresh_dashboard_syncs_then_renders() {
    let analyzer = Arc::new(FakeAnalyzer::default());
    analyzer.answer("Call", "Unknown | Call the bank");
    let mailbox = FakeMailbox {
        messages: vec![message("m1", "Call", 1)],
        ..Default::default()
    };
    let (ctx, _) = context(mailbox, analyzer, settings(3, 10, 4));

    let dashboard = commands::dashboard::refresh_dashboard(&ctx, USER).await.unwrap();
    assert_eq!(ids(dashboard.current.iter().map(|t| &t.id)), ids(["m1"]));
    assert!(dashboard.last_sync.is_some());
}

#[tokio::test]
async fn tasks_persist_in_database_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("mailmind.db");
    let analyzer = Arc::new(FakeAnalyzer::default());
    analyzer.answer("Keep", "Unknown | Keep me");
    let mailbox = Arc::new(FakeMailbox {
        messages: vec![message("m1", "Keep", 1)],
        ..Default::default()
    });

    {
        let store = Arc::new(Store::open(&path).unwrap());
        let ctx = AppContext::new(store, mailbox.clone(), analyzer.clone(), settings(3, 10, 4));
        commands::sync::sync_user(&ctx, USER).await.unwrap();
        commands::tasks::set_completion(&ctx.store, USER, "m1", true).unwrap();
    }

    let store = Arc::new(Store::open(&path).unwrap());
    let dashboard = commands::dashboard::build_dashboard(&store, USER).unwrap();
    assert_eq!(ids(dashboard.completed.iter().map(|t| &t.id)), ids(["m1"]));
    assert!(dashboard.last_sync.is_some());
}
