mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use futures::StreamExt;
use tokio::time::{timeout, Duration};
use uuid::Uuid;

use common::{arc_repo, session};
use tasks::contract::model::{NewTask, Priority};
use tasks::domain::service::{Service, ServiceConfig};
use tasks::domain::watch::TaskFeed;

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn new_task(title: &str, due: chrono::DateTime<Utc>) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: String::new(),
        due_date: due,
        priority: Priority::Medium,
    }
}

/// Wire a service whose events flow into the feed, exactly as the app does.
fn wired(repo: Arc<common::InMemoryTasksRepository>) -> (Service, Arc<TaskFeed>) {
    let feed = Arc::new(TaskFeed::new(16, repo.clone()));
    let service = Service::new(repo, feed.clone(), ServiceConfig::default());
    (service, feed)
}

#[tokio::test]
async fn subscription_starts_with_the_current_snapshot() {
    let repo = arc_repo(t0());
    let (service, feed) = wired(repo);
    let ctx = session(Uuid::new_v4());

    service
        .create_task(&ctx, new_task("Existing", t0()))
        .await
        .unwrap();

    let mut sub = feed.subscribe(ctx.user_id);
    let snapshot = timeout(Duration::from_millis(200), sub.next())
        .await
        .expect("timeout")
        .expect("snapshot");
    assert_eq!(snapshot.tasks.len(), 1);
    assert_eq!(snapshot.tasks[0].title, "Existing");
}

#[tokio::test]
async fn write_becomes_visible_through_the_next_snapshot() {
    let repo = arc_repo(t0());
    let (service, feed) = wired(repo);
    let ctx = session(Uuid::new_v4());

    let mut sub = feed.subscribe(ctx.user_id);
    let initial = timeout(Duration::from_millis(200), sub.next())
        .await
        .expect("timeout")
        .expect("snapshot");
    assert!(initial.tasks.is_empty());

    let due = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
    let created = service
        .create_task(&ctx, new_task("Pay rent", due))
        .await
        .unwrap();

    let snapshot = timeout(Duration::from_millis(200), sub.next())
        .await
        .expect("timeout")
        .expect("snapshot");
    assert_eq!(snapshot.tasks.len(), 1);
    assert_eq!(snapshot.tasks[0].id, created.id);
    assert_eq!(snapshot.tasks[0].due_date, due);
    assert!(!snapshot.tasks[0].completed);

    // Toggling produces another full snapshot, not a delta.
    service.set_completed(&ctx, created.id, true).await.unwrap();
    let snapshot = timeout(Duration::from_millis(200), sub.next())
        .await
        .expect("timeout")
        .expect("snapshot");
    assert_eq!(snapshot.tasks.len(), 1);
    assert!(snapshot.tasks[0].completed);
    assert!(snapshot.tasks[0].updated_at >= created.updated_at);
}

#[tokio::test]
async fn snapshots_are_ordered_by_due_date() {
    let repo = arc_repo(t0());
    let (service, feed) = wired(repo);
    let ctx = session(Uuid::new_v4());

    let mut sub = feed.subscribe(ctx.user_id);
    let _ = timeout(Duration::from_millis(200), sub.next()).await.unwrap();

    let later = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
    let sooner = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    service
        .create_task(&ctx, new_task("Later", later))
        .await
        .unwrap();
    let _ = timeout(Duration::from_millis(200), sub.next()).await.unwrap();

    service
        .create_task(&ctx, new_task("Sooner", sooner))
        .await
        .unwrap();
    let snapshot = timeout(Duration::from_millis(200), sub.next())
        .await
        .expect("timeout")
        .expect("snapshot");

    let titles: Vec<_> = snapshot.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Sooner", "Later"]);
}

#[tokio::test]
async fn other_users_events_do_not_surface() {
    let repo = arc_repo(t0());
    let (service, feed) = wired(repo);
    let watcher = session(Uuid::new_v4());
    let other = session(Uuid::new_v4());

    let mut sub = feed.subscribe(watcher.user_id);
    let _ = timeout(Duration::from_millis(200), sub.next()).await.unwrap();

    service
        .create_task(&other, new_task("Not yours", t0()))
        .await
        .unwrap();

    // No snapshot should arrive for the watcher.
    let nothing = timeout(Duration::from_millis(150), sub.next()).await;
    assert!(nothing.is_err(), "expected no delivery for foreign events");
}

#[tokio::test]
async fn cancel_is_explicit_and_idempotent() {
    let repo = arc_repo(t0());
    let (_service, feed) = wired(repo);
    let ctx = session(Uuid::new_v4());

    let mut sub = feed.subscribe(ctx.user_id);
    let _ = timeout(Duration::from_millis(200), sub.next()).await.unwrap();

    sub.cancel();
    assert!(sub.is_cancelled());
    sub.cancel(); // second cancel is a no-op
    assert!(sub.is_cancelled());

    assert_eq!(sub.next().await, None);
}

#[tokio::test]
async fn dropping_one_subscription_leaves_others_live() {
    let repo = arc_repo(t0());
    let (service, feed) = wired(repo);
    let ctx = session(Uuid::new_v4());

    let mut kept = feed.subscribe(ctx.user_id);
    {
        let mut dropped = feed.subscribe(ctx.user_id);
        let _ = timeout(Duration::from_millis(200), dropped.next())
            .await
            .unwrap();
    } // released here

    let _ = timeout(Duration::from_millis(200), kept.next()).await.unwrap();

    service
        .create_task(&ctx, new_task("Still flowing", t0()))
        .await
        .unwrap();
    let snapshot = timeout(Duration::from_millis(200), kept.next())
        .await
        .expect("timeout")
        .expect("snapshot");
    assert_eq!(snapshot.tasks.len(), 1);
}
