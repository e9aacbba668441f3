//! Live per-user task snapshots.
//!
//! `TaskFeed` fans domain events out over a bounded broadcast channel and
//! turns them into full-state snapshot deliveries: every event owned by the
//! subscribed user triggers a fresh repository query, so the store stays the
//! single source of truth and a write's visible effect is defined by snapshot
//! delivery, never by the write call returning. Lagged subscribers simply
//! collapse missed events into the next full snapshot.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;

use crate::contract::model::TaskSnapshot;
use crate::domain::events::TaskDomainEvent;
use crate::domain::ports::EventPublisher;
use crate::domain::repo::TasksRepository;

#[derive(Clone)]
pub struct TaskFeed {
    tx: broadcast::Sender<TaskDomainEvent>,
    repo: Arc<dyn TasksRepository>,
}

impl TaskFeed {
    /// Create a feed with bounded buffer capacity; oldest events are dropped
    /// when subscribers lag.
    pub fn new(capacity: usize, repo: Arc<dyn TasksRepository>) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx, repo }
    }

    /// Establish a standing per-user snapshot subscription.
    ///
    /// The current full snapshot is delivered first, then one fresh snapshot
    /// after every change to that user's tasks. Events for other users never
    /// surface. If the initial query fails the subscription ends immediately
    /// (callers treat that as a read error); a failed re-query inside an
    /// established subscription is logged and skipped.
    pub fn subscribe(&self, user_id: Uuid) -> TaskSubscription {
        let mut rx = self.tx.subscribe();
        let repo = self.repo.clone();

        let stream = async_stream::stream! {
            match repo.list_for_user(user_id).await {
                Ok(tasks) => yield TaskSnapshot { tasks },
                Err(e) => {
                    warn!(error = %e, %user_id, "initial snapshot query failed, ending subscription");
                    return;
                }
            }

            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if event.user_id() != user_id {
                            continue;
                        }
                        match repo.list_for_user(user_id).await {
                            Ok(tasks) => yield TaskSnapshot { tasks },
                            Err(e) => {
                                warn!(error = %e, %user_id, "snapshot refresh failed, keeping last delivered state");
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed events collapse into one fresh snapshot.
                        warn!(skipped, %user_id, "subscriber lagged, emitting catch-up snapshot");
                        match repo.list_for_user(user_id).await {
                            Ok(tasks) => yield TaskSnapshot { tasks },
                            Err(e) => {
                                warn!(error = %e, %user_id, "catch-up snapshot query failed");
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };

        TaskSubscription {
            inner: Some(Box::pin(stream)),
        }
    }
}

impl EventPublisher<TaskDomainEvent> for TaskFeed {
    fn publish(&self, event: &TaskDomainEvent) {
        // Errors are ignored to keep the hot path cheap (no active subscribers).
        let _ = self.tx.send(event.clone());
    }
}

/// Cancellable handle over the snapshot stream. Dropping it releases the
/// underlying broadcast receiver; `cancel` does the same explicitly and is
/// idempotent.
pub struct TaskSubscription {
    inner: Option<Pin<Box<dyn Stream<Item = TaskSnapshot> + Send>>>,
}

impl TaskSubscription {
    pub fn cancel(&mut self) {
        self.inner = None;
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_none()
    }
}

impl Stream for TaskSubscription {
    type Item = TaskSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut() {
            Some(stream) => stream.as_mut().poll_next(cx),
            None => Poll::Ready(None),
        }
    }
}
