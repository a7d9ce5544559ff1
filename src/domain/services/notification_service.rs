use std::sync::Arc;
use std::time::Duration;
use crate::domain::{
    models::notification::{Notification, NotificationPayload},
    ports::NotificationRepository,
};
use crate::error::AppError;
use tokio::time::sleep;
use tracing::{error, info, warn};

const RETRY_BACKOFF: Duration = Duration::from_millis(50);

pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
    max_attempts: u32,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>, max_attempts: u32) -> Self {
        Self { repo, max_attempts: max_attempts.max(1) }
    }

    pub async fn emit(&self, user_id: &str, payload: NotificationPayload) -> Result<Notification, AppError> {
        let notification = payload.into_notification(user_id.to_string());
        self.repo.create(&notification).await
    }

    /// Emits outside of any storage transaction. Failures are retried with a
    /// linear backoff and then logged; they never reach the caller.
    pub async fn emit_best_effort(&self, user_id: &str, payload: NotificationPayload) -> Option<Notification> {
        let kind = payload.kind();
        for attempt in 1..=self.max_attempts {
            match self.emit(user_id, payload.clone()).await {
                Ok(notification) => {
                    info!(user_id, kind = kind.as_str(), "notification emitted: {}", notification.id);
                    return Some(notification);
                }
                Err(e) => {
                    warn!(user_id, attempt, "failed to emit {} notification: {}", kind.as_str(), e);
                    if attempt < self.max_attempts {
                        sleep(RETRY_BACKOFF * attempt).await;
                    }
                }
            }
        }
        error!(user_id, "giving up on {} notification after {} attempts", kind.as_str(), self.max_attempts);
        None
    }

    /// SYSTEM notification to each user. Returns how many were stored.
    pub async fn broadcast(&self, user_ids: &[String], title: &str, text: &str) -> usize {
        let mut sent = 0;
        for user_id in user_ids {
            let payload = NotificationPayload::System { title: title.to_string(), text: text.to_string() };
            if self.emit_best_effort(user_id, payload).await.is_some() {
                sent += 1;
            }
        }
        info!(sent, "system notification broadcast");
        sent
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Notification>, AppError> {
        self.repo.list_by_user(user_id).await
    }

    pub async fn mark_read(&self, user_id: &str, id: &str) -> Result<Notification, AppError> {
        self.repo.mark_read(user_id, id).await?
            .ok_or(AppError::NotFound("Notification not found".into()))
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64, AppError> {
        self.repo.mark_all_read(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::notification::NotificationType;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` writes, then stores.
    struct FlakyRepo {
        failures: u32,
        calls: AtomicU32,
        stored: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationRepository for FlakyRepo {
        async fn create(&self, notification: &Notification) -> Result<Notification, AppError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(AppError::InternalWithMsg("store unavailable".into()));
            }
            self.stored.lock().unwrap().push(notification.clone());
            Ok(notification.clone())
        }
        async fn list_by_user(&self, _user_id: &str) -> Result<Vec<Notification>, AppError> {
            Ok(self.stored.lock().unwrap().clone())
        }
        async fn mark_read(&self, _user_id: &str, _id: &str) -> Result<Option<Notification>, AppError> {
            Ok(None)
        }
        async fn mark_all_read(&self, _user_id: &str) -> Result<u64, AppError> {
            Ok(0)
        }
    }

    fn flaky(failures: u32) -> Arc<FlakyRepo> {
        Arc::new(FlakyRepo { failures, calls: AtomicU32::new(0), stored: Mutex::new(vec![]) })
    }

    fn system() -> NotificationPayload {
        NotificationPayload::System { title: "Hello".into(), text: "World".into() }
    }

    #[tokio::test]
    async fn best_effort_retries_until_the_write_lands() {
        let repo = flaky(2);
        let service = NotificationService::new(repo.clone(), 3);

        let emitted = service.emit_best_effort("u1", system()).await;

        assert!(emitted.is_some());
        assert_eq!(repo.calls.load(Ordering::SeqCst), 3);
        assert_eq!(repo.stored.lock().unwrap()[0].notification_type, NotificationType::System);
    }

    #[tokio::test]
    async fn best_effort_swallows_persistent_failures() {
        let repo = flaky(10);
        let service = NotificationService::new(repo.clone(), 2);

        assert!(service.emit_best_effort("u1", system()).await.is_none());
        assert_eq!(repo.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn mark_read_of_unknown_notification_is_not_found() {
        let service = NotificationService::new(flaky(0), 1);
        assert!(matches!(service.mark_read("u1", "nope").await, Err(AppError::NotFound(_))));
    }
}
