//! Sync client - best-effort push of offline-collected data
//!
//! Sync is fire-and-forget from the session flow's perspective: a failed
//! push leaves the pending payload queued locally for the next retry (no
//! backoff, no deduplication - a record may be pushed twice after a false
//! failure, which is acceptable here).

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::models::{
    NewExerciseCompletion, NewSessionRecord, SessionRecord, SettingsPatch, SyncPayload,
    TrainingProgram, UserSettings, UserStats,
};
use crate::store::ProgressStore;

/// Result of a pending-queue retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Queue was empty.
    Nothing,
    /// Payload accepted by the server; queue cleared.
    Synced { sessions: usize, completions: usize },
    /// Push failed; payload requeued for later.
    Deferred,
}

/// Thin typed client over the remote CRUD API.
pub struct SyncClient {
    http: reqwest::Client,
    base_url: String,
}

impl SyncClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Push one payload to `/api/sync-workout`.
    pub async fn sync_workout(&self, payload: &SyncPayload) -> Result<()> {
        self.http
            .post(self.endpoint("/api/sync-workout"))
            .json(payload)
            .send()
            .await
            .context("sync request failed")?
            .error_for_status()
            .context("sync rejected by server")?;
        Ok(())
    }

    /// Connectivity-restore hook: drain the local pending queue and push it.
    /// On failure the payload goes straight back into the queue; this never
    /// returns an error for a plain network failure.
    pub async fn retry_pending(&self, store: &ProgressStore) -> Result<SyncOutcome> {
        let Some(payload) = store.take_pending()? else {
            return Ok(SyncOutcome::Nothing);
        };
        let sessions = payload.sessions.len();
        let completions = payload.completions.len();

        match self.sync_workout(&payload).await {
            Ok(()) => {
                info!(sessions, completions, "pending workout data synced");
                Ok(SyncOutcome::Synced {
                    sessions,
                    completions,
                })
            }
            Err(err) => {
                warn!(error = %err, "sync failed, payload requeued");
                store.queue_pending(&payload)?;
                Ok(SyncOutcome::Deferred)
            }
        }
    }

    pub async fn list_programs(&self) -> Result<Vec<TrainingProgram>> {
        Ok(self
            .http
            .get(self.endpoint("/api/programs"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    pub async fn create_session(&self, new: &NewSessionRecord) -> Result<SessionRecord> {
        Ok(self
            .http
            .post(self.endpoint("/api/sessions"))
            .json(new)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    pub async fn complete_exercise(&self, new: &NewExerciseCompletion) -> Result<()> {
        self.http
            .post(self.endpoint("/api/exercises/complete"))
            .json(new)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn fetch_settings(&self, user_id: &str) -> Result<UserSettings> {
        Ok(self
            .http
            .get(self.endpoint(&format!("/api/settings/{user_id}")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    pub async fn push_settings(
        &self,
        user_id: &str,
        patch: &SettingsPatch,
    ) -> Result<UserSettings> {
        Ok(self
            .http
            .patch(self.endpoint(&format!("/api/settings/{user_id}")))
            .json(patch)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    pub async fn get_stats(&self, user_id: &str) -> Result<UserStats> {
        Ok(self
            .http
            .get(self.endpoint(&format!("/api/stats/{user_id}")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DayType;
    use crate::server::{MemStorage, Storage, router};
    use crate::session::WorkoutSummary;
    use chrono::Utc;
    use std::sync::Arc;

    fn summary() -> WorkoutSummary {
        WorkoutSummary {
            duration: 1800,
            exercises_completed: 13,
            total_exercises: 13,
            calories_burned: 240,
            day_type: DayType::A,
            week: 1,
            completed_at: Utc::now(),
        }
    }

    async fn spawn_server() -> (String, Arc<MemStorage>) {
        let storage = MemStorage::shared();
        let app = router(storage.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), storage)
    }

    #[tokio::test]
    async fn test_retry_pending_against_live_server() {
        let (base, storage) = spawn_server().await;
        let store = ProgressStore::open_in_memory("default-user").unwrap();
        store.record_completion(&summary()).unwrap();

        let client = SyncClient::new(&base);
        let outcome = client.retry_pending(&store).await.unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Synced {
                sessions: 1,
                completions: 0
            }
        );
        assert_eq!(store.pending_count().unwrap(), 0);

        let stats = storage.stats("default-user").await.unwrap();
        assert_eq!(stats.total_workouts, 1);
    }

    #[tokio::test]
    async fn test_retry_pending_with_empty_queue() {
        let store = ProgressStore::open_in_memory("default-user").unwrap();
        let client = SyncClient::new("http://127.0.0.1:9");
        assert_eq!(
            client.retry_pending(&store).await.unwrap(),
            SyncOutcome::Nothing
        );
    }

    #[tokio::test]
    async fn test_failed_sync_leaves_queue_intact() {
        let store = ProgressStore::open_in_memory("default-user").unwrap();
        store.record_completion(&summary()).unwrap();

        // nothing listens on this port
        let client = SyncClient::new("http://127.0.0.1:9");
        let outcome = client.retry_pending(&store).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Deferred);
        assert_eq!(store.pending_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_typed_wrappers_round_trip() {
        let (base, _storage) = spawn_server().await;
        let client = SyncClient::new(&base);

        let programs = client.list_programs().await.unwrap();
        assert_eq!(programs[0].id, "default-program");

        let settings = client
            .push_settings(
                "default-user",
                &SettingsPatch {
                    rest_day_alerts: Some(true),
                    ..SettingsPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(settings.rest_day_alerts);
        assert!(client.fetch_settings("default-user").await.unwrap().rest_day_alerts);

        let stats = client.get_stats("default-user").await.unwrap();
        assert_eq!(stats.total_workouts, 0);
    }

    #[test]
    fn test_base_url_normalized() {
        let client = SyncClient::new("http://localhost:5000/");
        assert_eq!(
            client.endpoint("/api/programs"),
            "http://localhost:5000/api/programs"
        );
    }
}
