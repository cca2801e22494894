//! Postgres-backed runner collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use ecodeli_channel::Recipient;
use ecodeli_core::result::AppResult;
use ecodeli_database::repositories::{InboxRepository, PreferenceRepository, UserRepository};
use ecodeli_entity::notification::ScheduledNotification;

use super::runner::{InboxSink, RecipientDirectory, ResolvedRecipient};

/// Resolves recipients from the `users` and `notification_preferences`
/// tables.
#[derive(Debug, Clone)]
pub struct PgRecipientDirectory {
    user_repo: Arc<UserRepository>,
    preference_repo: Arc<PreferenceRepository>,
}

impl PgRecipientDirectory {
    /// Creates a new directory.
    pub fn new(user_repo: Arc<UserRepository>, preference_repo: Arc<PreferenceRepository>) -> Self {
        Self {
            user_repo,
            preference_repo,
        }
    }
}

#[async_trait]
impl RecipientDirectory for PgRecipientDirectory {
    async fn resolve(&self, user_id: Uuid) -> AppResult<Option<ResolvedRecipient>> {
        let Some(user) = self.user_repo.find_by_id(user_id).await? else {
            return Ok(None);
        };
        let preferences = self.preference_repo.find_or_default(user_id).await?;

        Ok(Some(ResolvedRecipient {
            recipient: Recipient {
                user_id,
                name: user.name,
                email: user.email,
                phone: preferences.phone.clone(),
                push_token: preferences.push_token.clone(),
            },
            preferences,
        }))
    }
}

#[async_trait]
impl InboxSink for InboxRepository {
    async fn record(&self, row: &ScheduledNotification) -> AppResult<()> {
        self.create_from_scheduled(row).await
    }
}
