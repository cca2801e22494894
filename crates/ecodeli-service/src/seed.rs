//! Demo data for local environments.
//!
//! Seeding is skipped when the database already holds users unless a
//! reseed is forced, in which case every marketplace table is truncated
//! first.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use ecodeli_auth::PasswordHasher;
use ecodeli_core::config::SeedConfig;
use ecodeli_core::result::AppResult;
use ecodeli_database::migration::{has_users, truncate_all};
use ecodeli_database::repositories::{
    AnnouncementRepository, PreferenceRepository, UserRepository,
};
use ecodeli_entity::announcement::{AnnouncementKind, CreateAnnouncement};
use ecodeli_entity::notification::NotificationPreference;
use ecodeli_entity::user::{CreateUser, User, UserRole, ValidationStatus};

/// Accounts created by a seed run: email, name, role, validation.
const DEMO_USERS: &[(&str, &str, UserRole, ValidationStatus)] = &[
    ("admin@ecodeli.test", "Alice Admin", UserRole::Admin, ValidationStatus::Approved),
    ("client@ecodeli.test", "Claire Client", UserRole::Client, ValidationStatus::Approved),
    ("merchant@ecodeli.test", "Marc Merchant", UserRole::Merchant, ValidationStatus::Approved),
    ("deliverer@ecodeli.test", "Dora Deliverer", UserRole::Deliverer, ValidationStatus::Approved),
    ("newcomer@ecodeli.test", "Noah Newcomer", UserRole::Deliverer, ValidationStatus::Pending),
    ("provider@ecodeli.test", "Paul Provider", UserRole::Provider, ValidationStatus::Approved),
];

/// What a seed run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    /// Whether the run was skipped because data already existed.
    pub skipped: bool,
    /// Whether tables were truncated first.
    pub truncated: bool,
    pub users: usize,
    pub announcements: usize,
}

/// Creates demo accounts and announcements.
#[derive(Debug, Clone)]
pub struct DemoSeeder {
    pool: PgPool,
    user_repo: Arc<UserRepository>,
    announcement_repo: Arc<AnnouncementRepository>,
    preference_repo: Arc<PreferenceRepository>,
    hasher: Arc<PasswordHasher>,
    config: SeedConfig,
}

impl DemoSeeder {
    /// Builds a seeder over one pool.
    pub fn new(pool: PgPool, config: SeedConfig) -> Self {
        Self {
            user_repo: Arc::new(UserRepository::new(pool.clone())),
            announcement_repo: Arc::new(AnnouncementRepository::new(pool.clone())),
            preference_repo: Arc::new(PreferenceRepository::new(pool.clone())),
            hasher: Arc::new(PasswordHasher::new()),
            pool,
            config,
        }
    }

    /// Seeds unless users exist. `force` (or `force_reseed` in config)
    /// truncates and reseeds regardless.
    pub async fn run(&self, force: bool) -> AppResult<SeedReport> {
        let force = force || self.config.force_reseed;
        let mut report = SeedReport::default();

        if has_users(&self.pool).await? {
            if !force {
                info!("Database already holds users, skipping seed");
                report.skipped = true;
                return Ok(report);
            }
            truncate_all(&self.pool).await?;
            report.truncated = true;
        }

        let password_hash = self.hasher.hash_password(&self.config.password)?;
        let mut users = Vec::with_capacity(DEMO_USERS.len());
        for (email, name, role, validation) in DEMO_USERS {
            let user = self
                .user_repo
                .create(&CreateUser {
                    email: (*email).to_string(),
                    password_hash: password_hash.clone(),
                    name: (*name).to_string(),
                    role: *role,
                    validation_status: *validation,
                })
                .await?;
            users.push(user);
        }
        report.users = users.len();

        if let Some(deliverer) = find_role(&users, UserRole::Deliverer) {
            let mut pref = NotificationPreference::default_for_user(deliverer.id);
            pref.sms_enabled = true;
            pref.phone = Some("+33600000000".to_string());
            self.preference_repo.upsert(&pref).await?;
        }

        for author in [UserRole::Client, UserRole::Merchant]
            .into_iter()
            .filter_map(|role| find_role(&users, role))
        {
            self.announcement_repo
                .create(&demo_announcement(author))
                .await?;
            report.announcements += 1;
        }

        info!(
            users = report.users,
            announcements = report.announcements,
            truncated = report.truncated,
            "Demo data seeded"
        );
        Ok(report)
    }
}

fn find_role(users: &[User], role: UserRole) -> Option<&User> {
    users.iter().find(|u| u.role == role)
}

fn demo_announcement(author: &User) -> CreateAnnouncement {
    let now = Utc::now();
    CreateAnnouncement {
        author_id: author.id,
        title: format!("Parcel from {}", author.name),
        description: "Small box, fits in a backpack.".to_string(),
        kind: AnnouncementKind::PackageDelivery,
        pickup_address: "110 rue de Flandre, 75019 Paris".to_string(),
        delivery_address: "21 rue Erard, 75012 Paris".to_string(),
        pickup_at: now + Duration::days(2),
        deadline: now + Duration::days(3),
        price_cents: 1500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_is_seeded() {
        for role in UserRole::ALL {
            assert!(
                DEMO_USERS.iter().any(|(_, _, r, _)| *r == role),
                "no demo account for {role}"
            );
        }
    }

    #[test]
    fn demo_emails_are_unique() {
        let mut emails: Vec<_> = DEMO_USERS.iter().map(|(e, ..)| *e).collect();
        emails.sort_unstable();
        emails.dedup();
        assert_eq!(emails.len(), DEMO_USERS.len());
    }

    #[test]
    fn demo_announcement_deadline_follows_pickup() {
        let now = Utc::now();
        let author = User {
            id: uuid::Uuid::new_v4(),
            email: "client@ecodeli.test".into(),
            password_hash: String::new(),
            name: "Claire".into(),
            role: UserRole::Client,
            validation_status: ValidationStatus::Approved,
            rejection_reason: None,
            subscription_plan: ecodeli_entity::payment::SubscriptionPlan::Free,
            created_at: now,
            updated_at: now,
        };
        let a = demo_announcement(&author);
        assert!(a.deadline > a.pickup_at);
        assert!(a.pickup_at > now);
        assert_eq!(a.author_id, author.id);
    }
}
