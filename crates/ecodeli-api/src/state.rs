//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use ecodeli_auth::{JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator};
use ecodeli_channel::ChannelRegistry;
use ecodeli_core::config::AppConfig;
use ecodeli_core::error::AppError;
use ecodeli_database::repositories::{
    AnnouncementRepository, AuditLogRepository, BidRepository, BookingRepository,
    DeliveryRepository, InboxRepository, PaymentRepository, PreferenceRepository, StatsRepository,
    UserRepository,
};
use ecodeli_database::{PgScheduledNotificationStore, ScheduledNotificationStore};
use ecodeli_service::notification::PgRecipientDirectory;
use ecodeli_service::{
    AccountService, AdminAccountService, AnnouncementService, BookingService, DeliveryService,
    NotificationRunner, NotificationService, PaymentService, PricingService, ReminderWriter,
    StatsService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db_pool: PgPool,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Notifications ────────────────────────────────────────
    /// Reminder writer shared by every service that schedules reminders
    pub reminders: Arc<ReminderWriter>,
    /// Due-notification runner; each caller forks its own identity from it
    pub notification_runner: Arc<NotificationRunner>,

    // ── Services ─────────────────────────────────────────────
    pub account_service: Arc<AccountService>,
    pub admin_account_service: Arc<AdminAccountService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub delivery_service: Arc<DeliveryService>,
    pub booking_service: Arc<BookingService>,
    pub payment_service: Arc<PaymentService>,
    pub pricing_service: Arc<PricingService>,
    pub notification_service: Arc<NotificationService>,
    pub stats_service: Arc<StatsService>,
}

impl AppState {
    /// Wires repositories, channel adapters and services over one pool.
    pub fn new(config: Arc<AppConfig>, db_pool: PgPool) -> Result<Self, AppError> {
        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let announcement_repo = Arc::new(AnnouncementRepository::new(db_pool.clone()));
        let bid_repo = Arc::new(BidRepository::new(db_pool.clone()));
        let delivery_repo = Arc::new(DeliveryRepository::new(db_pool.clone()));
        let booking_repo = Arc::new(BookingRepository::new(db_pool.clone()));
        let payment_repo = Arc::new(PaymentRepository::new(db_pool.clone()));
        let inbox_repo = Arc::new(InboxRepository::new(db_pool.clone()));
        let preference_repo = Arc::new(PreferenceRepository::new(db_pool.clone()));
        let stats_repo = Arc::new(StatsRepository::new(db_pool.clone()));
        let audit_repo = Arc::new(AuditLogRepository::new(db_pool.clone()));

        let store: Arc<dyn ScheduledNotificationStore> =
            Arc::new(PgScheduledNotificationStore::new(db_pool.clone()));

        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let password_hasher = Arc::new(PasswordHasher::new());
        let password_validator = Arc::new(PasswordValidator::new(&config.auth));

        let channels = ChannelRegistry::from_config(&config.channels)?;
        let reminders = Arc::new(ReminderWriter::new(
            Arc::clone(&store),
            config.notifications.clone(),
        ));
        let directory = Arc::new(PgRecipientDirectory::new(
            Arc::clone(&user_repo),
            Arc::clone(&preference_repo),
        ));
        let notification_runner = Arc::new(NotificationRunner::new(
            Arc::clone(&store),
            directory,
            inbox_repo.clone(),
            channels,
            &config.notifications,
            &config.worker,
        ));

        let account_service = Arc::new(AccountService::new(
            Arc::clone(&user_repo),
            password_hasher,
            password_validator,
            jwt_encoder,
        ));
        let admin_account_service = Arc::new(AdminAccountService::new(
            Arc::clone(&user_repo),
            Arc::clone(&reminders),
        ));
        let announcement_service = Arc::new(AnnouncementService::new(
            announcement_repo,
            bid_repo,
            Arc::clone(&delivery_repo),
            Arc::clone(&user_repo),
            Arc::clone(&reminders),
            config.marketplace.clone(),
        ));
        let delivery_service = Arc::new(DeliveryService::new(delivery_repo));
        let booking_service = Arc::new(BookingService::new(
            booking_repo,
            Arc::clone(&user_repo),
            Arc::clone(&reminders),
        ));
        let payment_service = Arc::new(PaymentService::new(payment_repo, Arc::clone(&reminders)));
        let pricing_service = Arc::new(PricingService::new(user_repo));
        let notification_service = Arc::new(NotificationService::new(
            Arc::clone(&store),
            inbox_repo,
            preference_repo,
            Arc::clone(&reminders),
            Arc::new(notification_runner.fork("api")),
        ));
        let stats_service = Arc::new(StatsService::new(stats_repo, audit_repo, store));

        Ok(Self {
            config,
            db_pool,
            jwt_decoder,
            reminders,
            notification_runner,
            account_service,
            admin_account_service,
            announcement_service,
            delivery_service,
            booking_service,
            payment_service,
            pricing_service,
            notification_service,
            stats_service,
        })
    }
}
