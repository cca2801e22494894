//! Marketplace maintenance: expiry of stale announcements and lapsed
//! matches.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ecodeli_core::result::AppResult;
use ecodeli_service::AnnouncementService;

/// Rows handled per maintenance query.
const BATCH_LIMIT: i64 = 500;

/// Counters of one maintenance pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaintenanceReport {
    /// Active announcements moved to `expired`.
    pub expired: usize,
    /// Matched announcements put back on the market.
    pub released: usize,
}

/// Run every marketplace maintenance task at `now`.
pub async fn run_marketplace_maintenance(
    announcements: &AnnouncementService,
    now: DateTime<Utc>,
) -> AppResult<MaintenanceReport> {
    let expired = announcements.expire_overdue(now, BATCH_LIMIT).await?;
    let released = announcements.release_lapsed_matches(now, BATCH_LIMIT).await?;

    if expired > 0 || released > 0 {
        tracing::info!(expired, released, "Marketplace maintenance completed");
    } else {
        tracing::debug!("Marketplace maintenance found nothing to do");
    }

    Ok(MaintenanceReport { expired, released })
}
