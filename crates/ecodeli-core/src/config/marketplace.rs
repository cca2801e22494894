//! Marketplace business rules and seeding switches.

use serde::{Deserialize, Serialize};

/// Marketplace business rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// How long an accepted bid waits for the deliverer's confirmation.
    #[serde(default = "default_match_ttl")]
    pub match_ttl_hours: i64,
    /// Minimum announcement price in cents.
    #[serde(default = "default_min_price")]
    pub min_price_cents: i64,
    /// Most deliverers told about one newly published announcement.
    #[serde(default = "default_announcement_fanout")]
    pub announcement_fanout: i64,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            match_ttl_hours: default_match_ttl(),
            min_price_cents: default_min_price(),
            announcement_fanout: default_announcement_fanout(),
        }
    }
}

/// Demo data seeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Wipe marketplace tables and reseed on startup
    /// (`ECODELI_SEED__FORCE_RESEED=true`).
    #[serde(default)]
    pub force_reseed: bool,
    /// Password assigned to seeded accounts.
    #[serde(default = "default_seed_password")]
    pub password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            force_reseed: false,
            password: default_seed_password(),
        }
    }
}

fn default_match_ttl() -> i64 {
    24
}

fn default_min_price() -> i64 {
    100
}

fn default_announcement_fanout() -> i64 {
    500
}

fn default_seed_password() -> String {
    "ecodeli-demo".to_string()
}
