//! PostgreSQL settings.

use serde::{Deserialize, Serialize};

/// Connection pool and schema management.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` URL. Required; there is no sensible default.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connections kept open while idle. Zero keeps the pool lazy.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a free connection before failing the query.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Apply pending migrations when the server starts.
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_auto_migrate() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_url_is_required() {
        let config: DatabaseConfig =
            serde_json::from_str(r#"{"url":"postgres://localhost/ecodeli"}"#).unwrap();
        assert_eq!(config.max_connections, 20);
        assert!(config.auto_migrate);
        assert!(serde_json::from_str::<DatabaseConfig>("{}").is_err());
    }
}
