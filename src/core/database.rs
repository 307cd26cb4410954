use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Pool sizing and timeouts taken from the database section
fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(
        "Connecting to database (max_connections={}, min_connections={})",
        config.max_connections,
        config.min_connections
    );

    pool_options(config).connect(&config.url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min: u32, max: u32) -> DatabaseConfig {
        DatabaseConfig {
            url: "postgres://localhost/safedocs".to_string(),
            max_connections: max,
            min_connections: min,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }

    #[test]
    fn test_pool_options_follow_config() {
        let options = pool_options(&config(2, 8));

        assert_eq!(options.get_max_connections(), 8);
        assert_eq!(options.get_min_connections(), 2);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(5));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(options.get_max_lifetime(), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_min_connections_never_exceed_max() {
        let options = pool_options(&config(20, 4));
        assert_eq!(options.get_min_connections(), 4);
    }
}
