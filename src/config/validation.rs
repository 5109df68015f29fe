use std::net::SocketAddr;

use super::schema::Config;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(e) = config.server.bind.parse::<SocketAddr>() {
        errors.push(format!(
            "server.bind: invalid address '{}' - {}",
            config.server.bind, e
        ));
    }

    if config.server.anonymous_nickname.trim().is_empty() {
        errors.push("server.anonymous_nickname: must not be empty".to_string());
    }

    if config.storage.retry_attempts == 0 {
        errors.push("storage.retry_attempts: must be at least 1".to_string());
    }

    if let Err(e) = humantime::parse_duration(config.storage.retry_delay.trim()) {
        errors.push(format!(
            "storage.retry_delay: invalid duration '{}' - {}",
            config.storage.retry_delay, e
        ));
    }

    let leaderboard = &config.leaderboard;
    if leaderboard.default_limit == 0 {
        errors.push("leaderboard.default_limit: must be at least 1".to_string());
    }
    if leaderboard.max_limit < leaderboard.default_limit {
        errors.push(format!(
            "leaderboard.max_limit: {} is below default_limit {}",
            leaderboard.max_limit, leaderboard.default_limit
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
