//! Authentication test helpers
//!
//! Tokens signed with a fixed test secret, and a configuration that
//! accepts them.

use std::time::Duration;
use task_social::backend::auth::{create_token, Credential};
use task_social::shared::AppConfig;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Configuration verifying tokens against [`TEST_SECRET`]
pub fn test_config() -> AppConfig {
    AppConfig::builder()
        .jwt_secret(TEST_SECRET)
        .write_timeout(Duration::from_millis(500))
        .outbound_buffer(16)
        .build()
        .expect("test config is valid")
}

/// Generate a test JWT token valid for an hour
pub fn generate_test_token(user_id: &str) -> String {
    create_token(TEST_SECRET, user_id, Duration::from_secs(3600)).expect("Failed to generate test token")
}

/// Credential expiring `ttl` from now
pub fn credential_for(user_id: &str, ttl: chrono::TimeDelta) -> Credential {
    Credential::expiring_at(user_id, chrono::Utc::now() + ttl)
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
