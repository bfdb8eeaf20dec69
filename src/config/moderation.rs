use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ModerationConfig {
    pub unstrike_interval: Duration,
}

impl ModerationConfig {
    pub fn from_env() -> Self {
        let secs = env::var("UNSTRIKE_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(3600);

        Self {
            unstrike_interval: Duration::from_secs(secs),
        }
    }
}
