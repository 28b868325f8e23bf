//! Where the fetch effects get their data from.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AppConfig;
use crate::home::Slot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub bio: String,
}

/// Backend the effects talk to. The only I/O seam in the application.
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    async fn fetch_data(&self, slot: Slot) -> Result<String>;

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile>;
}

/// Stand-in backend that answers after a fixed latency.
#[derive(Debug, Clone)]
pub struct SimulatedDataSource {
    fetch1_latency: Duration,
    fetch2_latency: Duration,
    profile_latency: Duration,
}

impl SimulatedDataSource {
    pub fn new(
        fetch1_latency: Duration,
        fetch2_latency: Duration,
        profile_latency: Duration,
    ) -> Self {
        Self {
            fetch1_latency,
            fetch2_latency,
            profile_latency,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Duration::from_millis(config.fetch1_latency_ms),
            Duration::from_millis(config.fetch2_latency_ms),
            Duration::from_millis(config.profile_latency_ms),
        )
    }

    fn latency(&self, slot: Slot) -> Duration {
        match slot {
            Slot::One => self.fetch1_latency,
            Slot::Two => self.fetch2_latency,
        }
    }
}

impl Default for SimulatedDataSource {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[async_trait]
impl DataSource for SimulatedDataSource {
    async fn fetch_data(&self, slot: Slot) -> Result<String> {
        tokio::time::sleep(self.latency(slot)).await;
        Ok(format!("Fetched data {}", slot.number()))
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile> {
        tokio::time::sleep(self.profile_latency).await;
        Ok(Profile {
            username: user_id.to_string(),
            bio: format!("Profile of {user_id}"),
        })
    }
}
