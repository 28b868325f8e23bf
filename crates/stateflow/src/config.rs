//! Store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for a [`Store`](crate::Store).
///
/// Deserializable so that binaries can embed it in their own config files.
/// Missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound for effect registrations that don't carry their own
    /// timeout. `None` lets effects run until they finish or the store
    /// shuts down.
    pub effect_timeout_ms: Option<u64>,
}

impl StoreConfig {
    pub fn effect_timeout(&self) -> Option<Duration> {
        self.effect_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_timeout() {
        assert_eq!(StoreConfig::default().effect_timeout(), None);
    }

    #[test]
    fn timeout_is_read_in_milliseconds() {
        let config = StoreConfig {
            effect_timeout_ms: Some(250),
        };
        assert_eq!(config.effect_timeout(), Some(Duration::from_millis(250)));
    }
}
