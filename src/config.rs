//! Per-connection settings.

/// Default ring buffer size in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Default label attached to log records.
pub const DEFAULT_NAME: &str = "modem";

/// Settings for one modem channel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConnConfig {
    /// Label recorded as the `device` field on every log record.
    pub name: String,
    /// Receive ring buffer size. Must exceed the longest frame the device
    /// can send, multi-line `+CMGR` bodies included.
    pub buffer_capacity: usize,
}

impl ConnConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity;
        self
    }
}

impl Default for ConnConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConnConfig::default();
        assert_eq!(config.name, "modem");
        assert_eq!(config.buffer_capacity, 4096);
    }

    #[test]
    fn builder() {
        let config = ConnConfig::default().with_name("dongle0").with_capacity(256);
        assert_eq!(config, ConnConfig { name: "dongle0".into(), buffer_capacity: 256 });
    }
}
