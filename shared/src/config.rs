use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = match option_env!("PREDICT_API_URL") {
    Some(url) => url,
    None => "/api/predict",
};
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
    /// Multipart field carrying the image.
    pub form_field: String,
    pub capture_file_name: String,
    pub capture_mime: String,
    /// Label rendered with the alert style.
    pub flagged_label: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            form_field: "image".to_string(),
            capture_file_name: "captured.jpg".to_string(),
            capture_mime: "image/jpeg".to_string(),
            flagged_label: "Lesion".to_string(),
        }
    }
}

/// Raw values collected by the host, highest priority source first.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub timeout_ms: Option<String>,
}

impl ClientConfig {
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(endpoint) = overrides
            .endpoint
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
        {
            self.endpoint = endpoint;
        }

        if let Some(raw) = overrides.timeout_ms {
            match parse_timeout(&raw) {
                Ok(timeout) => self.timeout = timeout,
                Err(e) => log::warn!("Ignoring timeout override: {}", e),
            }
        }

        self
    }

    /// Browser timers take an `u32` of milliseconds.
    pub fn timeout_millis(&self) -> u32 {
        u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX)
    }
}

pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let millis: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))?;
    if millis == 0 {
        return Err(ConfigError::ZeroTimeout);
    }
    Ok(Duration::from_millis(millis))
}
