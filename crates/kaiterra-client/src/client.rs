//! Kaiterra API client.
//!
//! Wraps the vendor's batch endpoint: one `POST /v1/batch` carries an
//! embedded `GET` sub-request per device, authorized by the `key` query
//! parameter. Responses come back in sub-request order.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::KaiterraError;
use crate::reading::{self, BatchRequest, BatchResponse, SensorReading};
use crate::sensor::{AqiStandard, SensorId, Units};

/// Default API endpoint. Keys are issued by the Kaiterra dashboard.
pub const DEFAULT_BASE_URL: &str = "https://api.kaiterra.cn";

/// Maximum number of sensor IDs accepted per batch request (vendor limit).
pub const MAX_BATCH_IDS: usize = 100;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KaiterraConfig {
    /// Secret key identifying the client making the request.
    pub api_key: String,
    /// API endpoint; the default is sufficient for most cases.
    pub base_url: String,
    pub timeout_secs: u64,
    /// When set, the API computes an air quality index for reported
    /// pollutants according to this standard.
    #[serde(default)]
    pub aqi_standard: Option<AqiStandard>,
    /// Units preferred by the client. Preferring `F` reports temperature
    /// quantities in degrees Fahrenheit instead of the default Celsius.
    #[serde(default)]
    pub preferred_units: Vec<Units>,
}

impl Default for KaiterraConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            aqi_standard: None,
            preferred_units: Vec::new(),
        }
    }
}

/// Client for the Kaiterra REST API.
///
/// Cloning is cheap; the underlying HTTP client is shared.
#[derive(Debug, Clone)]
pub struct KaiterraClient {
    config: KaiterraConfig,
    http: reqwest::Client,
}

impl KaiterraClient {
    /// Creates a client from a configuration. The API key is required.
    pub fn new(mut config: KaiterraConfig) -> Result<Self, KaiterraError> {
        if config.api_key.is_empty() {
            return Err(KaiterraError::Config("api_key must not be empty".to_string()));
        }

        while config.base_url.ends_with('/') {
            config.base_url.pop();
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("kaiterra-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KaiterraError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    /// Creates a client with the given API key and default configuration.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, KaiterraError> {
        Self::new(KaiterraConfig {
            api_key: api_key.into(),
            ..KaiterraConfig::default()
        })
    }

    pub fn config(&self) -> &KaiterraConfig {
        &self.config
    }

    /// Retrieves the latest readings for the given sensors.
    ///
    /// IDs look like `/lasereggs/00000000-0001-0001-0000-00007e57c0de` for
    /// Laser Eggs or `/sensedges/00000000-0031-0001-0000-00007e57c0de` for
    /// Sensedges; at most 100 per call. The result has one element per
    /// input ID, in input order. Sensors that don't exist or have never
    /// reported any data come back as `None`.
    pub async fn get_latest_sensor_readings<S: AsRef<str>>(
        &self,
        sensor_ids: &[S],
    ) -> Result<Vec<Option<SensorReading>>, KaiterraError> {
        if sensor_ids.len() > MAX_BATCH_IDS {
            return Err(KaiterraError::TooManyIds(sensor_ids.len()));
        }

        let params = self.reading_params();
        let mut batch = Vec::with_capacity(sensor_ids.len());
        for raw in sensor_ids {
            let id = SensorId::parse(raw.as_ref())?;
            batch.push(BatchRequest {
                method: "GET",
                relative_url: format!("{id}?{params}"),
            });
        }

        debug!(count = batch.len(), "requesting latest sensor readings");
        let items: Vec<BatchResponse> = self.post_json("/v1/batch", &batch).await?;

        items.iter().map(reading::parse_batch_item).collect()
    }

    /// Retrieves the latest reading for a single sensor.
    ///
    /// Unlike the batch call, a sensor that doesn't exist or has never
    /// reported any data surfaces as [`KaiterraError::NotFound`].
    pub async fn get_latest_reading(&self, sensor_id: &str) -> Result<SensorReading, KaiterraError> {
        let mut readings = self.get_latest_sensor_readings(&[sensor_id]).await?;
        match readings.pop().flatten() {
            Some(reading) => Ok(reading),
            None => Err(KaiterraError::NotFound(sensor_id.to_string())),
        }
    }

    /// Query string attached to every embedded sub-request.
    fn reading_params(&self) -> String {
        let mut params = vec!["format=series_major".to_string()];
        if let Some(standard) = self.config.aqi_standard {
            params.push(format!("aqi={}", standard.as_str()));
        }
        for units in &self.config.preferred_units {
            params.push(format!("units={}", units.as_str()));
        }
        params.join("&")
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, KaiterraError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, path);
        debug!(%url, "POST");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    KaiterraError::Timeout(self.config.timeout_secs)
                } else {
                    KaiterraError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(KaiterraError::Auth(status.as_u16()));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(KaiterraError::NotFound(url));
        }
        if !status.is_success() {
            return Err(KaiterraError::Http(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| KaiterraError::Parse(format!("bad API response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = KaiterraConfig::default();
        assert!(config.api_key.is_empty());
        assert_eq!(config.base_url, "https://api.kaiterra.cn");
        assert_eq!(config.timeout_secs, 10);
        assert!(config.aqi_standard.is_none());
        assert!(config.preferred_units.is_empty());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let err = KaiterraClient::new(KaiterraConfig::default()).unwrap_err();
        assert!(matches!(err, KaiterraError::Config(_)));
    }

    #[test]
    fn test_base_url_trailing_slashes_trimmed() {
        let client = KaiterraClient::new(KaiterraConfig {
            api_key: "abc123".to_string(),
            base_url: "https://api.kaiterra.cn//".to_string(),
            ..KaiterraConfig::default()
        })
        .unwrap();
        assert_eq!(client.config().base_url, "https://api.kaiterra.cn");
    }

    #[test]
    fn test_reading_params_default() {
        let client = KaiterraClient::with_api_key("abc123").unwrap();
        assert_eq!(client.reading_params(), "format=series_major");
    }

    #[test]
    fn test_reading_params_with_aqi_and_units() {
        let client = KaiterraClient::new(KaiterraConfig {
            api_key: "abc123".to_string(),
            aqi_standard: Some(AqiStandard::Usa),
            preferred_units: vec![Units::DegreesFahrenheit, Units::MicrogramsPerCubicMeter],
            ..KaiterraConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.reading_params(),
            "format=series_major&aqi=us&units=F&units=µg/m³"
        );
    }

    #[tokio::test]
    async fn test_invalid_sensor_id_fails_before_any_request() {
        let client = KaiterraClient::with_api_key("abc123").unwrap();
        let err = client
            .get_latest_sensor_readings(&["/thing/0000000000010001000000007e57c0de"])
            .await
            .unwrap_err();
        assert!(matches!(err, KaiterraError::InvalidSensorId(_)));
    }

    #[tokio::test]
    async fn test_too_many_ids_rejected() {
        let client = KaiterraClient::with_api_key("abc123").unwrap();
        let ids = vec!["/lasereggs/00000000-0001-0001-0000-00007e57c0de"; MAX_BATCH_IDS + 1];
        let err = client.get_latest_sensor_readings(&ids).await.unwrap_err();
        assert!(matches!(err, KaiterraError::TooManyIds(n) if n == MAX_BATCH_IDS + 1));
    }
}
