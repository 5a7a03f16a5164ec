use serde::Deserialize;
use thiserror::Error;

const GEOIP_API_URL: &str = "http://ip-api.com/json";

#[derive(Error, Debug)]
pub enum GeoIpError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, GeoIpError>;

/// Client for looking up the caller's country by IP
pub struct GeoIpClient {
    client: reqwest::Client,
    url: String,
}

impl GeoIpClient {
    pub fn new() -> Self {
        Self::with_url(GEOIP_API_URL.to_string())
    }

    pub fn with_url(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub async fn lookup(&self) -> Result<IpLookup> {
        tracing::debug!("Looking up caller country via {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeoIpError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let lookup: IpLookup = response.json().await?;
        Ok(lookup)
    }
}

impl Default for GeoIpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpLookup {
    pub country: String,
    #[serde(default)]
    pub query: String,
}
