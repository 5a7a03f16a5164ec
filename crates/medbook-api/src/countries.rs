use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const COUNTRIES_API_URL: &str = "https://api.first.org/data/v1/countries";

#[derive(Error, Debug)]
pub enum CountriesError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CountriesError>;

pub struct CountriesClient {
    client: reqwest::Client,
    url: String,
}

impl CountriesClient {
    pub fn new() -> Self {
        Self::with_url(COUNTRIES_API_URL.to_string())
    }

    pub fn with_url(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Fetch the full country reference list
    ///
    /// The endpoint keys entries by ISO code; callers generally only care
    /// about the name/region pairs, so the map values are what we return.
    pub async fn fetch_countries(&self) -> Result<Vec<Country>> {
        tracing::debug!("Fetching country list from {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CountriesError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let envelope: CountriesResponse = response.json().await?;
        let mut countries: Vec<Country> = envelope.data.into_values().collect();
        countries.sort_by(|a, b| a.country.cmp(&b.country));
        Ok(countries)
    }
}

impl Default for CountriesClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CountriesResponse {
    #[serde(default)]
    data: HashMap<String, Country>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Country {
    pub country: String,
    pub region: Region,
}

/// Geographic region as the countries endpoint reports it
///
/// Unknown region strings fold to Africa, both when decoding the wire
/// response and when reading back stored labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Region {
    Antarctic,
    Asia,
    #[serde(rename = "Central America")]
    CentralAmerica,
    Europe,
    #[serde(rename = "North America")]
    NorthAmerica,
    Oceania,
    #[serde(rename = "South America")]
    SouthAmerica,
    #[serde(other)]
    Africa,
}

impl Region {
    /// Parse a stored region label, defaulting unknowns to Africa
    pub fn from_label(label: &str) -> Self {
        match label {
            "Antarctic" => Region::Antarctic,
            "Asia" => Region::Asia,
            "Central America" => Region::CentralAmerica,
            "Europe" => Region::Europe,
            "North America" => Region::NorthAmerica,
            "Oceania" => Region::Oceania,
            "South America" => Region::SouthAmerica,
            _ => Region::Africa,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::Africa => "Africa",
            Region::Antarctic => "Antarctic",
            Region::Asia => "Asia",
            Region::CentralAmerica => "Central America",
            Region::Europe => "Europe",
            Region::NorthAmerica => "North America",
            Region::Oceania => "Oceania",
            Region::SouthAmerica => "South America",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
