// Sign-up country flow: serve the cache, or fill it from the network
use std::sync::Arc;

use medbook_api::{CountriesClient, Country, GeoIpClient, Region};
use medbook_store::{CountryRow, LocalStore};
use tracing::{debug, info};

use crate::Result;

/// The country picker's working set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySetup {
    /// Reference list, sorted by name
    pub countries: Vec<Country>,
    /// Pre-selected default, detected by IP on first run
    pub selected: String,
}

/// Cache-first country onboarding
///
/// A warm cache answers without any network traffic. A cold cache
/// triggers the country list fetch and then the IP lookup, in sequence,
/// and persists both the list and the detected default.
pub struct CountryOnboarding {
    store: Arc<LocalStore>,
    countries: CountriesClient,
    geoip: GeoIpClient,
}

impl CountryOnboarding {
    pub fn new(store: Arc<LocalStore>, countries: CountriesClient, geoip: GeoIpClient) -> Self {
        Self {
            store,
            countries,
            geoip,
        }
    }

    pub async fn ensure_country_setup(&self) -> Result<CountrySetup> {
        let cached = self.store.load_countries()?;
        if !cached.is_empty() {
            if let Some(selected) = self.store.default_country()? {
                info!("Country cache hit ({} countries)", cached.len());
                return Ok(CountrySetup {
                    countries: cached.into_iter().map(row_to_country).collect(),
                    selected,
                });
            }
        }

        debug!("Country cache cold, fetching");
        let countries = self.countries.fetch_countries().await?;
        let lookup = self.geoip.lookup().await?;

        // Fall back to the first list entry when the detected country
        // is not in the reference list
        let selected = if countries.iter().any(|c| c.country == lookup.country) {
            lookup.country
        } else {
            countries
                .first()
                .map(|c| c.country.clone())
                .unwrap_or(lookup.country)
        };

        let rows: Vec<CountryRow> = countries.iter().map(country_to_row).collect();
        self.store.save_countries(&rows)?;
        self.store.save_default_country(&selected)?;
        info!("Cached {} countries, default '{}'", countries.len(), selected);

        Ok(CountrySetup {
            countries,
            selected,
        })
    }

    /// Persist an explicit picker choice
    pub fn select_country(&self, name: &str) -> Result<()> {
        self.store.save_default_country(name)?;
        Ok(())
    }
}

fn row_to_country(row: CountryRow) -> Country {
    Country {
        country: row.country,
        region: Region::from_label(&row.region),
    }
}

fn country_to_row(country: &Country) -> CountryRow {
    CountryRow {
        country: country.country.clone(),
        region: country.region.label().to_string(),
    }
}
