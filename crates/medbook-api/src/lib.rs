// API client implementations for the remote collaborators
pub mod countries;
pub mod covers;
pub mod geoip;
pub mod openlibrary;

// Re-export common types
pub use countries::{CountriesClient, Country, Region};
pub use covers::{CoverSize, CoversClient};
pub use geoip::{GeoIpClient, IpLookup};
pub use openlibrary::{BookDoc, OpenLibraryClient, PAGE_SIZE};
