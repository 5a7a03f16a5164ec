use thiserror::Error;

/// All the ways things can go wrong in MedBook
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Search request failed: {0}")]
    Search(#[from] medbook_api::openlibrary::OpenLibraryError),

    #[error("Country list request failed: {0}")]
    Countries(#[from] medbook_api::countries::CountriesError),

    #[error("Country lookup failed: {0}")]
    GeoIp(#[from] medbook_api::geoip::GeoIpError),

    #[error("Store operation failed: {0}")]
    Store(#[from] medbook_store::StoreError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// True for the benign "no data" search outcome that marks the end
    /// of a result set rather than a real failure
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            Error::Search(medbook_api::openlibrary::OpenLibraryError::NoData)
        )
    }
}
