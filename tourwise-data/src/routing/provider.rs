//! HTTP-based [`DistanceService`] for OSRM and Google-style endpoints.
//!
//! [`HttpDistanceService`] issues one GET per call: a single origin plus a
//! batch of destinations. Which wire schema it speaks is chosen by
//! [`DistanceApi`].
//!
//! # Example
//!
//! ```no_run
//! use geo::Coord;
//! use tourwise_data::routing::{DistanceService, HttpDistanceService};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = HttpDistanceService::new("http://localhost:5000")?;
//! let legs = service
//!     .fetch_distances(Coord { x: -0.1, y: 51.5 }, &[Coord { x: -0.2, y: 51.6 }])
//!     .await?;
//! # let _ = legs;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::google::DistanceMatrixResponse;
use super::osrm::TableResponse;
use super::service::{DistanceService, DistanceServiceError, LegDistance};

/// Error type for [`HttpDistanceService`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The base URL could not be parsed.
    #[error("invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        /// URL as supplied.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("base URL {url} cannot have a path")]
    OpaqueBaseUrl {
        /// URL as supplied.
        url: String,
    },
}

/// Default user agent for distance requests.
pub const DEFAULT_USER_AGENT: &str = "tourwise-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default OSRM routing profile.
const DEFAULT_PROFILE: &str = "driving";

/// Wire schema spoken by the remote service.
#[derive(Clone, PartialEq, Eq)]
pub enum DistanceApi {
    /// OSRM Table API: `/table/v1/{profile}/{coordinates}`.
    Osrm {
        /// Routing profile, e.g. `"driving"`, `"walking"`.
        profile: String,
    },
    /// Google-style Distance Matrix API: `/maps/api/distancematrix/json`.
    GoogleDistanceMatrix {
        /// API key appended as the `key` query parameter.
        api_key: String,
    },
}

impl Default for DistanceApi {
    fn default() -> Self {
        Self::Osrm {
            profile: DEFAULT_PROFILE.to_owned(),
        }
    }
}

impl fmt::Debug for DistanceApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Osrm { profile } => f.debug_struct("Osrm").field("profile", profile).finish(),
            Self::GoogleDistanceMatrix { .. } => f
                .debug_struct("GoogleDistanceMatrix")
                .field("api_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Configuration for [`HttpDistanceService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpDistanceServiceConfig {
    /// Base URL for the service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Wire schema.
    pub api: DistanceApi,
}

impl Default for HttpDistanceServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            api: DistanceApi::default(),
        }
    }
}

impl HttpDistanceServiceConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Select the wire schema.
    #[must_use]
    pub fn with_api(mut self, api: DistanceApi) -> Self {
        self.api = api;
        self
    }
}

/// HTTP-based distance service.
///
/// Each [`DistanceService::fetch_distances`] call maps to exactly one GET
/// request. The service does not retry; a failed request surfaces as a
/// [`DistanceServiceError`] and the caller decides what to do with it.
#[derive(Debug, Clone)]
pub struct HttpDistanceService {
    client: Client,
    base_url: Url,
    config: HttpDistanceServiceConfig,
}

impl HttpDistanceService {
    /// Create a new OSRM-backed service with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails to
    /// build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpDistanceServiceConfig::new(base_url))
    }

    /// Create a new service with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails to
    /// build.
    pub fn with_config(config: HttpDistanceServiceConfig) -> Result<Self, ProviderBuildError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|source| ProviderBuildError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderBuildError::OpaqueBaseUrl {
                url: config.base_url,
            });
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &HttpDistanceServiceConfig {
        &self.config
    }

    /// Append path segments to the base URL, dropping any trailing slash.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build the OSRM Table API URL.
    ///
    /// Coordinates are `lon,lat` pairs separated by semicolons, origin first.
    /// `sources=0` restricts the table to a single row.
    fn build_table_url(
        &self,
        profile: &str,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Url {
        let coords = std::iter::once(origin)
            .chain(destinations.iter().copied())
            .map(|coord| format!("{},{}", coord.x, coord.y))
            .collect::<Vec<_>>()
            .join(";");
        let targets = (1..=destinations.len())
            .map(|index| index.to_string())
            .collect::<Vec<_>>()
            .join(";");

        let mut url = self.endpoint(["table", "v1", profile, coords.as_str()]);
        url.set_query(Some(&format!(
            "sources=0&destinations={targets}&annotations=distance"
        )));
        url
    }

    /// Build the Google-style Distance Matrix URL.
    ///
    /// Coordinates are `lat,lng` pairs; destinations are separated by `|`.
    fn build_matrix_url(
        &self,
        api_key: &str,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Url {
        let targets = destinations
            .iter()
            .map(|coord| format!("{},{}", coord.y, coord.x))
            .collect::<Vec<_>>()
            .join("|");

        let mut url = self.endpoint(["maps", "api", "distancematrix", "json"]);
        url.query_pairs_mut()
            .append_pair("origins", &format!("{},{}", origin.y, origin.x))
            .append_pair("destinations", &targets)
            .append_pair("units", "metric")
            .append_pair("key", api_key);
        url
    }

    fn build_url(&self, origin: Coord<f64>, destinations: &[Coord<f64>]) -> Url {
        match &self.config.api {
            DistanceApi::Osrm { profile } => self.build_table_url(profile, origin, destinations),
            DistanceApi::GoogleDistanceMatrix { api_key } => {
                self.build_matrix_url(api_key, origin, destinations)
            }
        }
    }

    /// Fetch and decode one response.
    async fn fetch_legs(
        &self,
        url: Url,
        expected: usize,
    ) -> Result<Vec<LegDistance>, DistanceServiceError> {
        let shown = redact(&url);
        log::debug!("requesting {expected} distances from {shown}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &shown))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, &shown))?;

        match self.config.api {
            DistanceApi::Osrm { .. } => response
                .json::<TableResponse>()
                .await
                .map_err(parse_error)?
                .into_legs(expected),
            DistanceApi::GoogleDistanceMatrix { .. } => response
                .json::<DistanceMatrixResponse>()
                .await
                .map_err(parse_error)?
                .into_legs(expected),
        }
    }

    /// Convert a reqwest error to a `DistanceServiceError`.
    ///
    /// Messages are rendered without the URL so query parameters stay private.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> DistanceServiceError {
        if error.is_timeout() {
            return DistanceServiceError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return DistanceServiceError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.without_url().to_string(),
            };
        }

        DistanceServiceError::NetworkError {
            url: url.to_owned(),
            message: error.without_url().to_string(),
        }
    }
}

fn parse_error(error: reqwest::Error) -> DistanceServiceError {
    DistanceServiceError::ParseError {
        message: error.without_url().to_string(),
    }
}

/// Render a URL without its query string so API keys stay out of logs.
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

#[async_trait]
impl DistanceService for HttpDistanceService {
    async fn fetch_distances(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<Vec<LegDistance>, DistanceServiceError> {
        if destinations.is_empty() {
            return Err(DistanceServiceError::EmptyInput);
        }
        let url = self.build_url(origin, destinations);
        self.fetch_legs(url, destinations.len()).await
    }
}
