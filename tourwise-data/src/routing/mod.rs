//! Distance services for routing backends.
//!
//! This module defines the [`DistanceService`] trait, which fetches distances
//! from one origin to a batch of destinations, plus its adapters:
//!
//! - [`HttpDistanceService`] talks to an OSRM Table endpoint or a Google-style
//!   Distance Matrix endpoint.
//! - [`HaversineDistanceService`] estimates great-circle distances offline.
//!
//! # Example
//!
//! ```no_run
//! use tourwise_data::routing::{DistanceApi, HttpDistanceService, HttpDistanceServiceConfig};
//! use std::time::Duration;
//!
//! let config = HttpDistanceServiceConfig::new("http://localhost:5000")
//!     .with_api(DistanceApi::Osrm { profile: "driving".into() })
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("my-app/1.0");
//! let service = HttpDistanceService::with_config(config)?;
//! # Ok::<(), tourwise_data::routing::ProviderBuildError>(())
//! ```

mod google;
mod haversine;
mod osrm;
mod provider;
mod service;

#[doc(hidden)]
pub mod test_support;

pub use haversine::HaversineDistanceService;
pub use provider::{
    DEFAULT_USER_AGENT, DistanceApi, HttpDistanceService, HttpDistanceServiceConfig,
    ProviderBuildError,
};
pub use service::{DistanceService, DistanceServiceError, LegDistance, MAX_MEASURED_METERS};
