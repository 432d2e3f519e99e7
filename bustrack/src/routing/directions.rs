//! Directions API routing oracle.
//!
//! Asks a Google-style Directions endpoint for the road distance between two
//! points.
//!
//! # Request
//!
//! `{base_url}?origin={lat},{lng}&destination={lat},{lng}&key={API_KEY}`
//!
//! # Response
//!
//! ```text
//! { "status": "OK", "routes": [ { "legs": [ { "distance": { "value": 2450 } } ] } ] }
//! ```
//!
//! Only `status` and `routes[0].legs[0].distance.value` (meters) are read.

use serde::Deserialize;

use super::http::AsyncHttpClient;
use super::types::RoutingError;
use super::RoutingOracle;
use crate::geo::Coordinate;

/// Default Directions API endpoint.
pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Status string for a successful directions response.
const STATUS_OK: &str = "OK";

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: Distance,
}

#[derive(Debug, Deserialize)]
struct Distance {
    value: f64,
}

/// Routing oracle backed by a Directions HTTP API.
///
/// # Example
///
/// ```no_run
/// use bustrack::routing::{DirectionsOracle, ReqwestClient};
///
/// let client = ReqwestClient::new().unwrap();
/// let oracle = DirectionsOracle::new(client, "YOUR_API_KEY");
/// ```
#[derive(Debug)]
pub struct DirectionsOracle<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
    base_url: String,
}

impl<C: AsyncHttpClient> DirectionsOracle<C> {
    /// Creates an oracle against the default Directions endpoint.
    pub fn new(http_client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(http_client, api_key, DEFAULT_DIRECTIONS_URL)
    }

    /// Creates an oracle against a custom endpoint (proxies, test servers).
    pub fn with_base_url(
        http_client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Builds the request URL for the given origin and destination.
    fn build_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        format!(
            "{}?origin={}&destination={}&key={}",
            self.base_url, origin, destination, self.api_key
        )
    }
}

/// Extracts the first leg's distance from a raw response body.
fn parse_road_distance(body: &[u8]) -> Result<f64, RoutingError> {
    let response: DirectionsResponse = serde_json::from_slice(body)
        .map_err(|e| RoutingError::InvalidResponse(e.to_string()))?;

    if response.status != STATUS_OK {
        return Err(RoutingError::Status(response.status));
    }

    response
        .routes
        .first()
        .and_then(|route| route.legs.first())
        .map(|leg| leg.distance.value)
        .ok_or(RoutingError::NoRoute)
}

impl<C: AsyncHttpClient> RoutingOracle for DirectionsOracle<C> {
    async fn road_distance_meters(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<f64, RoutingError> {
        let url = self.build_url(origin, destination);
        let body = self.http_client.get(&url).await?;
        parse_road_distance(&body)
    }
}
