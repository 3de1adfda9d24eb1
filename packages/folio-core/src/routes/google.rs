//! Google Directions API support.

use super::geo::decode_polyline;
use super::{Route, RouteLookup};
use crate::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<ApiRoute>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    #[serde(default)]
    legs: Vec<ApiLeg>,
    overview_polyline: Option<ApiPolyline>,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    duration: ApiText,
    distance: ApiText,
}

#[derive(Debug, Deserialize)]
struct ApiText {
    text: String,
    value: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiPolyline {
    points: String,
}

/// Parse a Directions API JSON body.
///
/// `ZERO_RESULTS` (or `OK` without routes) is a `NoRoute` answer; any other
/// non-`OK` status is a provider error.
pub fn parse_directions_response(body: &str) -> Result<RouteLookup> {
    let response: DirectionsResponse = serde_json::from_str(body)?;

    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Ok(RouteLookup::NoRoute),
        status => {
            let detail = response
                .error_message
                .map(|m| format!("{}: {}", status, m))
                .unwrap_or_else(|| status.to_string());
            return Err(Error::Provider(detail));
        }
    }

    let Some(route) = response.routes.into_iter().next() else {
        return Ok(RouteLookup::NoRoute);
    };
    let leg = route
        .legs
        .into_iter()
        .next()
        .ok_or_else(|| Error::Provider("route has no legs".to_string()))?;

    let path = match route.overview_polyline {
        Some(polyline) => decode_polyline(&polyline.points)?,
        None => Vec::new(),
    };

    Ok(RouteLookup::Found(Route {
        duration_text: leg.duration.text,
        distance_text: leg.distance.text,
        duration_secs: leg.duration.value,
        distance_meters: leg.distance.value,
        path,
    }))
}

#[cfg(feature = "http")]
mod client {
    use super::parse_directions_response;
    use crate::routes::{DirectionsProvider, LatLon, RouteLookup, TravelMode};
    use crate::{Error, Result};
    use reqwest::blocking::Client;
    use std::time::Duration;

    const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

    /// Blocking HTTP client for the Google Directions API.
    #[derive(Debug, Clone)]
    pub struct GoogleDirectionsClient {
        client: Client,
        base_url: String,
        api_key: Option<String>,
        language: String,
    }

    impl GoogleDirectionsClient {
        /// Create a client. Without an API key every lookup reports the
        /// provider as unavailable.
        pub fn new(api_key: Option<String>, language: &str, timeout: Duration) -> Result<Self> {
            let client = Client::builder().timeout(timeout).build()?;
            Ok(Self {
                client,
                base_url: DIRECTIONS_URL.to_string(),
                api_key: api_key.filter(|k| !k.trim().is_empty()),
                language: language.to_string(),
            })
        }

        /// Point the client at a different endpoint.
        pub fn with_base_url(mut self, base_url: &str) -> Self {
            self.base_url = base_url.to_string();
            self
        }
    }

    impl DirectionsProvider for GoogleDirectionsClient {
        fn directions(
            &self,
            origin: LatLon,
            destination: LatLon,
            mode: TravelMode,
        ) -> Result<RouteLookup> {
            let api_key = self.api_key.as_deref().ok_or_else(|| {
                Error::Provider("directions API key is not configured".to_string())
            })?;

            tracing::debug!(mode = %mode, "Requesting directions");

            let body = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("origin", origin.to_query()),
                    ("destination", destination.to_query()),
                    ("mode", mode.as_str().to_string()),
                    ("language", self.language.clone()),
                    ("key", api_key.to_string()),
                ])
                .send()?
                .error_for_status()?
                .text()?;

            parse_directions_response(&body)
        }
    }
}

#[cfg(feature = "http")]
pub use client::GoogleDirectionsClient;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ok_response() {
        let body = r#"{
            "status": "OK",
            "routes": [{
                "legs": [{
                    "duration": { "text": "4 hours 10 mins", "value": 15000 },
                    "distance": { "text": "395 km", "value": 395000 }
                }],
                "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" }
            }]
        }"#;

        let RouteLookup::Found(route) = parse_directions_response(body).unwrap() else {
            panic!("expected a route");
        };

        assert_eq!(route.duration_text, "4 hours 10 mins");
        assert_eq!(route.distance_meters, Some(395000));
        assert_eq!(route.path.len(), 3);
    }

    #[test]
    fn test_parse_zero_results() {
        let body = r#"{ "status": "ZERO_RESULTS", "routes": [] }"#;
        assert_eq!(parse_directions_response(body).unwrap(), RouteLookup::NoRoute);
    }

    #[test]
    fn test_parse_error_status() {
        let body = r#"{ "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid." }"#;

        match parse_directions_response(body) {
            Err(Error::Provider(msg)) => {
                assert!(msg.starts_with("REQUEST_DENIED"));
                assert!(msg.contains("API key"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_directions_response("<html>"),
            Err(Error::Json(_))
        ));
    }
}
