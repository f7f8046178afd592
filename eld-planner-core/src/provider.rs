//! Azure Maps search and route-directions requests over any [`HttpClient`].

use crate::geo::Coordinate;
use crate::http::{HttpClient, HttpRequest, join_url};
use crate::location::{GeocodeCandidate, Waypoints};
use crate::overlay::{DirectionsProvider, RouteError};
use crate::search::{GeocodeError, Geocoder};
use async_trait::async_trait;
use serde::Deserialize;

const API_VERSION: &str = "1.0";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    position: LatLon,
    #[serde(default)]
    address: SearchAddress,
}

#[derive(Debug, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchAddress {
    freeform_address: Option<String>,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
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
    #[serde(default)]
    points: Vec<RoutePoint>,
}

#[derive(Debug, Deserialize)]
struct RoutePoint {
    latitude: f64,
    longitude: f64,
}

/// Decode a Search Address payload into candidates.
///
/// Results with out-of-range positions are dropped; a missing address
/// becomes `"lat, lon"`.
///
/// # Errors
///
/// [`GeocodeError::Malformed`] when the JSON does not have the expected shape.
pub fn parse_search_response(body: &[u8]) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
    let response: SearchResponse =
        serde_json::from_slice(body).map_err(|err| GeocodeError::Malformed(err.to_string()))?;
    Ok(response
        .results
        .into_iter()
        .filter_map(|result| {
            let coordinate = Coordinate::new(result.position.lat, result.position.lon)
                .map_err(|err| log::debug!("dropping geocode result: {err}"))
                .ok()?;
            let freeform_address = result
                .address
                .freeform_address
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| format!("{}, {}", coordinate.lat(), coordinate.lon()));
            Some(GeocodeCandidate {
                coordinate,
                freeform_address,
                country: result.address.country,
            })
        })
        .collect())
}

/// Decode a Route Directions payload into the first route's points, legs
/// concatenated in order.
///
/// # Errors
///
/// [`RouteError::Malformed`] for an unexpected shape or invalid point,
/// [`RouteError::NoRoute`] when no route is present.
pub fn parse_route_response(body: &[u8]) -> Result<Vec<Coordinate>, RouteError> {
    let response: DirectionsResponse =
        serde_json::from_slice(body).map_err(|err| RouteError::Malformed(err.to_string()))?;
    let route = response.routes.into_iter().next().ok_or(RouteError::NoRoute)?;
    route
        .legs
        .into_iter()
        .flat_map(|leg| leg.points)
        .map(|point| {
            Coordinate::new(point.latitude, point.longitude)
                .map_err(|err| RouteError::Malformed(err.to_string()))
        })
        .collect()
}

/// Azure Maps REST client keyed by a subscription key.
pub struct AzureMaps<H> {
    http: H,
    base_url: String,
    subscription_key: String,
}

impl<H: HttpClient> AzureMaps<H> {
    pub fn new(http: H, base_url: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            subscription_key: subscription_key.into(),
        }
    }

    #[must_use]
    pub fn search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}?api-version={API_VERSION}&subscription-key={}&query={}&limit={limit}",
            join_url(&self.base_url, "search/address/json"),
            urlencoding::encode(&self.subscription_key),
            urlencoding::encode(query),
        )
    }

    /// `lat,lon:lat,lon:lat,lon` in travel order.
    #[must_use]
    pub fn directions_url(&self, waypoints: &Waypoints) -> String {
        let query = waypoints
            .in_order()
            .iter()
            .map(|c| format!("{},{}", c.lat(), c.lon()))
            .collect::<Vec<_>>()
            .join(":");
        format!(
            "{}?api-version={API_VERSION}&subscription-key={}&query={query}",
            join_url(&self.base_url, "route/directions/json"),
            urlencoding::encode(&self.subscription_key),
        )
    }
}

#[async_trait(?Send)]
impl<H: HttpClient> Geocoder for AzureMaps<H> {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        let response = self
            .http
            .send(HttpRequest::get(self.search_url(query, limit)))
            .await
            .map_err(|err| GeocodeError::Transport(err.0))?;
        if !response.is_success() {
            return Err(GeocodeError::Status(response.status));
        }
        let mut candidates = parse_search_response(&response.body)?;
        candidates.truncate(limit);
        Ok(candidates)
    }
}

#[async_trait(?Send)]
impl<H: HttpClient> DirectionsProvider for AzureMaps<H> {
    async fn directions(&self, waypoints: &Waypoints) -> Result<Vec<Coordinate>, RouteError> {
        let response = self
            .http
            .send(HttpRequest::get(self.directions_url(waypoints)))
            .await
            .map_err(|err| RouteError::Transport(err.0))?;
        if !response.is_success() {
            return Err(RouteError::Status(response.status));
        }
        parse_route_response(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, TransportError};
    use serde_json::json;

    struct Unused;

    #[async_trait(?Send)]
    impl HttpClient for Unused {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError("offline".into()))
        }
    }

    #[test]
    fn search_results_map_to_candidates() {
        let body = json!({"results": [
            {"position": {"lat": 40.0, "lon": -75.0},
             "address": {"freeformAddress": "123 Main St, Philadelphia, PA", "country": "United States"}},
            {"position": {"lat": 41.5, "lon": -74.25}, "address": {"country": "United States"}},
            {"position": {"lat": 140.0, "lon": -75.0}, "address": {"freeformAddress": "Nowhere"}}
        ]})
        .to_string();
        let candidates = parse_search_response(body.as_bytes()).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].freeform_address, "123 Main St, Philadelphia, PA");
        assert_eq!(candidates[1].freeform_address, "41.5, -74.25");
        assert_eq!(candidates[1].country, "United States");
    }

    #[test]
    fn malformed_search_payload_is_an_error() {
        assert!(matches!(
            parse_search_response(b"<html>"),
            Err(GeocodeError::Malformed(_))
        ));
        assert!(parse_search_response(b"{}").unwrap().is_empty());
    }

    #[test]
    fn route_legs_are_concatenated() {
        let body = json!({"routes": [{"legs": [
            {"points": [{"latitude": 40.0, "longitude": -75.0}, {"latitude": 40.3, "longitude": -74.6}]},
            {"points": [{"latitude": 40.7, "longitude": -74.0}]}
        ]}]})
        .to_string();
        let points = parse_route_response(body.as_bytes()).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2], Coordinate::new(40.7, -74.0).unwrap());
        assert_eq!(
            parse_route_response(br#"{"routes": []}"#),
            Err(RouteError::NoRoute)
        );
    }

    #[test]
    fn request_urls_match_the_rest_api() {
        let maps = AzureMaps::new(Unused, "https://atlas.microsoft.com/", "k3y");
        assert_eq!(
            maps.search_url("123 Main St", 5),
            "https://atlas.microsoft.com/search/address/json?api-version=1.0&subscription-key=k3y&query=123%20Main%20St&limit=5"
        );
        let wp = Waypoints {
            current: Coordinate::new(40.0, -75.0).unwrap(),
            pickup: Coordinate::new(40.7, -74.0).unwrap(),
            dropoff: Coordinate::new(42.36, -71.06).unwrap(),
        };
        assert_eq!(
            maps.directions_url(&wp),
            "https://atlas.microsoft.com/route/directions/json?api-version=1.0&subscription-key=k3y&query=40,-75:40.7,-74:42.36,-71.06"
        );
    }

    #[test]
    fn transport_failure_maps_to_geocode_error() {
        let maps = AzureMaps::new(Unused, "https://atlas.microsoft.com", "k");
        let result = futures::executor::block_on(maps.search("Chicago", 5));
        assert_eq!(result, Err(GeocodeError::Transport("offline".into())));
    }
}
