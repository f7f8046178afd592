//! Route and marker overlay for the results map.
//!
//! The renderer resolves a route (driving directions, or a straight line when
//! the routing service fails) into an [`OverlayPlan`]. Painting a plan always
//! clears the data layer first and rebuilds it completely.

use crate::bridge::TripView;
use crate::geo::Coordinate;
use crate::location::{LocationField, Waypoints};
use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("routing service unreachable: {0}")]
    Transport(String),
    #[error("routing service answered HTTP {0}")]
    Status(u16),
    #[error("routing payload malformed: {0}")]
    Malformed(String),
    #[error("routing service returned no route")]
    NoRoute,
}

#[async_trait(?Send)]
pub trait DirectionsProvider {
    /// Driving path through the waypoints in order.
    ///
    /// # Errors
    ///
    /// Any [`RouteError`]; the renderer falls back to a straight line.
    async fn directions(&self, waypoints: &Waypoints) -> Result<Vec<Coordinate>, RouteError>;
}

#[async_trait(?Send)]
impl<T: DirectionsProvider + ?Sized> DirectionsProvider for std::rc::Rc<T> {
    async fn directions(&self, waypoints: &Waypoints) -> Result<Vec<Coordinate>, RouteError> {
        (**self).directions(waypoints).await
    }
}

/// What a marker stands for; drives its title and icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerRole {
    Waypoint(LocationField),
    Stop,
}

impl MarkerRole {
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Waypoint(LocationField::Current) => "marker-blue",
            Self::Waypoint(LocationField::Pickup) => "marker-yellow",
            Self::Waypoint(LocationField::Dropoff) => "marker-red",
            Self::Stop => "pin-round-blue",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Waypoint(field) => field.key(),
            Self::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    Directions,
    StraightLine,
}

/// Line styling for the route layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStyle {
    /// Colour stops along line progress; a single entry means a solid line.
    pub gradient: Vec<(f64, &'static str)>,
    pub width: f64,
}

impl RouteSource {
    #[must_use]
    pub fn style(self) -> RouteStyle {
        match self {
            Self::Directions => RouteStyle {
                gradient: vec![(0.0, "#121b45"), (0.5, "#1a2859"), (1.0, "#2563eb")],
                width: 6.0,
            },
            Self::StraightLine => RouteStyle {
                gradient: vec![(0.0, "#121b45")],
                width: 5.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    pub points: Vec<Coordinate>,
    pub source: RouteSource,
}

impl RoutePath {
    /// Current → pickup → dropoff. Needs nothing from the network.
    #[must_use]
    pub fn straight_line(waypoints: &Waypoints) -> Self {
        Self {
            points: waypoints.in_order().to_vec(),
            source: RouteSource::StraightLine,
        }
    }
}

/// A single entry in the map's data layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MapFeature {
    Route(RoutePath),
    Marker {
        position: Coordinate,
        role: MarkerRole,
        title: String,
    },
}

impl MapFeature {
    /// GeoJSON `Feature` carrying the same title/icon properties the widget uses.
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        match self {
            Self::Route(path) => {
                let coordinates: Vec<[f64; 2]> =
                    path.points.iter().map(Coordinate::position).collect();
                let source = match path.source {
                    RouteSource::Directions => "directions",
                    RouteSource::StraightLine => "straight_line",
                };
                json!({
                    "type": "Feature",
                    "geometry": {"type": "LineString", "coordinates": coordinates},
                    "properties": {"kind": "route", "source": source},
                })
            }
            Self::Marker {
                position,
                role,
                title,
            } => json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": position.position()},
                "properties": {"kind": role.label(), "title": title, "icon": role.icon()},
            }),
        }
    }
}

/// The map's single writable data layer.
pub trait DataLayer {
    fn clear(&mut self);
    fn add(&mut self, feature: &MapFeature);
}

/// In-memory data layer; the native driver exports it as GeoJSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    features: Vec<MapFeature>,
}

impl FeatureCollection {
    #[must_use]
    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    #[must_use]
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self.features.iter().map(MapFeature::to_geojson).collect();
        json!({"type": "FeatureCollection", "features": features})
    }
}

impl DataLayer for FeatureCollection {
    fn clear(&mut self) {
        self.features.clear();
    }

    fn add(&mut self, feature: &MapFeature) {
        self.features.push(feature.clone());
    }
}

/// Everything to draw for one trip view, in draw order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayPlan {
    features: Vec<MapFeature>,
}

impl OverlayPlan {
    /// Assemble route, waypoint markers and stop markers for a view.
    ///
    /// Without waypoints only the schedule's stop markers are produced.
    #[must_use]
    pub fn build(view: &TripView, route: Option<RoutePath>) -> Self {
        let mut features = Vec::new();
        if let Some(path) = route {
            features.push(MapFeature::Route(path));
        }
        if let Some(waypoints) = view.waypoints() {
            features.extend(LocationField::ALL.iter().map(|&field| MapFeature::Marker {
                position: waypoints.get(field),
                role: MarkerRole::Waypoint(field),
                title: field.title().to_string(),
            }));
        }
        features.extend(view.result.overlay_stops().filter_map(|stop| {
            stop.location.map(|position| MapFeature::Marker {
                position,
                role: MarkerRole::Stop,
                title: stop.activity.clone(),
            })
        }));
        Self { features }
    }

    #[must_use]
    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    #[must_use]
    pub fn route(&self) -> Option<&RoutePath> {
        self.features.iter().find_map(|f| match f {
            MapFeature::Route(path) => Some(path),
            MapFeature::Marker { .. } => None,
        })
    }

    pub fn markers(&self, wanted: MarkerRole) -> impl Iterator<Item = &MapFeature> {
        self.features
            .iter()
            .filter(move |f| matches!(f, MapFeature::Marker { role, .. } if *role == wanted))
    }

    /// Tear the layer down and rebuild it from this plan.
    pub fn paint(&self, layer: &mut dyn DataLayer) {
        layer.clear();
        for feature in &self.features {
            layer.add(feature);
        }
    }
}

/// Resolves routes and assembles overlay plans. Never touches widget lifecycle.
pub struct RouteRenderer<D> {
    directions: D,
}

impl<D: DirectionsProvider> RouteRenderer<D> {
    pub const fn new(directions: D) -> Self {
        Self { directions }
    }

    /// Driving directions when available, otherwise the straight-line fallback.
    pub async fn resolve_route(&self, waypoints: &Waypoints) -> RoutePath {
        match self.directions.directions(waypoints).await {
            Ok(points) if points.len() >= 2 => RoutePath {
                points,
                source: RouteSource::Directions,
            },
            Ok(_) => {
                log::warn!("routing service returned an empty path; drawing straight line");
                RoutePath::straight_line(waypoints)
            }
            Err(err) => {
                log::warn!("route lookup failed, drawing straight line: {err}");
                RoutePath::straight_line(waypoints)
            }
        }
    }

    pub async fn plan(&self, view: &TripView) -> OverlayPlan {
        let route = match view.waypoints() {
            Some(waypoints) => Some(self.resolve_route(&waypoints).await),
            None => None,
        };
        OverlayPlan::build(view, route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waypoints() -> Waypoints {
        Waypoints {
            current: Coordinate::new(40.0, -75.0).unwrap(),
            pickup: Coordinate::new(40.5, -74.5).unwrap(),
            dropoff: Coordinate::new(42.0, -71.0).unwrap(),
        }
    }

    #[test]
    fn straight_line_follows_travel_order() {
        let wp = waypoints();
        let path = RoutePath::straight_line(&wp);
        assert_eq!(path.points, vec![wp.current, wp.pickup, wp.dropoff]);
        assert_eq!(path.source, RouteSource::StraightLine);
        assert_eq!(path.source.style().width, 5.0);
        assert_eq!(RouteSource::Directions.style().gradient.len(), 3);
    }

    #[test]
    fn marker_roles_select_icons() {
        assert_eq!(
            MarkerRole::Waypoint(LocationField::Current).icon(),
            "marker-blue"
        );
        assert_eq!(
            MarkerRole::Waypoint(LocationField::Pickup).icon(),
            "marker-yellow"
        );
        assert_eq!(
            MarkerRole::Waypoint(LocationField::Dropoff).icon(),
            "marker-red"
        );
        assert_eq!(MarkerRole::Stop.icon(), "pin-round-blue");
    }

    #[test]
    fn painting_replaces_previous_layer_contents() {
        let mut layer = FeatureCollection::default();
        let stale = MapFeature::Marker {
            position: Coordinate::new(0.0, 0.0).unwrap(),
            role: MarkerRole::Stop,
            title: "old".into(),
        };
        layer.add(&stale);

        let plan = OverlayPlan {
            features: vec![MapFeature::Route(RoutePath::straight_line(&waypoints()))],
        };
        plan.paint(&mut layer);
        assert_eq!(layer.features().len(), 1);
        assert!(!layer.features().contains(&stale));
    }

    #[test]
    fn geojson_uses_lon_lat_order() {
        let marker = MapFeature::Marker {
            position: Coordinate::new(41.0, -74.0).unwrap(),
            role: MarkerRole::Stop,
            title: "Fueling Stop".into(),
        };
        let value = marker.to_geojson();
        assert_eq!(value["geometry"]["coordinates"], json!([-74.0, 41.0]));
        assert_eq!(value["properties"]["icon"], "pin-round-blue");
    }
}
