//! ELD Trip Planner client core
//!
//! Platform-agnostic client logic for the ELD trip planner: address search,
//! map widget lifecycle, route overlays and the trip data bridge between
//! planner responses and stored history. Browser and native front-ends plug
//! in through the [`HttpClient`], [`Timer`] and [`MapSurface`] traits.

pub mod api;
pub mod bridge;
pub mod config;
pub mod form;
pub mod geo;
pub mod history;
pub mod http;
pub mod location;
pub mod map;
pub mod overlay;
pub mod present;
pub mod provider;
pub mod search;
pub mod trip;

// Re-export commonly used types
pub use api::{PlannerClient, PlannerError, PlannerOperation, pdf_file_name};
pub use bridge::{BridgeError, HistoryRecord, TripList, TripLocations, TripView};
pub use config::{ClientConfig, MapConfig, SearchConfig};
pub use form::{DriverInfo, FormError, HosOptions, TripForm, TripPlanRequest, WeeklyMode};
pub use geo::{BoundingBox, Coordinate, CoordinateError};
pub use history::HistoryBook;
pub use http::{HttpClient, HttpRequest, HttpResponse, Method, TransportError};
pub use location::{GeocodeCandidate, LocationField, LocationInput, Waypoints, WireLocation};
pub use map::{Camera, Epoch, MapController, MapOptions, MapPhase, MapSurface, MapWidget, WidgetError};
pub use overlay::{
    DataLayer, DirectionsProvider, FeatureCollection, MapFeature, MarkerRole, OverlayPlan,
    RouteError, RoutePath, RouteRenderer, RouteSource, RouteStyle,
};
pub use provider::AzureMaps;
pub use search::{
    GeocodeError, Geocoder, PendingSearch, SearchController, SearchOutcome, SearchSession, Timer,
};
#[cfg(feature = "tokio")]
pub use search::TokioTimer;
pub use trip::{
    DailyLog, DutyStatus, HosCompliance, ScheduleItem, Timestamp, TripPlanResult, TripShapeError,
};
