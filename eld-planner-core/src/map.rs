//! Map lifecycle: exactly one live widget per displayed trip view.
//!
//! [`MapController`] owns the widget handle. Every creation gets a fresh
//! [`Epoch`]; the ready notification and overlay writes must carry the
//! epoch of the widget they target, so anything addressed to a replaced
//! widget is ignored. Dropping the controller disposes the widget.

use crate::bridge::TripView;
use crate::config::MapConfig;
use crate::geo::BoundingBox;
use crate::location::Waypoints;
use crate::overlay::{DataLayer, OverlayPlan};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("map widget could not be created: {0}")]
    Create(String),
    #[error("map widget was already disposed")]
    AlreadyDisposed,
    #[error("map widget disposal failed: {0}")]
    Dispose(String),
}

/// Generation counter distinguishing successive widgets of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Epoch(u64);

impl Epoch {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Initial camera of a new widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Camera {
    /// Fit the bounding region with padding in pixels.
    Fit { bounds: BoundingBox, padding: u32 },
    /// `[lon, lat]` centre and zoom level.
    Center { position: [f64; 2], zoom: f64 },
}

impl Camera {
    #[must_use]
    pub fn for_waypoints(waypoints: Option<&Waypoints>, config: &MapConfig) -> Self {
        let bounds = waypoints.and_then(|wp| BoundingBox::enclosing(wp.in_order().iter()));
        match bounds {
            Some(bounds) => Self::Fit {
                bounds,
                padding: config.padding,
            },
            None => {
                let [lat, lon] = config.default_center;
                Self::Center {
                    position: [lon, lat],
                    zoom: config.default_zoom,
                }
            }
        }
    }
}

/// Everything a surface needs to construct a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub camera: Camera,
    pub language: String,
    pub subscription_key: String,
}

/// A live map widget with one writable data layer.
pub trait MapWidget {
    type Layer: DataLayer;

    fn data_layer(&mut self) -> &mut Self::Layer;

    /// Release the widget's resources.
    ///
    /// # Errors
    ///
    /// [`WidgetError::AlreadyDisposed`] or a platform failure; the controller
    /// logs and ignores both.
    fn dispose(&mut self) -> Result<(), WidgetError>;
}

/// Where widgets come from: the browser SDK, or a fake in tests.
pub trait MapSurface {
    type Widget: MapWidget;

    /// Construct a widget. It must report readiness later by having the
    /// caller invoke [`MapController::on_ready`] with `epoch`.
    ///
    /// # Errors
    ///
    /// [`WidgetError::Create`] when the platform refuses.
    fn create(&mut self, options: &MapOptions, epoch: Epoch) -> Result<Self::Widget, WidgetError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapPhase {
    #[default]
    Absent,
    Creating(Epoch),
    Ready(Epoch),
}

/// Disposes the wrapped widget when dropped.
struct LiveWidget<W: MapWidget> {
    widget: W,
    epoch: Epoch,
}

impl<W: MapWidget> Drop for LiveWidget<W> {
    fn drop(&mut self) {
        match self.widget.dispose() {
            Ok(()) => log::debug!("disposed map widget {}", self.epoch),
            Err(err) => log::debug!("ignoring map widget {} disposal error: {err}", self.epoch),
        }
    }
}

/// Identity of the view a widget was created for.
#[derive(Debug, Clone, PartialEq)]
struct ViewKey {
    trip_id: String,
    waypoints: Option<Waypoints>,
}

impl ViewKey {
    fn of(view: &TripView) -> Self {
        Self {
            trip_id: view.result.trip_id.clone(),
            waypoints: view.waypoints(),
        }
    }
}

pub struct MapController<S: MapSurface> {
    surface: S,
    config: MapConfig,
    subscription_key: String,
    epoch: Epoch,
    phase: MapPhase,
    widget: Option<LiveWidget<S::Widget>>,
    view: Option<ViewKey>,
}

impl<S: MapSurface> MapController<S> {
    pub fn new(surface: S, config: MapConfig, subscription_key: impl Into<String>) -> Self {
        Self {
            surface,
            config,
            subscription_key: subscription_key.into(),
            epoch: Epoch::default(),
            phase: MapPhase::Absent,
            widget: None,
            view: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> MapPhase {
        self.phase
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Bring the widget in line with the displayed view.
    ///
    /// `None` disposes. A view equal to the current one is a no-op. Anything
    /// else disposes the previous widget first and starts a new creation,
    /// whose epoch is returned.
    ///
    /// # Errors
    ///
    /// Propagates [`WidgetError::Create`]; the controller is then `Absent`.
    pub fn sync(&mut self, view: Option<&TripView>) -> Result<Option<Epoch>, WidgetError> {
        let Some(view) = view else {
            self.dispose();
            return Ok(None);
        };
        let key = ViewKey::of(view);
        if self.widget.is_some() && self.view.as_ref() == Some(&key) {
            return Ok(None);
        }

        self.dispose();
        let epoch = self.epoch.next();
        self.epoch = epoch;
        let options = MapOptions {
            camera: Camera::for_waypoints(key.waypoints.as_ref(), &self.config),
            language: self.config.language.clone(),
            subscription_key: self.subscription_key.clone(),
        };
        let widget = self.surface.create(&options, epoch)?;
        log::debug!("creating map widget {epoch} for trip {}", key.trip_id);
        self.widget = Some(LiveWidget { widget, epoch });
        self.view = Some(key);
        self.phase = MapPhase::Creating(epoch);
        Ok(Some(epoch))
    }

    /// Readiness report from a widget. Returns `true` if it moved the
    /// controller to `Ready`.
    pub fn on_ready(&mut self, epoch: Epoch) -> bool {
        if self.phase == MapPhase::Creating(epoch) {
            self.phase = MapPhase::Ready(epoch);
            true
        } else {
            log::debug!("ignoring ready event from map widget {epoch}");
            false
        }
    }

    /// Paint an overlay onto the widget created at `epoch`, if it is the
    /// current widget and ready. Returns whether anything was written.
    pub fn paint(&mut self, epoch: Epoch, plan: &OverlayPlan) -> bool {
        if self.phase != MapPhase::Ready(epoch) {
            log::debug!("skipping overlay for map widget {epoch} in phase {:?}", self.phase);
            return false;
        }
        match self.widget.as_mut() {
            Some(live) => {
                plan.paint(live.widget.data_layer());
                true
            }
            None => false,
        }
    }

    /// Release the widget, if any. Safe to call any number of times.
    pub fn dispose(&mut self) {
        self.widget = None;
        self.view = None;
        self.phase = MapPhase::Absent;
    }
}

impl<S: MapSurface> Drop for MapController<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    #[test]
    fn camera_fits_waypoints_or_falls_back_to_default_center() {
        let config = MapConfig::default();
        let wp = Waypoints {
            current: Coordinate::new(40.0, -75.0).unwrap(),
            pickup: Coordinate::new(41.0, -74.0).unwrap(),
            dropoff: Coordinate::new(42.0, -71.0).unwrap(),
        };
        match Camera::for_waypoints(Some(&wp), &config) {
            Camera::Fit { bounds, padding } => {
                assert_eq!(padding, 80);
                assert_eq!(bounds.to_array(), [-75.0, 40.0, -71.0, 42.0]);
            }
            other => panic!("expected fit, got {other:?}"),
        }
        assert_eq!(
            Camera::for_waypoints(None, &config),
            Camera::Center {
                position: [-98.5795, 39.8283],
                zoom: 4.0
            }
        );
    }

    #[test]
    fn epochs_increase() {
        let first = Epoch::default().next();
        assert!(first.next() > first);
        assert_eq!(first.to_string(), "#1");
    }
}
