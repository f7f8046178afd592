use async_trait::async_trait;
use eld_planner_core::form::DriverInfo;
use eld_planner_core::trip::{LocationInfo, TripSummary};
use eld_planner_core::{
    Camera, Coordinate, DataLayer, DirectionsProvider, DutyStatus, Epoch, HistoryRecord,
    HosCompliance, HosOptions, MapConfig, MapController, MapFeature, MapOptions, MapPhase,
    MapSurface, MapWidget, MarkerRole, RouteError, RouteRenderer, RouteSource, ScheduleItem,
    Timestamp, TripPlanRequest, TripPlanResult, TripView, Waypoints, WidgetError, WireLocation,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct SurfaceLog {
    created: Vec<(Epoch, MapOptions)>,
    disposed: Vec<Epoch>,
    layers: Vec<(Epoch, Rc<RefCell<Vec<MapFeature>>>)>,
}

impl SurfaceLog {
    fn live(&self) -> usize {
        self.created.len() - self.disposed.len()
    }

    fn layer(&self, epoch: Epoch) -> Vec<MapFeature> {
        self.layers
            .iter()
            .find(|(e, _)| *e == epoch)
            .map(|(_, layer)| layer.borrow().clone())
            .unwrap_or_default()
    }
}

struct SharedLayer(Rc<RefCell<Vec<MapFeature>>>);

impl DataLayer for SharedLayer {
    fn clear(&mut self) {
        self.0.borrow_mut().clear();
    }

    fn add(&mut self, feature: &MapFeature) {
        self.0.borrow_mut().push(feature.clone());
    }
}

struct FakeWidget {
    epoch: Epoch,
    layer: SharedLayer,
    disposed: bool,
    log: Rc<RefCell<SurfaceLog>>,
}

impl MapWidget for FakeWidget {
    type Layer = SharedLayer;

    fn data_layer(&mut self) -> &mut SharedLayer {
        &mut self.layer
    }

    fn dispose(&mut self) -> Result<(), WidgetError> {
        if self.disposed {
            return Err(WidgetError::AlreadyDisposed);
        }
        self.disposed = true;
        self.log.borrow_mut().disposed.push(self.epoch);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct FakeSurface {
    log: Rc<RefCell<SurfaceLog>>,
    refuse: bool,
}

impl MapSurface for FakeSurface {
    type Widget = FakeWidget;

    fn create(&mut self, options: &MapOptions, epoch: Epoch) -> Result<FakeWidget, WidgetError> {
        if self.refuse {
            return Err(WidgetError::Create("no container".into()));
        }
        let features = Rc::new(RefCell::new(Vec::new()));
        let mut log = self.log.borrow_mut();
        log.created.push((epoch, options.clone()));
        log.layers.push((epoch, Rc::clone(&features)));
        Ok(FakeWidget {
            epoch,
            layer: SharedLayer(features),
            disposed: false,
            log: Rc::clone(&self.log),
        })
    }
}

struct FixedDirections(Result<Vec<Coordinate>, RouteError>);

#[async_trait(?Send)]
impl DirectionsProvider for FixedDirections {
    async fn directions(&self, _waypoints: &Waypoints) -> Result<Vec<Coordinate>, RouteError> {
        self.0.clone()
    }
}

fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).unwrap()
}

fn wire(lat: f64, lon: f64, address: &str) -> WireLocation {
    WireLocation {
        lat,
        lon,
        address: Some(address.to_string()),
    }
}

fn item(start: &str, status: DutyStatus, activity: &str, at: Option<Coordinate>) -> ScheduleItem {
    ScheduleItem {
        start_time: Timestamp::new(start),
        duty_status: status,
        activity: activity.to_string(),
        description: String::new(),
        duration_hours: 1.0,
        distance_miles: None,
        location: at,
        location_info: at.map(|_| LocationInfo {
            city: Some("Newark".into()),
            state: Some("NJ".into()),
        }),
        split_sleeper_segment: None,
    }
}

fn result(trip_id: &str, schedule: Vec<ScheduleItem>) -> TripPlanResult {
    TripPlanResult {
        trip_id: trip_id.to_string(),
        total_distance_miles: 310.2,
        total_driving_hours: 6.1,
        estimated_total_hours: 18.4,
        hos_compliance: HosCompliance {
            compliant: true,
            violations: vec![],
        },
        schedule,
        daily_logs: vec![],
        summary: TripSummary::default(),
        weekly_hours: None,
        route_data: json!({}),
    }
}

fn request() -> TripPlanRequest {
    TripPlanRequest {
        current_location: wire(40.0, -75.0, "Philadelphia, PA"),
        pickup_location: wire(40.7, -74.0, "New York, NY"),
        dropoff_location: wire(42.36, -71.06, "Boston, MA"),
        current_cycle_used: 12.0,
        driver: DriverInfo {
            driver_name: "John Doe".into(),
            carrier_name: "ABC Logistics".into(),
            main_office: "Philadelphia, PA".into(),
            vehicle_number: "TRK-001".into(),
        },
        hos: HosOptions::default(),
    }
}

fn sleeper_view(trip_id: &str) -> TripView {
    let schedule = vec![
        item("2024-01-05T08:00:00", DutyStatus::OnDuty, "Pre-trip Inspection", None),
        item("2024-01-05T08:30:00", DutyStatus::Driving, "Driving", Some(coord(40.3, -74.6))),
        item("2024-01-05T19:00:00", DutyStatus::SleeperBerth, "10-hour Rest", Some(coord(41.0, -74.0))),
        item("2024-01-06T05:00:00", DutyStatus::OnDuty, "Fueling Stop", None),
    ];
    TripView::from_submission(&request(), result(trip_id, schedule))
}

fn controller(surface: FakeSurface) -> MapController<FakeSurface> {
    MapController::new(surface, MapConfig::default(), "test-key")
}

#[tokio::test]
async fn ready_widget_receives_route_waypoints_and_stops() {
    let surface = FakeSurface::default();
    let mut ctl = controller(surface.clone());
    let view = sleeper_view("trip-1");
    let renderer = RouteRenderer::new(FixedDirections(Ok(vec![
        coord(40.0, -75.0),
        coord(40.4, -74.5),
        coord(40.7, -74.0),
        coord(42.36, -71.06),
    ])));

    let epoch = ctl.sync(Some(&view)).unwrap().unwrap();
    assert_eq!(ctl.phase(), MapPhase::Creating(epoch));

    let plan = renderer.plan(&view).await;
    assert!(!ctl.paint(epoch, &plan), "creating widget must not be painted");
    assert!(surface.log.borrow().layer(epoch).is_empty());

    assert!(ctl.on_ready(epoch));
    assert_eq!(ctl.phase(), MapPhase::Ready(epoch));
    assert!(ctl.paint(epoch, &plan));

    let features = surface.log.borrow().layer(epoch);
    assert_eq!(features.len(), 5);
    let routes: Vec<_> = features
        .iter()
        .filter(|f| matches!(f, MapFeature::Route(_)))
        .collect();
    assert_eq!(routes.len(), 1);
    assert_eq!(plan.route().unwrap().source, RouteSource::Directions);

    let stops: Vec<_> = features
        .iter()
        .filter_map(|f| match f {
            MapFeature::Marker {
                position,
                role: MarkerRole::Stop,
                title,
            } => Some((*position, title.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(stops, vec![(coord(41.0, -74.0), "10-hour Rest".to_string())]);

    let waypoint_titles: Vec<_> = features
        .iter()
        .filter_map(|f| match f {
            MapFeature::Marker {
                role: MarkerRole::Waypoint(_),
                title,
                ..
            } => Some(title.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        waypoint_titles,
        ["Current Location", "Pickup Location", "Dropoff Location"]
    );

    let log = surface.log.borrow();
    assert_eq!(log.live(), 1);
    let (_, options) = &log.created[0];
    assert_eq!(options.language, "en-US");
    assert_eq!(options.subscription_key, "test-key");
    assert!(matches!(options.camera, Camera::Fit { padding: 80, .. }));
}

#[tokio::test]
async fn routing_failure_draws_straight_line() {
    let view = sleeper_view("trip-1");
    let renderer = RouteRenderer::new(FixedDirections(Err(RouteError::Status(500))));
    let plan = renderer.plan(&view).await;
    let route = plan.route().unwrap();
    assert_eq!(route.source, RouteSource::StraightLine);
    assert_eq!(
        route.points,
        vec![coord(40.0, -75.0), coord(40.7, -74.0), coord(42.36, -71.06)]
    );

    let empty = RouteRenderer::new(FixedDirections(Ok(vec![])));
    assert_eq!(
        empty.plan(&view).await.route().unwrap().source,
        RouteSource::StraightLine
    );
}

#[test]
fn same_view_keeps_widget_and_new_view_replaces_it() {
    let surface = FakeSurface::default();
    let mut ctl = controller(surface.clone());
    let first = sleeper_view("trip-1");

    let epoch1 = ctl.sync(Some(&first)).unwrap().unwrap();
    assert!(ctl.on_ready(epoch1));
    assert_eq!(ctl.sync(Some(&first.clone())).unwrap(), None);
    assert_eq!(surface.log.borrow().created.len(), 1);

    let second = sleeper_view("trip-2");
    let epoch2 = ctl.sync(Some(&second)).unwrap().unwrap();
    assert_ne!(epoch1, epoch2);
    {
        let log = surface.log.borrow();
        assert_eq!(log.disposed, vec![epoch1]);
        assert_eq!(log.live(), 1);
    }

    // Late events for the replaced widget are ignored.
    assert!(!ctl.on_ready(epoch1));
    assert_eq!(ctl.phase(), MapPhase::Creating(epoch2));
    assert!(ctl.on_ready(epoch2));
    assert!(!ctl.paint(epoch1, &Default::default()));
    assert!(!ctl.on_ready(epoch2), "ready is reported once");
}

#[test]
fn disposing_twice_is_harmless_and_leaves_absent() {
    let surface = FakeSurface::default();
    let mut ctl = controller(surface.clone());
    let epoch = ctl.sync(Some(&sleeper_view("trip-1"))).unwrap().unwrap();
    assert!(ctl.on_ready(epoch));

    ctl.dispose();
    ctl.dispose();
    assert_eq!(ctl.phase(), MapPhase::Absent);
    assert_eq!(surface.log.borrow().disposed, vec![epoch]);
    assert!(!ctl.paint(epoch, &Default::default()));

    assert_eq!(ctl.sync(None).unwrap(), None);
    assert_eq!(ctl.phase(), MapPhase::Absent);
}

#[test]
fn dropping_the_controller_disposes_its_widget() {
    let surface = FakeSurface::default();
    {
        let mut ctl = controller(surface.clone());
        ctl.sync(Some(&sleeper_view("trip-1"))).unwrap();
        assert_eq!(surface.log.borrow().live(), 1);
    }
    assert_eq!(surface.log.borrow().live(), 0);
}

#[test]
fn refused_creation_leaves_controller_absent() {
    let surface = FakeSurface {
        refuse: true,
        ..FakeSurface::default()
    };
    let mut ctl = controller(surface);
    let err = ctl.sync(Some(&sleeper_view("trip-1"))).unwrap_err();
    assert!(matches!(err, WidgetError::Create(_)));
    assert_eq!(ctl.phase(), MapPhase::Absent);
}

#[tokio::test]
async fn stored_trip_without_valid_locations_centers_on_default_view() {
    let view = sleeper_view("trip-9");
    let mut record = HistoryRecord::from_view(&view, None).unwrap();
    record.pickup_location.lat = 95.0;
    let restored = TripView::from_history_record(record).unwrap();
    assert!(restored.waypoints().is_none());

    let surface = FakeSurface::default();
    let mut ctl = controller(surface.clone());
    let epoch = ctl.sync(Some(&restored)).unwrap().unwrap();
    assert!(ctl.on_ready(epoch));
    let renderer = RouteRenderer::new(FixedDirections(Err(RouteError::NoRoute)));
    let plan = renderer.plan(&restored).await;
    assert!(ctl.paint(epoch, &plan));

    let features = surface.log.borrow().layer(epoch);
    assert_eq!(features.len(), 1);
    assert!(plan.route().is_none());
    assert!(matches!(
        surface.log.borrow().created[0].1.camera,
        Camera::Center { zoom, .. } if (zoom - 4.0).abs() < f64::EPSILON
    ));
}
