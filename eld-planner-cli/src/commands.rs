use crate::cli::{Command, HistoryCommand, PlanArgs};
use crate::report;
use crate::transport::ReqwestClient;
use anyhow::{Context, Result, bail};
use colored::Colorize;
use eld_planner_core::{
    AzureMaps, ClientConfig, DriverInfo, FeatureCollection, HistoryBook, HosOptions,
    LocationField, LocationInput, PlannerClient, PlannerError, PlannerOperation, RouteRenderer,
    SearchController, SearchOutcome, TokioTimer, TripForm, TripView, pdf_file_name,
};
use std::io::{Write, stdout};
use std::path::{Path, PathBuf};
use std::rc::Rc;

type Maps = Rc<AzureMaps<ReqwestClient>>;

/// Clients shared by every command of one invocation.
pub struct Session {
    config: ClientConfig,
    planner: PlannerClient<ReqwestClient>,
    maps: Maps,
}

impl Session {
    pub fn new(config: ClientConfig) -> Self {
        let http = ReqwestClient::new();
        Self {
            planner: PlannerClient::new(http.clone(), config.api_base_url.clone()),
            maps: Rc::new(AzureMaps::new(
                http,
                config.maps_base_url.clone(),
                config.maps_subscription_key.clone(),
            )),
            config,
        }
    }

    fn search(&self) -> SearchController<Maps, TokioTimer> {
        SearchController::new(self.maps.clone(), TokioTimer, self.config.search.clone())
    }
}

/// Turn a planner failure into the message the user should see.
fn failed(operation: PlannerOperation) -> impl FnOnce(PlannerError) -> anyhow::Error {
    move |err| {
        let message = err.user_message(operation);
        anyhow::Error::new(err).context(message)
    }
}

pub async fn run(session: &Session, command: Command) -> Result<()> {
    match command {
        Command::Search { query, field } => search(session, &query, field.into()).await,
        Command::Plan(args) => plan(session, args).await,
        Command::Show { trip_id } => show(session, &trip_id).await,
        Command::History(history) => match history {
            HistoryCommand::List { limit } => history_list(session, limit).await,
            HistoryCommand::Show { trip_id, geojson } => {
                history_show(session, &trip_id, geojson.as_deref()).await
            }
            HistoryCommand::Delete { trip_id } => history_delete(session, &trip_id).await,
            HistoryCommand::Clear { yes } => history_clear(session, yes).await,
        },
        Command::Pdf { trip_id, output } => pdf(session, &trip_id, output).await,
        Command::Health => health(session).await,
    }
}

async fn search(session: &Session, query: &str, field: LocationField) -> Result<()> {
    let controller = session.search();
    let Some(pending) = controller.on_query_change(field, query) else {
        bail!(
            "type at least {} characters to search",
            session.config.search.min_query_chars
        );
    };
    if controller.run(pending).await == SearchOutcome::Failed {
        bail!("address search failed; check the Azure Maps key and network");
    }
    let found = controller.session(field);
    report::candidates(&mut stdout().lock(), found.candidates())?;
    Ok(())
}

/// Typed `"lat, lon"` is taken as-is; anything else goes through address
/// search and the first suggestion is selected.
async fn resolve_location(
    controller: &SearchController<Maps, TokioTimer>,
    field: LocationField,
    text: &str,
) -> Result<LocationInput> {
    if let Ok(input) = LocationInput::from_typed_coordinates(text) {
        return Ok(input);
    }
    let pending = controller
        .on_query_change(field, text)
        .with_context(|| format!("{field} location {text:?} is too short to search"))?;
    let outcome = controller.run(pending).await;
    let found = controller.session(field);
    let candidate = found
        .candidates()
        .first()
        .with_context(|| format!("no address found for {field} location {text:?} ({outcome:?})"))?;
    let input = controller.select_candidate(field, candidate);
    log::info!("{field} location: {} ({})", input.address, input.coordinate);
    Ok(input)
}

fn form_from_args(args: &PlanArgs) -> TripForm {
    let mut form = TripForm::default();
    form.cycle_used.clone_from(&args.cycle_used);
    form.driver = DriverInfo {
        driver_name: args.driver.clone(),
        carrier_name: args.carrier.clone(),
        main_office: args.office.clone(),
        vehicle_number: args.vehicle.clone(),
    };
    form.hos = HosOptions {
        weekly_mode: args.weekly_mode.into(),
        use_split_sleeper: args.split_sleeper,
        use_adverse_conditions: args.adverse_conditions,
        use_air_mile_exception: args.air_mile_exception,
    };
    form
}

async fn plan(session: &Session, args: PlanArgs) -> Result<()> {
    let mut form = form_from_args(&args);
    let controller = session.search();
    for (field, text) in [
        (LocationField::Current, &args.current),
        (LocationField::Pickup, &args.pickup),
        (LocationField::Dropoff, &args.dropoff),
    ] {
        form.set_location(field, resolve_location(&controller, field, text).await?);
    }
    let request = form.to_request().context("invalid trip details")?;

    let result = session
        .planner
        .plan_trip(&request)
        .await
        .map_err(failed(PlannerOperation::PlanTrip))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let view = TripView::from_submission(&request, result);
    report::trip(&mut stdout().lock(), &view)?;
    if let Some(path) = args.geojson.as_deref() {
        export_overlay(session, &view, path).await?;
    }
    Ok(())
}

async fn export_overlay(session: &Session, view: &TripView, path: &Path) -> Result<()> {
    let overlay = RouteRenderer::new(session.maps.clone()).plan(view).await;
    let mut collection = FeatureCollection::default();
    overlay.paint(&mut collection);
    let text = serde_json::to_string_pretty(&collection.to_geojson())?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    println!(
        "🗺  Wrote {} map features to {}",
        collection.features().len(),
        path.display()
    );
    Ok(())
}

async fn show(session: &Session, trip_id: &str) -> Result<()> {
    let result = session
        .planner
        .get_trip(trip_id)
        .await
        .with_context(|| format!("fetching trip {trip_id}"))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn history_list(session: &Session, limit: Option<u32>) -> Result<()> {
    let limit = limit.unwrap_or(session.config.history_limit);
    let book = HistoryBook::load(&session.planner, limit)
        .await
        .map_err(failed(PlannerOperation::LoadHistory))?;
    report::history(&mut stdout().lock(), &book)?;
    Ok(())
}

async fn history_show(session: &Session, trip_id: &str, geojson: Option<&Path>) -> Result<()> {
    let limit = session.config.history_limit;
    let book = HistoryBook::load(&session.planner, limit)
        .await
        .map_err(failed(PlannerOperation::LoadHistory))?;
    let Some(view) = book.view(trip_id) else {
        bail!("trip {trip_id} is not among the latest {limit} history records");
    };
    let view = view.with_context(|| format!("history record {trip_id} is unusable"))?;
    report::trip(&mut stdout().lock(), &view)?;
    if let Some(path) = geojson {
        export_overlay(session, &view, path).await?;
    }
    Ok(())
}

async fn history_delete(session: &Session, trip_id: &str) -> Result<()> {
    session
        .planner
        .delete_trip(trip_id)
        .await
        .map_err(failed(PlannerOperation::DeleteTrip))?;
    println!("{} {trip_id}", "🗑  Deleted".green());
    Ok(())
}

async fn history_clear(session: &Session, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("refusing to delete all trip history without --yes");
    }
    let mut book = HistoryBook::load(&session.planner, session.config.history_limit)
        .await
        .map_err(failed(PlannerOperation::LoadHistory))?;
    let count = book.records().len();
    book.clear(&session.planner)
        .await
        .map_err(failed(PlannerOperation::ClearHistory))?;
    println!("{} {count} trips", "🗑  Deleted".green());
    Ok(())
}

fn pdf_destination(output: Option<PathBuf>, file_name: String) -> PathBuf {
    match output {
        Some(dir) if dir.is_dir() => dir.join(file_name),
        Some(path) => path,
        None => PathBuf::from(file_name),
    }
}

async fn pdf(session: &Session, trip_id: &str, output: Option<PathBuf>) -> Result<()> {
    let bytes = session
        .planner
        .download_eld_pdf(trip_id)
        .await
        .map_err(failed(PlannerOperation::DownloadPdf))?;
    let name = pdf_file_name(trip_id, chrono::Local::now().date_naive());
    let path = pdf_destination(output, name);
    std::fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    println!("📄 Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

async fn health(session: &Session) -> Result<()> {
    let status = session
        .planner
        .health_check()
        .await
        .with_context(|| {
            format!(
                "planning service at {} is unreachable",
                session.planner.base_url()
            )
        })?;
    let mut out = stdout().lock();
    writeln!(out, "{}", "✅ Planning service is up".green())?;
    writeln!(out, "{}", serde_json::to_string_pretty(&status)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ModeArg;
    use eld_planner_core::WeeklyMode;

    fn args() -> PlanArgs {
        PlanArgs {
            current: "40.0, -75.0".into(),
            pickup: "40.7, -74.0".into(),
            dropoff: "42.36, -71.06".into(),
            cycle_used: "12".into(),
            driver: "Dana".into(),
            carrier: "NE Freight".into(),
            office: "Newark".into(),
            vehicle: "TRK-7".into(),
            weekly_mode: ModeArg::Sixty,
            split_sleeper: false,
            adverse_conditions: true,
            air_mile_exception: false,
            geojson: None,
            json: false,
        }
    }

    #[test]
    fn form_carries_driver_and_hos_flags() {
        let form = form_from_args(&args());
        assert_eq!(form.driver.vehicle_number, "TRK-7");
        assert_eq!(form.hos.weekly_mode, WeeklyMode::SixtySeven);
        assert!(form.hos.use_adverse_conditions);
        assert!(form.location(LocationField::Current).is_none());
    }

    #[tokio::test]
    async fn typed_coordinates_skip_the_geocoder() {
        let session = Session::new(ClientConfig::default().with_subscription_key("unused"));
        let controller = session.search();
        let input = resolve_location(&controller, LocationField::Pickup, "40.7, -74.0")
            .await
            .unwrap();
        assert_eq!(input.coordinate.lat(), 40.7);
        assert_eq!(input.coordinate.lon(), -74.0);
        assert_eq!(controller.session(LocationField::Pickup).pending_request_id(), 0);
    }

    #[test]
    fn pdf_goes_to_named_file_or_into_directory() {
        let name = String::from("ELD_Logs_t1_2024-03-04.pdf");
        assert_eq!(
            pdf_destination(None, name.clone()),
            PathBuf::from("ELD_Logs_t1_2024-03-04.pdf")
        );
        let dir = std::env::temp_dir();
        assert_eq!(
            pdf_destination(Some(dir.clone()), name.clone()),
            dir.join("ELD_Logs_t1_2024-03-04.pdf")
        );
        assert_eq!(
            pdf_destination(Some(PathBuf::from("out.pdf")), name),
            PathBuf::from("out.pdf")
        );
    }

    #[test]
    fn planner_failures_surface_the_user_message() {
        let err = failed(PlannerOperation::DeleteTrip)(PlannerError::Transport("refused".into()));
        assert_eq!(err.to_string(), "Failed to delete trip. Please try again.");
        assert!(format!("{err:#}").contains("refused"));
    }
}
