use clap::{Args, Parser, Subcommand, ValueEnum};
use eld_planner_core::{LocationField, WeeklyMode};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "eld-planner", version)]
#[command(about = "Plan HOS-compliant trips against an ELD planning service")]
pub struct Cli {
    /// Planning service base URL
    #[arg(long, env = "ELD_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Azure Maps subscription key used for address search and routing
    #[arg(long, env = "AZURE_MAPS_KEY", global = true, hide_env_values = true)]
    pub maps_key: Option<String>,

    /// JSON client configuration file; flags and environment override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up address suggestions the way the trip form does
    Search {
        /// Free-text address
        query: String,
        /// Form field the search is for
        #[arg(long, value_enum, default_value_t = FieldArg::Current)]
        field: FieldArg,
    },
    /// Submit a trip plan and print the schedule
    Plan(PlanArgs),
    /// Fetch one planned trip by id
    Show {
        trip_id: String,
    },
    /// Browse and manage stored trips
    #[command(subcommand)]
    History(HistoryCommand),
    /// Download the ELD log sheets of a trip as PDF
    Pdf {
        trip_id: String,
        /// Output file or directory (defaults to the current directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check that the planning service is up
    Health,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List stored trips, newest first
    List {
        /// Maximum number of trips (defaults to the configured history limit)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Print a stored trip, optionally exporting its map overlay
    Show {
        trip_id: String,
        /// Write the map overlay as a GeoJSON FeatureCollection
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Delete one stored trip
    Delete { trip_id: String },
    /// Delete every stored trip
    Clear {
        /// Required: confirms that all history should be removed
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Current location: an address or "lat, lon"
    #[arg(long)]
    pub current: String,
    /// Pickup location: an address or "lat, lon"
    #[arg(long)]
    pub pickup: String,
    /// Dropoff location: an address or "lat, lon"
    #[arg(long)]
    pub dropoff: String,
    /// Hours already used in the current cycle (0-70)
    #[arg(long, default_value = "0")]
    pub cycle_used: String,
    #[arg(long)]
    pub driver: String,
    #[arg(long)]
    pub carrier: String,
    #[arg(long)]
    pub office: String,
    #[arg(long)]
    pub vehicle: String,
    /// Weekly on-duty limit
    #[arg(long, value_enum, default_value_t = ModeArg::Seventy)]
    pub weekly_mode: ModeArg,
    #[arg(long)]
    pub split_sleeper: bool,
    #[arg(long)]
    pub adverse_conditions: bool,
    #[arg(long)]
    pub air_mile_exception: bool,
    /// Write the map overlay as a GeoJSON FeatureCollection
    #[arg(long)]
    pub geojson: Option<PathBuf>,
    /// Print the raw planner response instead of the summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FieldArg {
    Current,
    Pickup,
    Dropoff,
}

impl From<FieldArg> for LocationField {
    fn from(value: FieldArg) -> Self {
        match value {
            FieldArg::Current => Self::Current,
            FieldArg::Pickup => Self::Pickup,
            FieldArg::Dropoff => Self::Dropoff,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// 70 hours in 8 days
    #[value(name = "70/8")]
    Seventy,
    /// 60 hours in 7 days
    #[value(name = "60/7")]
    Sixty,
}

impl From<ModeArg> for WeeklyMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Seventy => Self::SeventyEight,
            ModeArg::Sixty => Self::SixtySeven,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plan_flags_parse() {
        let cli = Cli::try_parse_from([
            "eld-planner",
            "plan",
            "--current",
            "40.0, -75.0",
            "--pickup",
            "New York, NY",
            "--dropoff",
            "42.36,-71.06",
            "--cycle-used",
            "12.5",
            "--driver",
            "Dana",
            "--carrier",
            "NE Freight",
            "--office",
            "Newark",
            "--vehicle",
            "TRK-7",
            "--weekly-mode",
            "60/7",
            "--split-sleeper",
        ])
        .unwrap();
        let Command::Plan(args) = cli.command else {
            panic!("expected plan");
        };
        assert_eq!(args.pickup, "New York, NY");
        assert_eq!(WeeklyMode::from(args.weekly_mode), WeeklyMode::SixtySeven);
        assert!(args.split_sleeper);
        assert!(!args.adverse_conditions);
    }

    #[test]
    fn history_clear_requires_nothing_but_parses_yes() {
        let cli = Cli::try_parse_from(["eld-planner", "history", "clear", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::History(HistoryCommand::Clear { yes: true })
        ));
    }
}
