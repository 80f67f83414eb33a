use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use tripplanner::cache::{self, TtlPolicy};
use tripplanner::config::{GOOGLE_KEY_ENV, OPENWEATHER_KEY_ENV, TripPlannerConfig};
use tripplanner::models::{Season, TripType, UserPreferences};
use tripplanner::planner::{PlanRequest, PlannerSettings, TripPlanner, weather_snapshot};
use tripplanner::providers::{OpenWeatherClient, http};
use tripplanner::recommendation::destinations::{LogisticModel, ProbabilityModel, load_cities};
use tripplanner::recommendation::ItineraryLayout;
use tripplanner::{TripPlannerError, report, web};

/// Plan city trips around the weather, the traffic and what you like
#[derive(Parser, Debug)]
#[command(name = "tripplanner", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a scored, day-by-day plan for a destination
    Plan(PlanArgs),
    /// Show current weather and its quality score for a city
    Weather {
        city: String,
        #[arg(long)]
        json: bool,
    },
    /// Score the attractions around a city without building an itinerary
    Places {
        city: String,
        /// Search radius in meters
        #[arg(long)]
        radius: Option<u32>,
        #[command(flatten)]
        preferences: PreferenceArgs,
        #[arg(long)]
        json: bool,
    },
    /// Rank destination cities from a CSV dataset
    Destinations(DestinationArgs),
    /// Serve the JSON API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args, Debug)]
struct PreferenceArgs {
    /// Weather importance in [0, 1]
    #[arg(long)]
    weather_importance: Option<f64>,
    /// Crowd (travel time) importance in [0, 1]
    #[arg(long)]
    crowd_importance: Option<f64>,
    /// Attractions (rating) importance in [0, 1]
    #[arg(long)]
    attractions_importance: Option<f64>,
    /// adventure, relaxation or cultural
    #[arg(long)]
    trip_type: Option<TripType>,
}

impl PreferenceArgs {
    fn resolve(&self, defaults: &UserPreferences) -> UserPreferences {
        UserPreferences::new(
            self.weather_importance.unwrap_or(defaults.weather_importance),
            self.crowd_importance.unwrap_or(defaults.crowd_importance),
            self.attractions_importance
                .unwrap_or(defaults.attractions_importance),
            self.trip_type.unwrap_or(defaults.trip_type),
        )
    }
}

#[derive(Args, Debug)]
struct PlanArgs {
    destination: String,
    /// Where you start; travel times are measured from here
    #[arg(long)]
    origin: Option<String>,
    /// Number of days
    #[arg(short, long)]
    days: Option<usize>,
    /// day-buckets or time-of-day
    #[arg(long, default_value = "day-buckets")]
    layout: ItineraryLayout,
    /// Search radius in meters
    #[arg(long)]
    radius: Option<u32>,
    /// Intermediate destination, may be repeated
    #[arg(long = "pit-stop")]
    pit_stops: Vec<String>,
    #[command(flatten)]
    preferences: PreferenceArgs,
    /// Print the plan as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct DestinationArgs {
    /// CSV file with City, Ratings and "Best Time to visit" columns
    #[arg(long)]
    dataset: PathBuf,
    /// City the traffic levels are measured from
    #[arg(long)]
    origin: Option<String>,
    /// Logistic model exported as JSON
    #[arg(long)]
    model: Option<PathBuf>,
    /// summer, winter, spring or fall
    #[arg(long)]
    season: Option<Season>,
    #[arg(long, default_value_t = 5)]
    top: usize,
    #[command(flatten)]
    preferences: PreferenceArgs,
    #[arg(long)]
    json: bool,
}

fn init_tracing(config: &TripPlannerConfig, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("tripplanner={default_level},warn"))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_cache(config: &TripPlannerConfig) {
    if !config.cache.enabled {
        debug!("Cache disabled");
        return;
    }
    let dir = config.cache_dir();
    if let Err(e) = cache::init(&dir) {
        warn!("Running without cache ({}): {}", dir.display(), e);
    }
}

fn print_hints(config: &TripPlannerConfig) {
    let key_status = |key: &Option<String>| if key.is_some() { "set" } else { "missing" };
    println!("tripplanner {}", tripplanner::VERSION);
    println!();
    match TripPlannerConfig::get_config_path() {
        Some(path) => println!("Config file:      {}", path.display()),
        None => println!("Config file:      (no config directory)"),
    }
    println!(
        "Google Maps key:  {} ({} or google.api_key)",
        key_status(&config.google.api_key),
        GOOGLE_KEY_ENV
    );
    println!(
        "OpenWeather key:  {} ({} or weather.api_key)",
        key_status(&config.weather.api_key),
        OPENWEATHER_KEY_ENV
    );
    println!();
    println!("Try: tripplanner plan \"Paris\" --days 3 --trip-type cultural");
    println!("Run tripplanner --help for all commands.");
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).with_context(|| "Failed to serialize output")?
    );
    Ok(())
}

async fn run(cli: Cli, config: TripPlannerConfig) -> Result<()> {
    let settings = PlannerSettings::from(&config.defaults);

    let Some(command) = cli.command else {
        print_hints(&config);
        return Ok(());
    };

    match command {
        Command::Plan(args) => {
            let request = PlanRequest {
                destination: args.destination,
                origin: args.origin,
                num_days: args.days,
                preferences: Some(args.preferences.resolve(&settings.preferences)),
                layout: args.layout,
                radius_m: args.radius,
                pit_stops: args.pit_stops,
            };
            request.validate(&settings)?;

            let planner = TripPlanner::from_config(&config)?;
            let plan = planner.plan(&request).await?;
            if args.json {
                print_json(&plan)?;
            } else {
                print!("{}", report::render_plan(&plan));
            }
        }
        Command::Weather { city, json } => {
            if city.trim().is_empty() {
                return Err(TripPlannerError::validation("City cannot be empty").into());
            }
            let client = http::client_from_config(&config.weather)?;
            let provider =
                OpenWeatherClient::new(client, &config.weather, TtlPolicy::from(&config.cache));
            let weather = weather_snapshot(&provider, city.trim()).await;
            if json {
                print_json(&weather)?;
            } else {
                println!("{}", report::render_weather(city.trim(), &weather));
            }
        }
        Command::Places {
            city,
            radius,
            preferences,
            json,
        } => {
            let request = PlanRequest {
                num_days: Some(1),
                preferences: Some(preferences.resolve(&settings.preferences)),
                radius_m: radius,
                ..PlanRequest::new(city)
            };
            request.validate(&settings)?;

            let planner = TripPlanner::from_config(&config)?;
            let plan = planner.plan(&request).await?;
            if json {
                print_json(&plan.destination.recommendations)?;
            } else {
                print!(
                    "{}",
                    report::render_scored_places(
                        &format!("Attractions around {}", plan.destination.location.name),
                        &plan.destination.recommendations
                    )
                );
            }
        }
        Command::Destinations(args) => {
            let mut preferences = args.preferences.resolve(&settings.preferences);
            if let Some(season) = args.season {
                preferences = preferences.with_season(season);
            }

            let cities = load_cities(&args.dataset)?;
            let model = args.model.as_ref().map(LogisticModel::load).transpose()?;

            let planner = TripPlanner::from_config(&config)?;
            let ranked = planner
                .recommend_destinations(
                    &cities,
                    args.origin.as_deref(),
                    model.as_ref().map(|m| m as &dyn ProbabilityModel),
                    &preferences,
                    args.top,
                )
                .await?;
            if args.json {
                print_json(&ranked)?;
            } else {
                print!("{}", report::render_destinations(&ranked));
            }
        }
        Command::Serve { port } => {
            let planner = Arc::new(TripPlanner::from_config(&config)?);
            web::run(
                planner,
                port.unwrap_or(config.server.port),
                Duration::from_secs(config.server.request_timeout_seconds),
            )
            .await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match TripPlannerConfig::load_from_path(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    };

    init_tracing(&config, cli.verbose);
    init_cache(&config);

    if let Err(e) = run(cli, config).await {
        match e.downcast_ref::<TripPlannerError>() {
            Some(error) => eprintln!("Error: {}", error.user_message()),
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}
