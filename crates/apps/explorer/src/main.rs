use std::path::PathBuf;
use std::time::Duration;

use catalog::{EventType, FilterState, WarPeriod};
use clap::{Parser, Subcommand};
use explorer::{ExplorerConfig, InteractionController, PendingQuery};
use formats::{BorderCache, BorderError, DEFAULT_BORDER_RADIUS};
use foundation::Viewport;
use foundation::time::{Time, parse_iso_date};
use scene::PerspectiveCamera;
use streaming::{ClusterClient, ClusterSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Query the historical event clustering service")]
struct Args {
    /// API root; overrides HISTORY_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct FilterArgs {
    #[arg(long, value_parser = parse_period)]
    period: Option<WarPeriod>,

    /// Event kinds, comma separated (e.g. battles,invasions).
    #[arg(long = "type", value_delimiter = ',', value_parser = parse_event_type)]
    types: Vec<EventType>,

    #[arg(long)]
    year: Option<i32>,
}

impl FilterArgs {
    fn filter(&self, viewport: Viewport) -> FilterState {
        FilterState::new(viewport)
            .with_period(self.period)
            .with_types(self.types.iter().copied())
            .with_year(self.year)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one viewport query and print the clusters.
    Fetch {
        #[arg(long, default_value_t = 80.0, allow_hyphen_values = true)]
        north: f64,
        #[arg(long, default_value_t = 20.0, allow_hyphen_values = true)]
        south: f64,
        #[arg(long, default_value_t = 60.0, allow_hyphen_values = true)]
        east: f64,
        #[arg(long, default_value_t = -40.0, allow_hyphen_values = true)]
        west: f64,
        #[arg(long)]
        zoom: Option<f64>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Look up events at a coordinate on a date.
    EventsAt {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Load the continent border overlay and report its rings.
    Borders {
        /// Read from a local GeoJSON file instead of HISTORY_BORDERS_URL.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Sweep the camera along a parallel and report which moves re-query.
    Orbit {
        #[arg(long, default_value_t = 50.0, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, default_value_t = -40.0, allow_hyphen_values = true)]
        from_lon: f64,
        #[arg(long, default_value_t = 60.0, allow_hyphen_values = true)]
        to_lon: f64,
        #[arg(long, default_value_t = 2.0)]
        step: f64,
        #[arg(long, default_value_t = 2.5)]
        distance: f64,
        /// Milliseconds between camera reports.
        #[arg(long, default_value_t = 400)]
        interval_ms: u64,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

fn parse_period(s: &str) -> Result<WarPeriod, String> {
    [WarPeriod::Wwi, WarPeriod::Interwar, WarPeriod::Wwii]
        .into_iter()
        .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| format!("unknown period {s:?} (wwi, interwar, wwii)"))
}

fn parse_event_type(s: &str) -> Result<EventType, String> {
    EventType::from_tag(s).ok_or_else(|| format!("unknown event type {s:?}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = ExplorerConfig::from_env();
    if let Some(url) = args.api_url {
        config.api_url = url;
    }
    info!(api = %config.api_url, "explorer starting");

    match args.command {
        Command::Fetch {
            north,
            south,
            east,
            west,
            zoom,
            filter,
        } => {
            let client = ClusterClient::new(config.client_config())?;
            let filter = filter
                .filter(Viewport::new(north, south, east, west))
                .with_zoom(zoom);
            let clusters = client.fetch(&filter).await?;
            println!("{} clusters", clusters.len());
            for c in &clusters {
                let g = &c.geometry;
                println!(
                    "{:>8} level={} points={} centroid=({:.3}, {:.3}) radius={:.1} span={}d {}",
                    c.cluster.id,
                    c.cluster.level,
                    g.point_count,
                    c.cluster.centroid.lat,
                    c.cluster.centroid.lon,
                    g.radius,
                    g.time_span_days,
                    if g.fully_visible {
                        "inside"
                    } else if g.partially_visible {
                        "partial"
                    } else {
                        "outside"
                    },
                );
            }
            let events = streaming::flatten_events(&clusters);
            println!("{} distinct events", events.len());
        }
        Command::EventsAt {
            lat,
            lon,
            date,
            filter,
        } => {
            let date = parse_iso_date(&date).ok_or_else(|| format!("invalid date {date:?}"))?;
            let client = ClusterClient::new(config.client_config())?;
            let controller = InteractionController::new(
                config.controller_config(),
                filter.filter(Viewport::world()),
            );
            let found = client.events_at(lat, lon, date).await?;
            let total = found.len();
            let admitted = controller.admit_lookup(found);
            println!("{} of {total} events match the filter", admitted.len());
            for e in admitted {
                println!(
                    "{}  {}  [{} / {}]  {}",
                    e.date, e.id, e.period, e.event_type, e.title
                );
            }
        }
        Command::Borders { file } => {
            let cache = BorderCache::new(DEFAULT_BORDER_RADIUS);
            let url = config.borders_url.clone();
            let overlay = cache
                .get_or_load(move || async move {
                    match file {
                        Some(path) => tokio::fs::read_to_string(&path)
                            .await
                            .map_err(|e| BorderError::Load(format!("{}: {e}", path.display()))),
                        None => fetch_text(&url).await,
                    }
                })
                .await?;
            println!(
                "{} features, {} rings, {} points, {} skipped",
                overlay.features,
                overlay.rings.len(),
                overlay.point_count(),
                overlay.skipped
            );
            for ring in overlay.rings.iter().filter(|r| r.name.is_some()).take(20) {
                println!(
                    "  {}: {} points",
                    ring.name.as_deref().unwrap_or_default(),
                    ring.points.len()
                );
            }
        }
        Command::Orbit {
            lat,
            from_lon,
            to_lon,
            step,
            distance,
            interval_ms,
            filter,
        } => {
            if !(step.is_finite() && step > 0.0) {
                return Err("--step must be positive".into());
            }
            let client = ClusterClient::new(config.client_config())?;
            let aspect = 16.0 / 9.0;
            let start = PerspectiveCamera::orbiting(lat, from_lon, distance, aspect).pose();
            let viewport = foundation::math::camera_pose_to_viewport(&start)?;
            let mut controller =
                InteractionController::new(config.controller_config(), filter.filter(viewport));

            let mut issued = 0usize;
            if let Some(q) = controller.initial_query() {
                issued += 1;
                run(&client, &mut controller, q).await;
            }

            let interval = Duration::from_millis(interval_ms);
            let mut now = Time(0.0);
            let direction = if to_lon >= from_lon { 1.0 } else { -1.0 };
            let mut lon = from_lon;
            loop {
                now = now.after(interval);
                // Settle the previous report before offering the next one.
                if let Some(q) = controller.tick(now) {
                    issued += 1;
                    let v = q.filter.viewport;
                    println!(
                        "query #{} n={:.1} s={:.1} e={:.1} w={:.1}",
                        q.seq.0, v.north, v.south, v.east, v.west
                    );
                    run(&client, &mut controller, q).await;
                }
                if (to_lon - lon) * direction <= 0.0 {
                    break;
                }
                lon += step * direction;
                let camera = PerspectiveCamera::orbiting(lat, lon, distance, aspect);
                controller.on_camera_change(camera.pose(), now);
            }
            if controller.has_pending_viewport()
                && let Some(q) = controller.tick(now.after(Duration::from_secs(1)))
            {
                issued += 1;
                run(&client, &mut controller, q).await;
            }

            let stats = controller.cache_stats();
            println!(
                "{issued} queries, {} cache hits, {} events on screen",
                stats.hits,
                controller.events().len()
            );
            if let Some(err) = controller.last_error() {
                println!("last error: {err}");
            }
            controller.teardown();
        }
    }

    Ok(())
}

async fn run(client: &ClusterClient, controller: &mut InteractionController, query: PendingQuery) {
    let (seq, result) = query.run(client).await;
    controller.apply(seq, result);
}

async fn fetch_text(url: &str) -> Result<String, BorderError> {
    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| BorderError::Load(format!("{url}: {e}")))?;
    response
        .text()
        .await
        .map_err(|e| BorderError::Load(format!("{url}: {e}")))
}
